use crate::authors::AuthorDirectory;
use crate::book::Book;
use crate::collection::{BookCollection, BookFilter, Listing, SortKey, TOP_GENRES};
use crate::config::{ChallengeConfig, Settings};
use crate::dates::{inclusive_months, parse_loose_date};
use crate::models::{
    AuthorSpotlight, BookExtreme, ChallengeProgress, ChartsResponse, CustomDates, ListingParams,
    SeriesShelf, Shelf, StatsDocument, SummaryResponse, TimelinePoint,
};
use chrono::{Duration, Local, NaiveDate};
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const PAGES_PER_DAY: u32 = 100;
const DEFAULT_PAGES: u32 = 300;

/// Everything the page shows, built once from the loaded documents.
pub struct Dashboard {
    total_books: u64,
    total_pages: u64,
    books_2025: u64,
    average_pages: f64,
    average_rating: f64,
    series_counts: BTreeMap<String, u64>,
    longest_book: BookExtreme,
    shortest_book: BookExtreme,
    precomputed_timeline: Vec<TimelinePoint>,
    all: BookCollection,
    read: BookCollection,
    current: BookCollection,
    to_read: BookCollection,
    series_options: Vec<String>,
    genre_options: Vec<String>,
    average_books_per_month: f64,
    authors: Arc<dyn AuthorDirectory>,
    challenge: ChallengeConfig,
    page_size: usize,
}

impl Dashboard {
    pub fn build(
        document: StatsDocument,
        custom_dates: &CustomDates,
        authors: Arc<dyn AuthorDirectory>,
        settings: &Settings,
    ) -> Self {
        let books: Vec<Book> = document
            .book_list
            .into_iter()
            .map(|record| Book::new(record, custom_dates, authors.as_ref()))
            .collect();

        let on_shelf = |shelf: Shelf| -> Vec<Book> {
            books
                .iter()
                .filter(|book| book.shelf() == Some(shelf))
                .cloned()
                .collect()
        };
        let read = BookCollection::new(on_shelf(Shelf::Read));
        let current = BookCollection::new(on_shelf(Shelf::CurrentlyReading));
        let to_read = BookCollection::new(on_shelf(Shelf::ToRead));
        let all = BookCollection::new(books);

        info!(
            total = all.len(),
            read = read.len(),
            reading = current.len(),
            to_read = to_read.len(),
            "dashboard built"
        );

        Self {
            total_books: document.total_books,
            total_pages: document.total_pages,
            books_2025: document.books_2025,
            average_pages: precomputed_or(document.avg_pages, || read.average_pages()),
            average_rating: precomputed_or(document.avg_rating, || read.average_rating()),
            series_counts: if document.series_counts.is_empty() {
                read.series_counts()
            } else {
                document.series_counts
            },
            longest_book: document.longest_book.unwrap_or_else(|| read.longest_book()),
            shortest_book: document.shortest_book.unwrap_or_else(|| read.shortest_book()),
            precomputed_timeline: document.timeline,
            series_options: read.series_options(),
            genre_options: read.genre_options(),
            average_books_per_month: average_books_per_month(&read),
            all,
            read,
            current,
            to_read,
            authors,
            challenge: settings.challenge,
            page_size: settings.page_size,
        }
    }

    pub fn all(&self) -> &BookCollection {
        &self.all
    }

    pub fn read(&self) -> &BookCollection {
        &self.read
    }

    pub fn current(&self) -> &BookCollection {
        &self.current
    }

    pub fn to_read(&self) -> &BookCollection {
        &self.to_read
    }

    pub fn series_options(&self) -> &[String] {
        &self.series_options
    }

    pub fn genre_options(&self) -> &[String] {
        &self.genre_options
    }

    pub fn average_books_per_month(&self) -> f64 {
        self.average_books_per_month
    }

    pub fn series_counts(&self) -> &BTreeMap<String, u64> {
        &self.series_counts
    }

    pub fn challenge(&self) -> ChallengeConfig {
        self.challenge
    }

    /// Read books narrowed by the filter controls, sorted, then revealed up to
    /// the requested page.
    pub fn listing(&self, params: &ListingParams) -> Listing {
        let filter = BookFilter {
            series: params.series.clone(),
            genre: params.genre.clone(),
        };
        let sort = params
            .sort
            .as_deref()
            .filter(|sort| !sort.is_empty())
            .map(SortKey::parse)
            .unwrap_or_default();
        let working = self.read.filter(&filter).sorted(sort);
        Listing::new(working, self.page_size).with_page(params.page.unwrap_or_default())
    }

    pub fn find_book(&self, book_id: &str) -> Option<&Book> {
        self.all.find_by_id(book_id)
    }

    pub fn random_read_book<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Book> {
        self.read.random_read_book(rng)
    }

    pub fn spotlight(&self) -> AuthorSpotlight {
        let tally = self.read.most_prolific_author();
        AuthorSpotlight {
            top_genre: self.read.most_read_genre_for_author(&tally.author),
            photo_url: self.authors.photo_or_placeholder(&tally.author).to_string(),
            book_count: tally.count,
            author: tally.author,
        }
    }

    pub fn summary(&self) -> SummaryResponse {
        self.summary_at(Local::now().date_naive())
    }

    pub fn summary_at(&self, today: NaiveDate) -> SummaryResponse {
        SummaryResponse {
            total_books: self.total_books,
            total_pages: self.total_pages,
            books_2025: self.books_2025,
            total_words: self.read.total_words(),
            total_series: self.series_counts.len(),
            average_books_per_month: self.average_books_per_month,
            average_pages: self.average_pages,
            average_rating: self.average_rating,
            longest_book: self.longest_book.clone(),
            shortest_book: self.shortest_book.clone(),
            challenge: challenge_progress(&self.read, self.challenge, today),
            spotlight: self.spotlight(),
            current_book: self.current.books().first().map(Book::to_view),
            last_read_book: self.read.last_read_book().map(Book::to_view),
        }
    }

    pub fn charts(&self) -> ChartsResponse {
        let timeline = self.read.monthly_timeline();
        ChartsResponse {
            ratings: self.read.rating_histogram(),
            genres: self.read.genre_histogram(TOP_GENRES),
            timeline: if timeline.is_empty() {
                self.precomputed_timeline.clone()
            } else {
                timeline
            },
        }
    }

    pub fn series_shelves(&self) -> Vec<SeriesShelf> {
        self.all.series_shelves()
    }
}

fn precomputed_or(value: f64, compute: impl FnOnce() -> f64) -> f64 {
    if value > 0.0 { value } else { compute() }
}

/// Read books divided by the calendar months spanned by all reading ranges,
/// rounded to one decimal. Zero when no range can be resolved.
pub fn average_books_per_month(read: &BookCollection) -> f64 {
    let books = read.baseline();
    let ranges: Vec<(NaiveDate, NaiveDate)> = books.iter().filter_map(reading_range).collect();
    let earliest = ranges.iter().map(|(start, _)| *start).min();
    let latest = ranges.iter().map(|(_, end)| *end).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return 0.0;
    };

    let months = inclusive_months(earliest, latest);
    if months <= 0 {
        return 0.0;
    }
    (books.len() as f64 / months as f64 * 10.0).round() / 10.0
}

// Start: custom start, else Date Added, else the read date minus one day per
// hundred pages. End: custom end, else the read date.
fn reading_range(book: &Book) -> Option<(NaiveDate, NaiveDate)> {
    let raw_read = book.record().date_read.as_deref()?;
    let overrides = book.custom_dates();

    let end = parse_loose_date(overrides.custom_end_date.as_deref().unwrap_or(raw_read))?;
    let start = match (
        overrides.custom_start_date.as_deref(),
        book.record().date_added.as_deref(),
    ) {
        (Some(custom), _) => parse_loose_date(custom)?,
        (None, Some(added)) => parse_loose_date(added)?,
        (None, None) => {
            let pages = book.pages().filter(|pages| *pages > 0).unwrap_or(DEFAULT_PAGES);
            let days = pages.div_ceil(PAGES_PER_DAY);
            parse_loose_date(raw_read)? - Duration::days(i64::from(days))
        }
    };
    Some((start, end))
}

pub fn challenge_progress(
    read: &BookCollection,
    challenge: ChallengeConfig,
    today: NaiveDate,
) -> ChallengeProgress {
    let books_read = read.count_read_in_year(challenge.year);
    let goal = challenge.goal.max(1);
    let percent = (books_read.saturating_mul(100) / goal as usize).min(100) as u32;

    let days_left = match (
        NaiveDate::from_ymd_opt(challenge.year, 1, 1),
        NaiveDate::from_ymd_opt(challenge.year, 12, 31),
    ) {
        (Some(start), Some(end)) => {
            let total = (end - start).num_days();
            (total - (today - start).num_days()).clamp(0, total)
        }
        _ => 0,
    };

    ChallengeProgress {
        year: challenge.year,
        goal,
        books_read,
        percent,
        days_left,
    }
}
