use crate::book::Book;
use crate::dates::month_key;
use crate::models::{AuthorTally, BookExtreme, GenreCount, RatingBucket, SeriesShelf, TimelinePoint};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub const PAGE_SIZE: usize = 9;
pub const TOP_GENRES: usize = 5;
pub const NO_DATA: &str = "Нет данных";
pub const UNKNOWN_GENRE: &str = "Неизвестно";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Pages,
    Rating,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    /// Reads a `field-direction` key such as `date-desc`.
    ///
    /// Unknown fields sort by title and anything other than `asc` sorts
    /// descending.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (field, direction) = raw.split_once('-').unwrap_or((raw, ""));
        let field = match field {
            "date" => SortField::Date,
            "pages" => SortField::Pages,
            "rating" => SortField::Rating,
            _ => SortField::Title,
        };
        let direction = if direction == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        Self { field, direction }
    }

    fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self.field {
            SortField::Date => present_first(a.date_read(), b.date_read(), self.direction),
            SortField::Pages => present_first(a.pages(), b.pages(), self.direction),
            SortField::Rating => present_first(a.record().rating, b.record().rating, self.direction),
            SortField::Title => present_first(
                a.record().title.as_deref(),
                b.record().title.as_deref(),
                self.direction,
            ),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            SortField::Date => "date",
            SortField::Pages => "pages",
            SortField::Rating => "rating",
            SortField::Title => "title",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{field}-{direction}")
    }
}

// Missing values go last in both directions.
fn present_first<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => a.cmp(&b),
            SortDirection::Desc => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Series and genre selections from the filter controls. Empty means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub series: Option<String>,
    pub genre: Option<String>,
}

impl BookFilter {
    fn matches(&self, book: &Book) -> bool {
        let series_ok = match non_empty(self.series.as_deref()) {
            Some(series) => book.series() == Some(series),
            None => true,
        };
        let genre_ok = match non_empty(self.genre.as_deref()) {
            Some(genre) => book.genres().iter().any(|g| g == genre),
            None => true,
        };
        series_ok && genre_ok
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A shared baseline plus the working list derived from it.
///
/// Every operation returns a new snapshot that shares the baseline.
#[derive(Debug, Clone, Default)]
pub struct BookCollection {
    baseline: Arc<[Book]>,
    working: Vec<Book>,
}

impl BookCollection {
    pub fn new(books: Vec<Book>) -> Self {
        if books.is_empty() {
            warn!("book collection created without books");
        } else {
            debug!(count = books.len(), "book collection created");
        }
        let baseline: Arc<[Book]> = books.into();
        Self {
            working: baseline.to_vec(),
            baseline,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.working
    }

    pub fn baseline(&self) -> &[Book] {
        &self.baseline
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    fn derive(&self, working: Vec<Book>) -> Self {
        Self {
            baseline: Arc::clone(&self.baseline),
            working,
        }
    }

    pub fn filter_by_series(&self, series: &str) -> Self {
        self.filter(&BookFilter {
            series: Some(series.to_string()),
            genre: None,
        })
    }

    pub fn filter_by_genre(&self, genre: &str) -> Self {
        self.filter(&BookFilter {
            series: None,
            genre: Some(genre.to_string()),
        })
    }

    /// Working list = baseline books matching every non-empty selection.
    pub fn filter(&self, filter: &BookFilter) -> Self {
        let working = self
            .baseline
            .iter()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        self.derive(working)
    }

    pub fn sort_by(&self, key: &str) -> Self {
        self.sorted(SortKey::parse(key))
    }

    pub fn sorted(&self, key: SortKey) -> Self {
        let mut working = self.working.clone();
        working.sort_by(|a, b| key.compare(a, b));
        self.derive(working)
    }

    pub fn find_by_id(&self, book_id: &str) -> Option<&Book> {
        self.baseline
            .iter()
            .find(|book| book.record().book_id.as_deref() == Some(book_id))
    }

    fn read_books(&self) -> impl Iterator<Item = &Book> {
        self.baseline.iter().filter(|book| book.is_read())
    }

    pub fn most_prolific_author(&self) -> AuthorTally {
        let counts = tally(self.read_books().map(Book::display_author));
        match leader(&counts) {
            Some((author, count)) => AuthorTally {
                author: author.to_string(),
                count,
            },
            None => AuthorTally {
                author: NO_DATA.to_string(),
                count: 0,
            },
        }
    }

    pub fn most_read_genre_for_author(&self, author: &str) -> String {
        let counts = tally(
            self.read_books()
                .filter(|book| book.display_author() == author)
                .flat_map(|book| book.genres().iter().map(String::as_str)),
        );
        leader(&counts)
            .map(|(genre, _)| genre)
            .unwrap_or(UNKNOWN_GENRE)
            .to_string()
    }

    pub fn longest_book(&self) -> BookExtreme {
        self.extreme(|candidate, best| candidate > best)
    }

    pub fn shortest_book(&self) -> BookExtreme {
        self.extreme(|candidate, best| candidate < best)
    }

    fn extreme(&self, replaces: impl Fn(u32, u32) -> bool) -> BookExtreme {
        let pages = |book: &Book| book.pages().unwrap_or_default();
        let winner = self.baseline.iter().fold(None::<&Book>, |best, book| match best {
            Some(current) if !replaces(pages(book), pages(current)) => Some(current),
            _ => Some(book),
        });
        match winner {
            Some(book) => BookExtreme {
                title: book.title().to_string(),
                pages: pages(book),
            },
            None => BookExtreme {
                title: NO_DATA.to_string(),
                pages: 0,
            },
        }
    }

    pub fn last_read_book(&self) -> Option<&Book> {
        self.baseline
            .iter()
            .filter_map(|book| book.date_read().map(|date| (date, book)))
            .fold(None::<(NaiveDate, &Book)>, |best, (date, book)| match best {
                Some((best_date, _)) if best_date >= date => best,
                _ => Some((date, book)),
            })
            .map(|(_, book)| book)
    }

    pub fn random_read_book<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Book> {
        let read: Vec<&Book> = self.read_books().collect();
        read.choose(rng).copied()
    }

    pub fn series_with_authors(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut series_authors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for book in self.baseline.iter() {
            if let Some(series) = trimmed_series(book) {
                series_authors
                    .entry(series.to_string())
                    .or_default()
                    .insert(book.display_author().to_string());
            }
        }
        series_authors
    }

    /// One shelf per series from [`series_with_authors`](Self::series_with_authors),
    /// with the book count and covers in baseline order.
    pub fn series_shelves(&self) -> Vec<SeriesShelf> {
        let mut covers: HashMap<&str, Vec<String>> = HashMap::new();
        for book in self.baseline.iter() {
            if let Some(series) = trimmed_series(book) {
                covers.entry(series).or_default().push(book.cover_url());
            }
        }

        self.series_with_authors()
            .into_iter()
            .map(|(series, authors)| {
                let covers = covers.remove(series.as_str()).unwrap_or_default();
                SeriesShelf {
                    book_count: covers.len(),
                    authors: authors.into_iter().collect(),
                    covers,
                    series,
                }
            })
            .collect()
    }

    pub fn rating_histogram(&self) -> Vec<RatingBucket> {
        let mut counts = [0usize; 5];
        for book in self.read_books() {
            if let rating @ 1..=5 = book.rating() {
                counts[rating as usize - 1] += 1;
            }
        }
        counts
            .iter()
            .enumerate()
            .map(|(index, &count)| RatingBucket {
                rating: index as u8 + 1,
                count,
            })
            .collect()
    }

    /// Genre counts over read books, largest first. A book with several
    /// genres counts once per genre entry.
    pub fn genre_histogram(&self, top_n: usize) -> Vec<GenreCount> {
        let mut counts = tally(
            self.read_books()
                .flat_map(|book| book.genres().iter().map(String::as_str)),
        );
        counts.retain(|(_, count)| *count > 0);
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(top_n)
            .map(|(genre, count)| GenreCount {
                genre: genre.to_string(),
                count,
            })
            .collect()
    }

    pub fn monthly_timeline(&self) -> Vec<TimelinePoint> {
        let mut months: BTreeMap<String, u64> = BTreeMap::new();
        for date in self.read_books().filter_map(Book::date_read) {
            *months.entry(month_key(date)).or_default() += 1;
        }
        months
            .into_iter()
            .map(|(month, books)| TimelinePoint { month, books })
            .collect()
    }

    /// Mean pages per read book, one decimal. Books without a page count
    /// count as zero pages.
    pub fn average_pages(&self) -> f64 {
        let (books, pages) = self
            .read_books()
            .fold((0u64, 0u64), |(books, pages), book| {
                (books + 1, pages + u64::from(book.pages().unwrap_or_default()))
            });
        if books == 0 {
            return 0.0;
        }
        round_to(pages as f64 / books as f64, 1)
    }

    /// Mean of the non-zero ratings of read books, two decimals.
    pub fn average_rating(&self) -> f64 {
        let ratings: Vec<u32> = self
            .read_books()
            .map(Book::rating)
            .filter(|rating| *rating > 0)
            .collect();
        if ratings.is_empty() {
            return 0.0;
        }
        round_to(ratings.iter().sum::<u32>() as f64 / ratings.len() as f64, 2)
    }

    pub fn total_words(&self) -> u64 {
        self.read_books()
            .filter_map(Book::estimated_words)
            .map(u64::from)
            .sum()
    }

    /// Read books per trimmed series name.
    pub fn series_counts(&self) -> BTreeMap<String, u64> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for series in self.read_books().filter_map(trimmed_series) {
            *counts.entry(series.to_string()).or_default() += 1;
        }
        counts
    }

    pub fn count_read_in_year(&self, year: i32) -> usize {
        self.read_books()
            .filter_map(Book::date_read)
            .filter(|date| date.year() == year)
            .count()
    }

    pub fn series_options(&self) -> Vec<String> {
        let options: BTreeSet<&str> = self
            .baseline
            .iter()
            .filter_map(Book::series)
            .filter(|series| !series.trim().is_empty())
            .collect();
        options.into_iter().map(str::to_string).collect()
    }

    pub fn genre_options(&self) -> Vec<String> {
        let options: BTreeSet<&str> = self
            .baseline
            .iter()
            .flat_map(|book| book.genres().iter().map(String::as_str))
            .filter(|genre| !genre.trim().is_empty())
            .collect();
        options.into_iter().map(str::to_string).collect()
    }
}

fn trimmed_series(book: &Book) -> Option<&str> {
    book.series().map(str::trim).filter(|series| !series.is_empty())
}

// Counts in first-seen order.
fn tally<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match positions.get(item) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// Highest count; the earliest entry wins a tie.
fn leader<'a>(counts: &[(&'a str, usize)]) -> Option<(&'a str, usize)> {
    counts.iter().fold(None, |best, &(key, count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((key, count)),
    })
}

/// Cumulative reveal over a working list: page `n` shows the first
/// `(n + 1) * page_size` books.
#[derive(Debug, Clone)]
pub struct Listing {
    books: Vec<Book>,
    page: usize,
    page_size: usize,
}

impl Listing {
    pub fn new(collection: BookCollection, page_size: usize) -> Self {
        Self {
            books: collection.working,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// Jumps to `page`, clamped to the last page that still reveals something new.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.min(self.last_page());
        self
    }

    pub fn show_more(&self) -> Self {
        let mut next = self.clone();
        if self.has_more() {
            next.page += 1;
        }
        next
    }

    fn last_page(&self) -> usize {
        self.books.len().saturating_sub(1) / self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.books.len()
    }

    pub fn revealed(&self) -> usize {
        ((self.page + 1) * self.page_size).min(self.books.len())
    }

    pub fn visible(&self) -> &[Book] {
        &self.books[..self.revealed()]
    }

    pub fn has_more(&self) -> bool {
        self.revealed() < self.books.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authors::AuthorTable;
    use crate::models::{BookRecord, CustomDates};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn book(value: serde_json::Value) -> Book {
        let record: BookRecord = serde_json::from_value(value).unwrap();
        Book::new(record, &CustomDates::default(), &AuthorTable::default())
    }

    fn collection(values: Vec<serde_json::Value>) -> BookCollection {
        BookCollection::new(values.into_iter().map(book).collect())
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(Book::title).collect()
    }

    #[test]
    fn sort_by_pages_ascending() {
        let books = collection(vec![
            json!({ "Title": "a", "Number of Pages": 300 }),
            json!({ "Title": "b", "Number of Pages": 100 }),
            json!({ "Title": "c", "Number of Pages": 200 }),
        ]);
        let sorted = books.sort_by("pages-asc");
        let pages: Vec<_> = sorted.books().iter().filter_map(Book::pages).collect();
        assert_eq!(pages, vec![100, 200, 300]);
    }

    #[test]
    fn undated_books_sort_last_in_both_directions() {
        let books = collection(vec![
            json!({ "Title": "undated" }),
            json!({ "Title": "old", "Date Read": "2023-01-05" }),
            json!({ "Title": "new", "Date Read": "2024-06-01" }),
        ]);
        assert_eq!(titles(books.sort_by("date-desc").books()), ["new", "old", "undated"]);
        assert_eq!(titles(books.sort_by("date-asc").books()), ["old", "new", "undated"]);
    }

    #[test]
    fn sort_key_parsing_is_lenient() {
        assert_eq!(
            SortKey::parse("rating-asc"),
            SortKey {
                field: SortField::Rating,
                direction: SortDirection::Asc
            }
        );
        assert_eq!(SortKey::parse("whatever").field, SortField::Title);
        assert_eq!(SortKey::parse("date").direction, SortDirection::Desc);
        assert_eq!(SortKey::parse("pages-asc").to_string(), "pages-asc");
        assert_eq!(SortKey::default().to_string(), "date-desc");
    }

    #[test]
    fn sorting_does_not_touch_the_source_snapshot() {
        let books = collection(vec![
            json!({ "Title": "b" }),
            json!({ "Title": "a" }),
        ]);
        let sorted = books.sort_by("title-asc");
        assert_eq!(titles(sorted.books()), ["a", "b"]);
        assert_eq!(titles(books.books()), ["b", "a"]);
    }

    #[test]
    fn most_prolific_author_counts_read_only() {
        let books = collection(vec![
            json!({ "Author": "A", "Exclusive Shelf": "read" }),
            json!({ "Author": "B", "Exclusive Shelf": "read" }),
            json!({ "Author": "A", "Exclusive Shelf": "read" }),
            json!({ "Author": "B", "Exclusive Shelf": "to-read" }),
            json!({ "Author": "B", "Exclusive Shelf": "to-read" }),
        ]);
        assert_eq!(
            books.most_prolific_author(),
            AuthorTally {
                author: "A".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn most_prolific_author_ties_and_empty() {
        let tie = collection(vec![
            json!({ "Author": "B", "Exclusive Shelf": "read" }),
            json!({ "Author": "A", "Exclusive Shelf": "read" }),
        ]);
        assert_eq!(tie.most_prolific_author().author, "B");

        let empty = collection(vec![json!({ "Author": "A", "Exclusive Shelf": "currently-reading" })]);
        assert_eq!(
            empty.most_prolific_author(),
            AuthorTally {
                author: NO_DATA.to_string(),
                count: 0
            }
        );
    }

    #[test]
    fn most_read_genre_for_author() {
        let books = collection(vec![
            json!({ "Author": "A", "Exclusive Shelf": "read", "Genres": ["Drama", "Fantasy"] }),
            json!({ "Author": "A", "Exclusive Shelf": "read", "Genres": ["Fantasy"] }),
            json!({ "Author": "B", "Exclusive Shelf": "read", "Genres": ["Drama", "Drama"] }),
            json!({ "Author": "C", "Exclusive Shelf": "read" }),
        ]);
        assert_eq!(books.most_read_genre_for_author("A"), "Fantasy");
        assert_eq!(books.most_read_genre_for_author("C"), UNKNOWN_GENRE);
        assert_eq!(books.most_read_genre_for_author("nobody"), UNKNOWN_GENRE);
    }

    #[test]
    fn genre_histogram_counts_duplicates() {
        let books = collection(vec![
            json!({ "Exclusive Shelf": "read", "Genres": ["Fantasy", "Drama"] }),
            json!({ "Exclusive Shelf": "read", "Genres": ["Fantasy"] }),
            json!({ "Exclusive Shelf": "read", "Genres": ["Drama", "Drama"] }),
            json!({ "Exclusive Shelf": "to-read", "Genres": ["Horror"] }),
        ]);
        assert_eq!(
            books.genre_histogram(TOP_GENRES),
            vec![
                GenreCount {
                    genre: "Drama".to_string(),
                    count: 3
                },
                GenreCount {
                    genre: "Fantasy".to_string(),
                    count: 2
                },
            ]
        );
        assert_eq!(books.genre_histogram(1).len(), 1);
    }

    #[test]
    fn series_filter_missing_empty_and_idempotent() {
        let books = collection(vec![
            json!({ "Title": "one", "Series": "Дозоры" }),
            json!({ "Title": "two" }),
            json!({ "Title": "three", "Series": "Дозоры" }),
        ]);
        assert!(books.filter_by_series("Nope").is_empty());
        assert_eq!(books.filter_by_series("Nope").filter_by_series("").len(), 3);

        let once = books.filter_by_series("Дозоры");
        let twice = once.filter_by_series("Дозоры");
        assert_eq!(titles(once.books()), ["one", "three"]);
        assert_eq!(titles(once.books()), titles(twice.books()));
    }

    #[test]
    fn genre_filter_and_combined_filter() {
        let books = collection(vec![
            json!({ "Title": "one", "Series": "S", "Genres": ["Fantasy"] }),
            json!({ "Title": "two", "Genres": ["Fantasy", "Drama"] }),
            json!({ "Title": "three", "Series": "S", "Genres": ["Drama"] }),
        ]);
        assert_eq!(titles(books.filter_by_genre("Drama").books()), ["two", "three"]);
        assert_eq!(books.filter_by_genre("").len(), 3);

        let both = books.filter(&BookFilter {
            series: Some("S".to_string()),
            genre: Some("Drama".to_string()),
        });
        assert_eq!(titles(both.books()), ["three"]);
    }

    #[test]
    fn extremes_and_last_read() {
        let books = collection(vec![
            json!({ "Title": "mid", "Number of Pages": 300, "Date Read": "2024-05-01" }),
            json!({ "Title": "long", "Number of Pages": 900, "Date Read": "2024-01-01" }),
            json!({ "Title": "short", "Number of Pages": 90, "Date Read": "2024-09-15" }),
            json!({ "Title": "unread", "Number of Pages": 90 }),
        ]);
        assert_eq!(books.longest_book().title, "long");
        assert_eq!(books.shortest_book().title, "short");
        assert_eq!(books.last_read_book().map(Book::title), Some("short"));

        let empty = BookCollection::new(Vec::new());
        assert_eq!(empty.longest_book().title, NO_DATA);
        assert_eq!(empty.shortest_book().pages, 0);
        assert!(empty.last_read_book().is_none());
    }

    #[test]
    fn random_pick_is_a_read_book() {
        let books = collection(vec![
            json!({ "Title": "r1", "Exclusive Shelf": "read" }),
            json!({ "Title": "t1", "Exclusive Shelf": "to-read" }),
            json!({ "Title": "r2", "Exclusive Shelf": "read" }),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = books.random_read_book(&mut rng).unwrap();
            assert!(picked.is_read());
            assert!(["r1", "r2"].contains(&picked.title()));
        }

        let none = collection(vec![json!({ "Exclusive Shelf": "to-read" })]);
        assert!(none.random_read_book(&mut rng).is_none());
    }

    #[test]
    fn series_grouping_trims_names() {
        let books = collection(vec![
            json!({ "Series": " Дозоры ", "Author": "A" }),
            json!({ "Series": "Дозоры", "Author": "B" }),
            json!({ "Series": "Дозоры", "Author": "A" }),
            json!({ "Series": "  ", "Author": "C" }),
        ]);
        let grouped = books.series_with_authors();
        assert_eq!(grouped.len(), 1);
        assert_eq!(
            grouped["Дозоры"].iter().map(String::as_str).collect::<Vec<_>>(),
            ["A", "B"]
        );

        let shelves = books.series_shelves();
        assert_eq!(shelves.len(), 1);
        assert_eq!(shelves[0].book_count, 3);
        assert_eq!(shelves[0].authors, ["A", "B"]);
        assert_eq!(shelves[0].series, "Дозоры");
        assert_eq!(shelves[0].covers.len(), 3);
    }

    #[test]
    fn read_averages_words_and_series_counts() {
        let books = collection(vec![
            json!({ "Exclusive Shelf": "read", "Number of Pages": 300, "My Rating": 5, "Series": "Дозоры" }),
            json!({ "Exclusive Shelf": "read", "Number of Pages": 101, "My Rating": 4, "Series": " Дозоры" }),
            json!({ "Exclusive Shelf": "read", "My Rating": 0, "Estimated Word Count": 1000 }),
            json!({ "Exclusive Shelf": "to-read", "Number of Pages": 900, "My Rating": 1, "Series": "Other" }),
        ]);
        assert_eq!(books.average_pages(), 133.7);
        assert_eq!(books.average_rating(), 4.5);
        assert_eq!(books.total_words(), (300 + 101) * 275 + 1000);
        assert_eq!(books.series_counts(), BTreeMap::from([("Дозоры".to_string(), 2)]));

        let empty = collection(Vec::new());
        assert_eq!(empty.average_pages(), 0.0);
        assert_eq!(empty.average_rating(), 0.0);
    }

    #[test]
    fn rating_histogram_skips_unrated() {
        let books = collection(vec![
            json!({ "Exclusive Shelf": "read", "My Rating": 5 }),
            json!({ "Exclusive Shelf": "read", "My Rating": 5 }),
            json!({ "Exclusive Shelf": "read", "My Rating": 0 }),
            json!({ "Exclusive Shelf": "read", "My Rating": 3 }),
            json!({ "Exclusive Shelf": "to-read", "My Rating": 1 }),
        ]);
        let counts: Vec<usize> = books.rating_histogram().iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 2]);
    }

    #[test]
    fn timeline_buckets_by_month() {
        let books = collection(vec![
            json!({ "Exclusive Shelf": "read", "Date Read": "2025-02-10" }),
            json!({ "Exclusive Shelf": "read", "Date Read": "2024-12-31" }),
            json!({ "Exclusive Shelf": "read", "Date Read": "2025/02/01" }),
            json!({ "Exclusive Shelf": "read" }),
        ]);
        assert_eq!(
            books.monthly_timeline(),
            vec![
                TimelinePoint {
                    month: "2024-12".to_string(),
                    books: 1
                },
                TimelinePoint {
                    month: "2025-02".to_string(),
                    books: 2
                },
            ]
        );
        assert_eq!(books.count_read_in_year(2025), 2);
    }

    #[test]
    fn filter_options_are_distinct_and_sorted() {
        let books = collection(vec![
            json!({ "Series": "B", "Genres": ["Drama", "Fantasy"] }),
            json!({ "Series": "A", "Genres": ["Drama"] }),
            json!({ "Series": "B" }),
        ]);
        assert_eq!(books.series_options(), ["A", "B"]);
        assert_eq!(books.genre_options(), ["Drama", "Fantasy"]);
    }

    #[test]
    fn pagination_reveals_cumulatively() {
        let books = collection((0..20).map(|i| json!({ "Title": format!("b{i}") })).collect());
        let first = Listing::new(books, PAGE_SIZE);
        assert_eq!(first.revealed(), 9);
        assert!(first.has_more());

        let second = first.show_more();
        assert_eq!(second.revealed(), 18);
        assert_eq!(second.visible()[0].title(), "b0");

        let third = second.show_more();
        assert_eq!(third.revealed(), 20);
        assert!(!third.has_more());
        assert_eq!(third.show_more().page(), third.page());
        assert_eq!(first.revealed(), 9);
    }

    #[test]
    fn listing_page_is_clamped() {
        let books = collection((0..5).map(|i| json!({ "Title": format!("b{i}") })).collect());
        let listing = Listing::new(books, 2).with_page(40);
        assert_eq!(listing.page(), 2);
        assert_eq!(listing.revealed(), 5);

        let empty = Listing::new(BookCollection::new(Vec::new()), PAGE_SIZE);
        assert_eq!(empty.revealed(), 0);
        assert!(!empty.has_more());
    }
}
