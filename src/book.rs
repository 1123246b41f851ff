use crate::authors::AuthorDirectory;
use crate::dates::{days_label, format_dotted, inclusive_days, parse_loose_date};
use crate::models::{BookRecord, BookView, CustomDateOverride, CustomDates, Shelf};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;

pub const NO_AUTHOR: &str = "No Author";
pub const PLACEHOLDER_COVER: &str = "https://placehold.co/100x150?text=Нет+обложки";
pub const NO_ANNOTATION: &str = "Нет аннотации";
pub const DISPLAY_GENRES: usize = 3;
pub const WORDS_PER_PAGE: u32 = 275;

const INSECURE_COVER_HOST: &str = "http://books.google.com";
const GOODREADS_BOOK_URL: &str = "https://www.goodreads.com/book/show/";

/// A record with its display fields resolved. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Book {
    record: Arc<BookRecord>,
    display_author: String,
    dates: CustomDateOverride,
}

impl Book {
    pub fn new(record: BookRecord, custom_dates: &CustomDates, authors: &dyn AuthorDirectory) -> Self {
        let display_author = resolve_author(&record, authors);
        let dates = record
            .title
            .as_deref()
            .and_then(|title| custom_dates.lookup(title))
            .cloned()
            .unwrap_or_default();
        Self {
            record: Arc::new(record),
            display_author,
            dates,
        }
    }

    pub fn record(&self) -> &BookRecord {
        &self.record
    }

    pub fn title(&self) -> &str {
        self.record.title.as_deref().unwrap_or_default()
    }

    pub fn display_author(&self) -> &str {
        &self.display_author
    }

    pub fn custom_dates(&self) -> &CustomDateOverride {
        &self.dates
    }

    pub fn shelf(&self) -> Option<Shelf> {
        self.record.shelf
    }

    pub fn is_read(&self) -> bool {
        self.record.shelf == Some(Shelf::Read)
    }

    pub fn pages(&self) -> Option<u32> {
        self.record.pages
    }

    pub fn rating(&self) -> u32 {
        self.record.rating.unwrap_or_default()
    }

    pub fn series(&self) -> Option<&str> {
        self.record.series.as_deref()
    }

    pub fn genres(&self) -> &[String] {
        &self.record.genres
    }

    pub fn date_read(&self) -> Option<NaiveDate> {
        self.record.date_read.as_deref().and_then(parse_loose_date)
    }

    pub fn date_added(&self) -> Option<NaiveDate> {
        self.record.date_added.as_deref().and_then(parse_loose_date)
    }

    pub fn cover_url(&self) -> String {
        match self.record.cover_url.as_deref() {
            Some(url) if url.starts_with(INSECURE_COVER_HOST) => url.replacen("http://", "https://", 1),
            Some(url) => url.to_string(),
            None => PLACEHOLDER_COVER.to_string(),
        }
    }

    /// Days spent reading, counting the start and finish days.
    ///
    /// The start is the custom start date for this title when one exists,
    /// otherwise `Date Added`. Returns `None` when either end is missing or
    /// does not parse.
    pub fn reading_duration_days(&self) -> Option<i64> {
        let raw_end = self.record.date_read.as_deref()?;
        let raw_start = self
            .dates
            .custom_start_date
            .as_deref()
            .or(self.record.date_added.as_deref())?;

        match (parse_loose_date(raw_start), parse_loose_date(raw_end)) {
            (Some(start), Some(end)) => Some(inclusive_days(start, end)),
            _ => {
                warn!(
                    title = self.title(),
                    start = raw_start,
                    end = raw_end,
                    "invalid reading dates"
                );
                None
            }
        }
    }

    pub fn format_date_read(&self) -> String {
        let Some(raw) = self.record.date_read.as_deref() else {
            return String::new();
        };
        let Some(date) = parse_loose_date(raw) else {
            return raw.to_string();
        };
        match self.reading_duration_days() {
            Some(days) => format!("{} ({})", format_dotted(date), days_label(days)),
            None => format_dotted(date),
        }
    }

    pub fn goodreads_link(&self) -> String {
        match self.record.book_id.as_deref() {
            Some(id) => format!("{GOODREADS_BOOK_URL}{id}"),
            None => "#".to_string(),
        }
    }

    /// The exported word estimate, else pages times [`WORDS_PER_PAGE`].
    pub fn estimated_words(&self) -> Option<u32> {
        self.record
            .estimated_word_count
            .or_else(|| self.pages().map(|pages| pages.saturating_mul(WORDS_PER_PAGE)))
    }

    pub fn display_genres(&self) -> &[String] {
        let genres = self.genres();
        &genres[..genres.len().min(DISPLAY_GENRES)]
    }

    pub fn annotation(&self) -> &str {
        self.record.annotation.as_deref().unwrap_or(NO_ANNOTATION)
    }

    pub fn to_view(&self) -> BookView {
        BookView {
            book_id: self.record.book_id.clone(),
            title: self.title().to_string(),
            author: self.display_author.clone(),
            cover_url: self.cover_url(),
            link: self.goodreads_link(),
            pages: self.pages(),
            rating: self.rating(),
            series: self.record.series.clone(),
            genres: self.display_genres().to_vec(),
            shelf: self.shelf(),
            date_read: self.date_read().map(|date| date.to_string()),
            date_read_label: self.format_date_read(),
            reading_days: self.reading_duration_days(),
            days_spent: self.record.days_spent,
            estimated_words: self.estimated_words(),
            isbn: self.record.isbn.clone(),
            isbn13: self.record.isbn13.clone(),
            annotation: self.annotation().to_string(),
        }
    }
}

fn resolve_author(record: &BookRecord, authors: &dyn AuthorDirectory) -> String {
    if let Some(raw) = record.author.as_deref() {
        return authors.canonical_name(raw).unwrap_or(raw).to_string();
    }
    record
        .additional_authors
        .as_deref()
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(NO_AUTHOR)
        .to_string()
}
