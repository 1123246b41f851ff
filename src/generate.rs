use crate::authors::AuthorTable;
use crate::book::{Book, WORDS_PER_PAGE};
use crate::collection::BookCollection;
use crate::dates::parse_loose_date;
use crate::models::{BookRecord, CustomDates, Shelf, StatsDocument};
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use tracing::{info, warn};

/// One row of the Goodreads library export. `Cover URL`, `Genres` and
/// `Annotation` are enrichment columns and usually absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Book Id", default)]
    pub book_id: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Author", default)]
    pub author: Option<String>,
    #[serde(rename = "Additional Authors", default)]
    pub additional_authors: Option<String>,
    #[serde(rename = "ISBN", default)]
    pub isbn: Option<String>,
    #[serde(rename = "ISBN13", default)]
    pub isbn13: Option<String>,
    #[serde(rename = "My Rating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Number of Pages", default)]
    pub pages: Option<String>,
    #[serde(rename = "Date Read", default)]
    pub date_read: Option<String>,
    #[serde(rename = "Date Added", default)]
    pub date_added: Option<String>,
    #[serde(rename = "Exclusive Shelf", default)]
    pub shelf: Option<String>,
    #[serde(rename = "Cover URL", default)]
    pub cover_url: Option<String>,
    #[serde(rename = "Genres", default)]
    pub genres: Option<String>,
    #[serde(rename = "Annotation", default)]
    pub annotation: Option<String>,
}

impl ExportRow {
    /// Normalizes the row into a `book_list` record. `series_titles` maps a raw
    /// export title to its series and wins over the series found in the title.
    pub fn into_record(self, series_titles: &HashMap<String, String>) -> BookRecord {
        let raw_title = non_blank(self.title).unwrap_or_default();
        let (title, found_series) = split_series(&raw_title);
        let series = series_titles.get(&raw_title).cloned().or(found_series);

        let pages = whole_number(self.pages.as_deref()).unwrap_or_default();
        let date_read = iso_date(self.date_read.as_deref());
        let date_added = iso_date(self.date_added.as_deref());
        let days_spent = match (date_read, date_added) {
            (Some(read), Some(added)) => u32::try_from((read - added).num_days()).ok(),
            _ => None,
        };

        BookRecord {
            title: Some(title).filter(|title| !title.is_empty()),
            author: non_blank(self.author),
            additional_authors: non_blank(self.additional_authors),
            pages: Some(pages),
            estimated_word_count: Some(pages.saturating_mul(WORDS_PER_PAGE)),
            rating: Some(whole_number(self.rating.as_deref()).unwrap_or_default()),
            date_read: date_read.map(|date| date.to_string()),
            date_added: date_added.map(|date| date.to_string()),
            days_spent,
            series,
            genres: self
                .genres
                .as_deref()
                .map(|genres| {
                    genres
                        .split(',')
                        .map(str::trim)
                        .filter(|genre| !genre.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            shelf: self.shelf.as_deref().and_then(Shelf::parse),
            cover_url: non_blank(self.cover_url).filter(|url| url != "None"),
            book_id: non_blank(self.book_id),
            isbn: self.isbn.as_deref().and_then(strip_isbn),
            isbn13: self.isbn13.as_deref().and_then(strip_isbn),
            annotation: non_blank(self.annotation),
        }
    }
}

/// Reads export rows, skipping rows the CSV reader rejects.
pub fn read_export<R: io::Read>(reader: R) -> Result<Vec<ExportRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut rows = Vec::new();
    for (index, row) in reader.deserialize::<ExportRow>().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => warn!(row = index + 1, "skipping export row: {err}"),
        }
    }
    info!("read {} export rows", rows.len());
    Ok(rows)
}

/// Builds the statistics document. Aggregates cover `read` books only;
/// `books_2025` counts the ones finished in `year`.
pub fn generate_stats(records: Vec<BookRecord>, year: i32) -> StatsDocument {
    let custom_dates = CustomDates::default();
    let authors = AuthorTable::default();
    let read = BookCollection::new(
        records
            .iter()
            .filter(|record| record.shelf == Some(Shelf::Read))
            .cloned()
            .map(|record| Book::new(record, &custom_dates, &authors))
            .collect(),
    );

    let document = StatsDocument {
        total_books: read.len() as u64,
        total_pages: read
            .books()
            .iter()
            .map(|book| u64::from(book.pages().unwrap_or_default()))
            .sum(),
        books_2025: read.count_read_in_year(year) as u64,
        avg_pages: read.average_pages(),
        avg_rating: read.average_rating(),
        longest_book: Some(read.longest_book()),
        shortest_book: Some(read.shortest_book()),
        series_counts: read.series_counts(),
        timeline: read.monthly_timeline(),
        book_list: records,
    };
    info!(
        records = document.book_list.len(),
        read = document.total_books,
        "statistics generated"
    );
    document
}

/// Splits `"Title (Series, #2)"` into the cleaned title and the series name.
///
/// Every non-empty parenthesised group is removed from the title; the first
/// one shaped like `Name, #N` names the series.
pub fn split_series(raw: &str) -> (String, Option<String>) {
    let mut title = String::with_capacity(raw.len());
    let mut series = None;
    let mut rest = raw;
    while let Some(open) = rest.find('(') {
        let Some(len) = rest[open + 1..].find(')') else {
            break;
        };
        if len == 0 {
            title.push_str(&rest[..open + 2]);
            rest = &rest[open + 2..];
            continue;
        }
        let group = &rest[open + 1..open + 1 + len];
        title.push_str(rest[..open].trim_end());
        if series.is_none() {
            series = series_name(group);
        }
        rest = &rest[open + len + 2..];
    }
    title.push_str(rest);
    (title.trim().to_string(), series)
}

fn series_name(group: &str) -> Option<String> {
    let (name, number) = group.split_once(',')?;
    let number = number.trim_start();
    let number = number.strip_prefix('#').unwrap_or(number);
    let name = name.trim();
    let numbered = !number.is_empty() && number.chars().all(|ch| ch.is_ascii_digit());
    (numbered && !name.is_empty()).then(|| name.to_string())
}

/// Goodreads writes ISBNs as `="0123456789"`.
pub fn strip_isbn(raw: &str) -> Option<String> {
    let isbn = raw.trim().trim_matches(|ch| ch == '=' || ch == '"').trim();
    (!isbn.is_empty()).then(|| isbn.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn whole_number(raw: Option<&str>) -> Option<u32> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value as u32)
}

fn iso_date(raw: Option<&str>) -> Option<chrono::NaiveDate> {
    raw.and_then(parse_loose_date)
}
