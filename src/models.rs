use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shelf {
    Read,
    CurrentlyReading,
    ToRead,
    #[serde(other)]
    Other,
}

impl Shelf {
    /// Reads an `Exclusive Shelf` value. Blank is no shelf, anything
    /// unrecognised is [`Shelf::Other`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "read" => Some(Self::Read),
            "currently-reading" => Some(Self::CurrentlyReading),
            "to-read" => Some(Self::ToRead),
            _ => Some(Self::Other),
        }
    }
}

/// One entry of `book_list`, keyed the way the Goodreads export names its columns.
///
/// Every field is optional. `null`, a missing key and a blank string are all
/// read as "no value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "Title", default, deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(rename = "Author", default, deserialize_with = "text")]
    pub author: Option<String>,
    #[serde(rename = "Additional Authors", default, deserialize_with = "text")]
    pub additional_authors: Option<String>,
    #[serde(rename = "Number of Pages", default, deserialize_with = "count")]
    pub pages: Option<u32>,
    #[serde(rename = "Estimated Word Count", default, deserialize_with = "count")]
    pub estimated_word_count: Option<u32>,
    #[serde(rename = "My Rating", default, deserialize_with = "count")]
    pub rating: Option<u32>,
    #[serde(rename = "Date Read", default, deserialize_with = "text")]
    pub date_read: Option<String>,
    #[serde(rename = "Date Added", default, deserialize_with = "text")]
    pub date_added: Option<String>,
    #[serde(rename = "Days Spent", default, deserialize_with = "count")]
    pub days_spent: Option<u32>,
    #[serde(rename = "Series", default, deserialize_with = "text")]
    pub series: Option<String>,
    #[serde(rename = "Genres", default, deserialize_with = "text_list")]
    pub genres: Vec<String>,
    #[serde(rename = "Exclusive Shelf", default, deserialize_with = "shelf")]
    pub shelf: Option<Shelf>,
    #[serde(rename = "Cover URL", default, deserialize_with = "text")]
    pub cover_url: Option<String>,
    #[serde(rename = "Book Id", default, deserialize_with = "text")]
    pub book_id: Option<String>,
    #[serde(rename = "ISBN", default, deserialize_with = "text")]
    pub isbn: Option<String>,
    #[serde(rename = "ISBN13", default, deserialize_with = "text")]
    pub isbn13: Option<String>,
    #[serde(rename = "Annotation", default, deserialize_with = "text")]
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomDateOverride {
    #[serde(default, deserialize_with = "text")]
    pub custom_start_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub custom_end_date: Option<String>,
}

/// Per-title corrections for books whose `Date Added` does not reflect when
/// reading actually started.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomDates {
    #[serde(default)]
    pub books: HashMap<String, CustomDateOverride>,
}

impl CustomDates {
    pub fn lookup(&self, title: &str) -> Option<&CustomDateOverride> {
        self.books.get(title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookExtreme {
    #[serde(rename(deserialize = "Title"), alias = "title", default)]
    pub title: String,
    #[serde(
        rename(deserialize = "Number of Pages"),
        alias = "pages",
        default,
        deserialize_with = "count_or_zero"
    )]
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    #[serde(rename(deserialize = "Date"), alias = "month")]
    pub month: String,
    #[serde(rename(deserialize = "Books"), alias = "books", deserialize_with = "whole")]
    pub books: u64,
}

/// The precomputed statistics document (`reading_stats.json`).
///
/// Only `book_list` is required. Aggregates that are missing, `null` or of the
/// wrong type fall back to zero or empty, and unusable list entries are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsDocument {
    #[serde(deserialize_with = "entries")]
    pub book_list: Vec<BookRecord>,
    #[serde(default, deserialize_with = "whole")]
    pub total_books: u64,
    #[serde(default, deserialize_with = "whole")]
    pub total_pages: u64,
    #[serde(default, deserialize_with = "whole")]
    pub books_2025: u64,
    #[serde(default, deserialize_with = "decimal")]
    pub avg_pages: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub avg_rating: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub longest_book: Option<BookExtreme>,
    #[serde(default, deserialize_with = "lenient")]
    pub shortest_book: Option<BookExtreme>,
    #[serde(default, deserialize_with = "tallies")]
    pub series_counts: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "entries")]
    pub timeline: Vec<TimelinePoint>,
}

/// Query string of the dashboard and `/api/books`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    pub series: Option<String>,
    pub genre: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorTally {
    pub author: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesShelf {
    pub series: String,
    pub book_count: usize,
    pub authors: Vec<String>,
    pub covers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub book_id: Option<String>,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub link: String,
    pub pages: Option<u32>,
    pub rating: u32,
    pub series: Option<String>,
    pub genres: Vec<String>,
    pub shelf: Option<Shelf>,
    pub date_read: Option<String>,
    pub date_read_label: String,
    pub reading_days: Option<i64>,
    pub days_spent: Option<u32>,
    pub estimated_words: Option<u32>,
    pub isbn: Option<String>,
    pub isbn13: Option<String>,
    pub annotation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub page: usize,
    pub page_size: usize,
    pub revealed: usize,
    pub total: usize,
    pub has_more: bool,
    pub books: Vec<BookView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeProgress {
    pub year: i32,
    pub goal: u32,
    pub books_read: usize,
    pub percent: u32,
    pub days_left: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorSpotlight {
    pub author: String,
    pub book_count: usize,
    pub top_genre: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub total_books: u64,
    pub total_pages: u64,
    pub books_2025: u64,
    pub total_words: u64,
    pub total_series: usize,
    pub average_books_per_month: f64,
    pub average_pages: f64,
    pub average_rating: f64,
    pub longest_book: BookExtreme,
    pub shortest_book: BookExtreme,
    pub challenge: ChallengeProgress,
    pub spotlight: AuthorSpotlight,
    pub current_book: Option<BookView>,
    pub last_read_book: Option<BookView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartsResponse {
    pub ratings: Vec<RatingBucket>,
    pub genres: Vec<GenreCount>,
    pub timeline: Vec<TimelinePoint>,
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value),
        Some(Value::Number(number)) => Some(match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 => format!("{}", float as i64),
            _ => number.to_string(),
        }),
        _ => None,
    })
}

fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(value) if !value.trim().is_empty() => Some(value),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn number(value: Option<Value>) -> Option<f64> {
    let float = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(value) => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    float.filter(|value| value.is_finite() && *value >= 0.0)
}

fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(Option::deserialize(deserializer)?).map(|value| value as u32))
}

fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(count(deserializer)?.unwrap_or_default())
}

fn whole<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(Option::deserialize(deserializer)?).map_or(0, |value| value as u64))
}

fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(Option::deserialize(deserializer)?).unwrap_or_default())
}

fn shelf<'de, D>(deserializer: D) -> Result<Option<Shelf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Shelf::parse(&value),
        _ => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| serde_json::from_value(value).ok()))
}

// Entries that do not decode are dropped. A non-list reads as empty.
fn entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn tallies<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(key, value)| Some((key, number(Some(value))? as u64)))
            .collect(),
        _ => BTreeMap::new(),
    })
}
