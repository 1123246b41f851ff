use chrono::{Datelike, NaiveDate};

/// Parses `YYYY-MM-DD`, accepting `/` as a separator and ignoring any
/// time-of-day suffix.
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.trim().replace('/', "-");
    let date_part = normalized.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Day span counting both endpoints, so a book started and finished on the
/// same day took 1 day.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// Calendar months touched between `start` and `end`, both included.
pub fn inclusive_months(start: NaiveDate, end: NaiveDate) -> i64 {
    i64::from(end.year() - start.year()) * 12 + i64::from(end.month()) - i64::from(start.month())
        + 1
}

pub fn format_dotted(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn plural<'a>(count: i64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    match count {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

pub fn days_label(days: i64) -> String {
    format!("{days} {}", plural(days, "день", "дня", "дней"))
}

/// Book counts follow the full Russian rule, so 21 is "книга" and 12 is "книг".
pub fn books_label(books: i64) -> String {
    let word = match (books.abs() % 10, books.abs() % 100) {
        (_, 11..=14) => "книг",
        (1, _) => "книга",
        (2..=4, _) => "книги",
        _ => "книг",
    };
    format!("{books} {word}")
}

/// Groups digits by three with a no-break space, matching `ru-RU` number
/// formatting.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push('\u{a0}');
        }
        out.push(ch);
    }
    out
}
