use crate::book::Book;
use crate::collection::{Listing, SortKey};
use crate::dashboard::Dashboard;
use crate::dates::{books_label, days_label, group_thousands};
use crate::models::{ChartsResponse, ListingParams, SeriesShelf, SummaryResponse};
use std::fmt::Write as _;

const SORT_CHOICES: &[(&str, &str)] = &[
    ("date-desc", "Сначала новые"),
    ("date-asc", "Сначала старые"),
    ("pages-desc", "Больше страниц"),
    ("pages-asc", "Меньше страниц"),
    ("rating-desc", "Выше оценка"),
    ("rating-asc", "Ниже оценка"),
    ("title-asc", "Название А–Я"),
    ("title-desc", "Название Я–А"),
];

const SHELF_COVERS: usize = 6;

pub fn render_index(
    dashboard: &Dashboard,
    params: &ListingParams,
    summary: &SummaryResponse,
    featured: Option<&Book>,
) -> String {
    let listing = dashboard.listing(params);
    let charts = dashboard.charts();
    let sort = params
        .sort
        .as_deref()
        .filter(|sort| !sort.is_empty())
        .map(SortKey::parse)
        .unwrap_or_default()
        .to_string();
    let challenge = &summary.challenge;

    fill(
        INDEX_HTML,
        &[
            ("TOTAL_BOOKS", escape(&books_label(summary.total_books as i64))),
            ("TOTAL_PAGES", format!("{} страниц", group_thousands(summary.total_pages))),
            ("YEAR", challenge.year.to_string()),
            ("BOOKS_YEAR", challenge.books_read.to_string()),
            ("FEATURED", render_featured(featured)),
            ("CURRENT_BOOK", render_compact_or(dashboard.current().books().first(), "Ничего не читаю сейчас")),
            ("LAST_READ", render_compact_or(dashboard.read().last_read_book(), "Нет прочитанных книг")),
            ("SPOTLIGHT_PHOTO", escape(&summary.spotlight.photo_url)),
            ("SPOTLIGHT_AUTHOR", escape(&summary.spotlight.author)),
            ("SPOTLIGHT_COUNT", books_label(summary.spotlight.book_count as i64)),
            ("SPOTLIGHT_GENRE", escape(&summary.spotlight.top_genre)),
            ("LONGEST", render_extreme(&summary.longest_book.title, summary.longest_book.pages)),
            ("SHORTEST", render_extreme(&summary.shortest_book.title, summary.shortest_book.pages)),
            ("TOTAL_SERIES", summary.total_series.to_string()),
            ("AVERAGE", format!("{:.1} книг", summary.average_books_per_month)),
            ("AVERAGE_PAGES", format!("{:.1}", summary.average_pages)),
            ("AVERAGE_RATING", format!("{:.2}", summary.average_rating)),
            ("TOTAL_WORDS", group_thousands(summary.total_words)),
            ("CHALLENGE_GOAL", challenge.goal.to_string()),
            ("CHALLENGE_PERCENT", challenge.percent.to_string()),
            ("CHALLENGE_DAYS", format!("Осталось {}", days_label(challenge.days_left))),
            ("TIMELINE_CHART", render_timeline_chart(&charts)),
            ("RATING_CHART", render_rating_chart(&charts)),
            ("GENRE_CHART", render_genre_chart(&charts)),
            ("SERIES_OPTIONS", render_options(dashboard.series_options(), params.series.as_deref(), "Все циклы")),
            ("GENRE_OPTIONS", render_options(dashboard.genre_options(), params.genre.as_deref(), "Все жанры")),
            ("SORT_OPTIONS", render_sort_options(&sort)),
            ("LISTING_STATUS", format!("Показано {} из {}", listing.revealed(), listing.total())),
            ("BOOK_LIST", render_book_list(&listing)),
            ("LOAD_MORE", render_load_more(&listing, params, &sort)),
            ("FUTURE_READS", render_future_reads(dashboard.to_read().books())),
            ("SERIES_SHELF", render_series_shelf(&dashboard.series_shelves())),
        ],
    )
}

/// Substitutes `{{KEY}}` markers in one pass, so replacement text is never
/// scanned for further markers.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn stars(rating: u32) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn cover_img(book: &Book, class: &str) -> String {
    format!(
        r#"<img class="{class}" src="{src}" alt="{alt}" loading="lazy" data-fallback="{fallback}">"#,
        src = escape(&book.cover_url()),
        alt = escape(book.title()),
        fallback = escape(crate::book::PLACEHOLDER_COVER),
    )
}

pub fn render_book_card(book: &Book) -> String {
    let mut meta = String::new();
    let _ = write!(meta, r#"<p class="meta">👤 {}</p>"#, escape(book.display_author()));
    if let Some(pages) = book.pages() {
        let _ = write!(meta, r#"<p class="meta">📖 {pages}</p>"#);
    }
    if let Some(series) = book.series() {
        let _ = write!(meta, r#"<p class="meta">📚 {}</p>"#, escape(series));
    }
    let genres = book.display_genres();
    if !genres.is_empty() {
        let _ = write!(meta, r#"<p class="meta">🎭 {}</p>"#, escape(&genres.join(", ")));
    }
    let read = book.format_date_read();
    if !read.is_empty() {
        let _ = write!(meta, r#"<p class="meta">📅 {}</p>"#, escape(&read));
    }
    let rating = match book.rating() {
        0 => String::new(),
        rating => format!(r#"<p class="stars" data-rating="{rating}">{}</p>"#, stars(rating)),
    };

    format!(
        r#"<article class="book-card">
  <button class="flip" type="button" aria-label="Перевернуть">⟲</button>
  <div class="flipper">
    <div class="front">
      {cover}
      <div class="details">
        <h3><a href="{link}" target="_blank" rel="noopener">{title}</a></h3>
        {meta}
        {rating}
      </div>
    </div>
    <div class="back"><p>{annotation}</p></div>
  </div>
</article>"#,
        cover = cover_img(book, "cover"),
        link = escape(&book.goodreads_link()),
        title = escape(book.title()),
        annotation = escape(book.annotation()),
    )
}

pub fn render_compact(book: &Book) -> String {
    let mut lines = format!(
        r#"<p class="meta">Автор: {}</p>"#,
        escape(book.display_author())
    );
    if let Some(pages) = book.pages() {
        let _ = write!(lines, r#"<p class="meta">Страниц: {pages}</p>"#);
    }
    if let Some(series) = book.series() {
        let _ = write!(lines, r#"<p class="meta">Серия: {}</p>"#, escape(series));
    }
    if let Some(date) = book.date_read() {
        let _ = write!(
            lines,
            r#"<p class="meta">Прочитано: {}</p>"#,
            crate::dates::format_dotted(date)
        );
    }
    format!(
        r#"<div class="compact">{cover}<div><h3>{title}</h3>{lines}</div></div>"#,
        cover = cover_img(book, "cover small"),
        title = escape(book.title()),
    )
}

fn render_compact_or(book: Option<&Book>, empty: &str) -> String {
    match book {
        Some(book) => render_compact(book),
        None => format!(r#"<p class="empty">{}</p>"#, escape(empty)),
    }
}

fn render_featured(book: Option<&Book>) -> String {
    match book {
        Some(book) => cover_img(book, "cover featured"),
        None => r#"<p class="empty">Нет прочитанных книг</p>"#.to_string(),
    }
}

fn render_extreme(title: &str, pages: u32) -> String {
    format!("{} ({pages} страниц)", escape(title))
}

fn render_options(options: &[String], selected: Option<&str>, any_label: &str) -> String {
    let mut out = format!(r#"<option value="">{}</option>"#, escape(any_label));
    for option in options {
        let marker = if selected == Some(option.as_str()) { " selected" } else { "" };
        let value = escape(option);
        let _ = write!(out, r#"<option value="{value}"{marker}>{value}</option>"#);
    }
    out
}

fn render_sort_options(selected: &str) -> String {
    let mut out = String::new();
    for (value, label) in SORT_CHOICES {
        let marker = if *value == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{value}"{marker}>{label}</option>"#);
    }
    out
}

pub fn render_book_list(listing: &Listing) -> String {
    if listing.total() == 0 {
        return r#"<p class="empty">Книги не найдены</p>"#.to_string();
    }
    listing
        .visible()
        .iter()
        .map(render_book_card)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_load_more(listing: &Listing, params: &ListingParams, sort: &str) -> String {
    if !listing.has_more() {
        return String::new();
    }
    let hidden = |name: &str, value: Option<&str>| match value.filter(|v| !v.is_empty()) {
        Some(value) => format!(r#"<input type="hidden" name="{name}" value="{}">"#, escape(value)),
        None => String::new(),
    };
    format!(
        r##"<form class="load-more" method="get" action="/#books">{series}{genre}<input type="hidden" name="sort" value="{sort}"><input type="hidden" name="page" value="{page}"><button type="submit">Показать ещё</button></form>"##,
        series = hidden("series", params.series.as_deref()),
        genre = hidden("genre", params.genre.as_deref()),
        sort = escape(sort),
        page = listing.show_more().page(),
    )
}

fn render_future_reads(books: &[Book]) -> String {
    if books.is_empty() {
        return String::new();
    }
    let items: String = books
        .iter()
        .map(|book| {
            format!(
                r#"<li>{cover}<span>{title}</span><small>{author}</small></li>"#,
                cover = cover_img(book, "cover small"),
                title = escape(book.title()),
                author = escape(book.display_author()),
            )
        })
        .collect();
    format!(r#"<section class="card wide"><h2>Планы на чтение</h2><ul class="future">{items}</ul></section>"#)
}

fn render_series_shelf(shelves: &[SeriesShelf]) -> String {
    if shelves.is_empty() {
        return r#"<p class="empty">Циклов пока нет</p>"#.to_string();
    }
    let mut out = String::new();
    for shelf in shelves {
        let covers: String = shelf
            .covers
            .iter()
            .take(SHELF_COVERS)
            .map(|src| format!(r#"<img class="cover tiny" src="{}" alt="">"#, escape(src)))
            .collect();
        let _ = write!(
            out,
            r#"<div class="shelf"><h3>{name}</h3><p class="meta">{count} · {authors}</p><div class="covers">{covers}</div></div>"#,
            name = escape(&shelf.series),
            count = books_label(shelf.book_count as i64),
            authors = escape(&shelf.authors.join(", ")),
        );
    }
    out
}

/// Vertical bar chart as inline SVG. Bar heights are relative to the top value.
fn render_bars(bars: &[(String, u64)], color: &str) -> String {
    if bars.is_empty() {
        return r#"<p class="empty">Нет данных</p>"#.to_string();
    }
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 200.0;
    const LABEL_SPACE: f64 = 28.0;

    let max = bars.iter().map(|(_, value)| *value).max().unwrap_or(0).max(1) as f64;
    let slot = WIDTH / bars.len() as f64;
    let bar_width = (slot * 0.7).max(2.0);

    let mut out = format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {total}" role="img">"#,
        total = HEIGHT + LABEL_SPACE
    );
    for (index, (label, value)) in bars.iter().enumerate() {
        let height = (*value as f64 / max) * (HEIGHT - 16.0);
        let x = index as f64 * slot + (slot - bar_width) / 2.0;
        let y = HEIGHT - height;
        let center = x + bar_width / 2.0;
        let _ = write!(
            out,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" rx="4" fill="{color}"><title>{label}: {value}</title></rect>"#,
            label = escape(label),
        );
        if *value > 0 {
            let _ = write!(
                out,
                r#"<text class="value" x="{center:.1}" y="{ty:.1}" text-anchor="middle">{value}</text>"#,
                ty = y - 4.0
            );
        }
        let _ = write!(
            out,
            r#"<text class="label" x="{center:.1}" y="{ly:.1}" text-anchor="middle">{label}</text>"#,
            ly = HEIGHT + 18.0,
            label = escape(label),
        );
    }
    out.push_str("</svg>");
    out
}

fn render_timeline_chart(charts: &ChartsResponse) -> String {
    let bars: Vec<(String, u64)> = charts
        .timeline
        .iter()
        .map(|point| (point.month.clone(), point.books))
        .collect();
    render_bars(&bars, "#2563eb")
}

fn render_rating_chart(charts: &ChartsResponse) -> String {
    let bars: Vec<(String, u64)> = charts
        .ratings
        .iter()
        .map(|bucket| (stars(u32::from(bucket.rating)), bucket.count as u64))
        .collect();
    render_bars(&bars, "#4f46e5")
}

fn render_genre_chart(charts: &ChartsResponse) -> String {
    if charts.genres.is_empty() {
        return r#"<p class="empty">Нет данных</p>"#.to_string();
    }
    let total: usize = charts.genres.iter().map(|genre| genre.count).sum();
    let mut out = String::from(r#"<ul class="genres">"#);
    for (genre, color) in charts.genres.iter().zip(GENRE_COLORS.iter().cycle()) {
        let share = genre.count * 100 / total.max(1);
        let _ = write!(
            out,
            r#"<li><span class="name">{name}</span><span class="bar" style="width:{share}%;background:{color}"></span><span class="count">{count}</span></li>"#,
            name = escape(&genre.genre),
            count = books_label(genre.count as i64),
        );
    }
    out.push_str("</ul>");
    out
}

const GENRE_COLORS: &[&str] = &["#4f46e5", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="ru">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Книжная полка</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #2b2a28;
      --muted: #6b645d;
      --accent: #4f46e5;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(47, 72, 88, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 28px 18px 48px;
    }

    main {
      width: min(1180px, 100%);
      margin: 0 auto;
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
      gap: 20px;
    }

    h1 {
      grid-column: 1 / -1;
      font-family: "Georgia", serif;
      margin: 0 0 4px;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
    }

    h3 {
      margin: 0 0 4px;
      font-size: 1rem;
    }

    a {
      color: inherit;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .wide {
      grid-column: 1 / -1;
    }

    .meta, .empty {
      margin: 2px 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .stars {
      color: #eab308;
      margin: 6px 0 0;
    }

    .cover {
      width: 100px;
      height: 150px;
      object-fit: cover;
      border-radius: 6px;
      flex-shrink: 0;
    }

    .cover.small {
      width: 64px;
      height: 96px;
    }

    .cover.tiny {
      width: 40px;
      height: 60px;
    }

    .compact, .front {
      display: flex;
      gap: 14px;
    }

    .progress {
      height: 12px;
      background: #e5e7eb;
      border-radius: 999px;
      overflow: hidden;
      margin: 10px 0;
    }

    .progress span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      margin-bottom: 16px;
    }

    select, button {
      font: inherit;
      padding: 8px 12px;
      border-radius: 10px;
      border: 1px solid #d6d3d1;
      background: white;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(320px, 1fr));
      gap: 16px;
    }

    .book-card {
      position: relative;
      perspective: 1000px;
      min-height: 210px;
    }

    .flipper {
      position: relative;
      height: 100%;
      min-height: 210px;
      transition: transform 0.5s;
      transform-style: preserve-3d;
    }

    .book-card.flipped .flipper {
      transform: rotateY(180deg);
    }

    .front, .back {
      position: absolute;
      inset: 0;
      padding: 16px;
      background: #fafaf9;
      border-radius: 16px;
      backface-visibility: hidden;
    }

    .back {
      transform: rotateY(180deg);
      overflow-y: auto;
      font-size: 0.9rem;
      text-align: justify;
    }

    .flip {
      position: absolute;
      top: 8px;
      right: 8px;
      z-index: 2;
      padding: 2px 8px;
    }

    .load-more {
      margin-top: 16px;
      text-align: center;
    }

    .chart {
      width: 100%;
      height: auto;
    }

    .chart .label, .chart .value {
      font-size: 11px;
      fill: var(--muted);
    }

    .genres {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    .genres li {
      display: grid;
      grid-template-columns: 120px 1fr auto;
      gap: 8px;
      align-items: center;
      font-size: 0.9rem;
    }

    .genres .bar {
      height: 10px;
      border-radius: 999px;
    }

    .future {
      list-style: none;
      padding: 0;
      display: flex;
      flex-wrap: wrap;
      gap: 16px;
    }

    .future li {
      display: grid;
      gap: 4px;
      width: 120px;
      font-size: 0.85rem;
    }

    .shelf {
      margin-bottom: 16px;
    }

    .covers {
      display: flex;
      gap: 6px;
    }
  </style>
</head>
<body>
  <main>
    <h1>Книжная полка</h1>

    <section class="card" id="total-book">
      <h2>Всего</h2>
      <div class="compact">
        {{FEATURED}}
        <div>
          <p>{{TOTAL_BOOKS}}</p>
          <p>{{TOTAL_PAGES}}</p>
          <p>В {{YEAR}}: <span>{{BOOKS_YEAR}}</span></p>
        </div>
      </div>
    </section>

    <section class="card" id="current-book">
      <h2>Читаю сейчас</h2>
      {{CURRENT_BOOK}}
    </section>

    <section class="card" id="last-read-book">
      <h2>Последняя прочитанная</h2>
      {{LAST_READ}}
    </section>

    <section class="card" id="most-prolific-author">
      <h2>Самый читаемый</h2>
      <div class="compact">
        <img class="cover small" src="{{SPOTLIGHT_PHOTO}}" alt="{{SPOTLIGHT_AUTHOR}}">
        <div>
          <h3>Автор: {{SPOTLIGHT_AUTHOR}}</h3>
          <p class="meta">{{SPOTLIGHT_COUNT}}</p>
          <h3>Жанр: {{SPOTLIGHT_GENRE}}</h3>
        </div>
      </div>
    </section>

    <section class="card">
      <h2>Книжные рекорды</h2>
      <p class="meta">Самая длинная: <span id="longest-book">{{LONGEST}}</span></p>
      <p class="meta">Самая короткая: <span id="shortest-book">{{SHORTEST}}</span></p>
    </section>

    <section class="card">
      <h2>Статистика чтения</h2>
      <p class="meta">Циклов прочитано всего: <span id="total-series">{{TOTAL_SERIES}}</span></p>
      <p class="meta">В среднем прочитано в месяц: <span id="average-books-per-month">{{AVERAGE}}</span></p>
      <p class="meta">Средний объём: <span id="average-pages">{{AVERAGE_PAGES}}</span> страниц</p>
      <p class="meta">Средняя оценка: <span id="average-rating">{{AVERAGE_RATING}}</span></p>
      <p class="meta">Прочитано слов: <span id="total-words">{{TOTAL_WORDS}}</span></p>
    </section>

    <section class="card">
      <h2>Книжный вызов {{YEAR}}</h2>
      <p id="challenge-progress"><strong>{{BOOKS_YEAR}} из {{CHALLENGE_GOAL}} книг прочитано</strong></p>
      <div class="progress"><span id="challenge-bar" style="width: {{CHALLENGE_PERCENT}}%"></span></div>
      <p class="meta"><span id="challenge-percent">{{CHALLENGE_PERCENT}}%</span> · <span id="challenge-days">{{CHALLENGE_DAYS}}</span></p>
    </section>

    <section class="card wide">
      <h2>Прочитано по месяцам</h2>
      {{TIMELINE_CHART}}
    </section>

    <section class="card">
      <h2>Оценки</h2>
      {{RATING_CHART}}
    </section>

    <section class="card">
      <h2>Любимые жанры</h2>
      {{GENRE_CHART}}
    </section>

    <section class="card wide" id="books">
      <h2>Прочитанные книги</h2>
      <form class="filters" method="get" action="/#books">
        <select id="series-filter" name="series">{{SERIES_OPTIONS}}</select>
        <select id="genre-filter" name="genre">{{GENRE_OPTIONS}}</select>
        <select id="sort-by" name="sort">{{SORT_OPTIONS}}</select>
        <noscript><button type="submit">Применить</button></noscript>
      </form>
      <p class="meta">{{LISTING_STATUS}}</p>
      <div class="grid" id="book-list">
{{BOOK_LIST}}
      </div>
      {{LOAD_MORE}}
    </section>

    {{FUTURE_READS}}

    <section class="card wide" id="series-shelf">
      <h2>Циклы</h2>
      {{SERIES_SHELF}}
    </section>
  </main>

  <script>
    document.querySelectorAll('.filters select').forEach((select) => {
      select.addEventListener('change', () => select.form.submit());
    });

    document.querySelectorAll('.book-card .flip').forEach((button) => {
      button.addEventListener('click', () => {
        button.closest('.book-card').classList.toggle('flipped');
      });
    });

    document.querySelectorAll('img[data-fallback]').forEach((img) => {
      img.addEventListener('error', () => {
        if (img.src !== img.dataset.fallback) {
          img.src = img.dataset.fallback;
        }
      }, { once: true });
    });
  </script>
</body>
</html>
"##;
