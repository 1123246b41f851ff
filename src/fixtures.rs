use crate::authors::AuthorTable;
use crate::config::Settings;
use crate::dashboard::Dashboard;
use crate::models::{CustomDates, StatsDocument};
use std::collections::HashMap;
use std::sync::Arc;

pub fn sample_document_json() -> serde_json::Value {
    serde_json::json!({
        "total_books": 4,
        "total_pages": 1680,
        "books_2025": 1,
        "longest_book": { "Title": "Тёмная башня", "Number of Pages": 600 },
        "shortest_book": { "Title": "Без даты", "Number of Pages": 100 },
        "book_list": [
            {
                "Title": "Ночной Дозор",
                "Author": "Sergei Lukyanenko",
                "Number of Pages": 480,
                "My Rating": 5,
                "Date Read": "2023-05-10",
                "Date Added": "2023-05-01",
                "Series": "Дозоры",
                "Genres": ["Фантастика", "Фэнтези"],
                "Exclusive Shelf": "read",
                "Book Id": "101",
                "Annotation": "Антон Городецкий выходит на дежурство."
            },
            {
                "Title": "Дневной Дозор",
                "Author": "Sergei Lukyanenko",
                "Number of Pages": 500,
                "My Rating": 4,
                "Date Read": "2023/08/02",
                "Series": "Дозоры",
                "Genres": ["Фантастика"],
                "Exclusive Shelf": "read",
                "Book Id": "102"
            },
            {
                "Title": "Тёмная башня",
                "Author": "Stephen King",
                "Number of Pages": 600,
                "My Rating": 5,
                "Date Read": "2025-01-15",
                "Date Added": "2025-01-02",
                "Genres": ["Фэнтези", "Драма"],
                "Exclusive Shelf": "read",
                "Cover URL": "http://books.google.com/books/content?id=tower",
                "Book Id": "103"
            },
            {
                "Title": "Без даты",
                "Author": "Anon",
                "Number of Pages": 100,
                "My Rating": 0,
                "Exclusive Shelf": "read"
            },
            {
                "Title": "Сейчас",
                "Author": "Someone",
                "Number of Pages": 300,
                "Exclusive Shelf": "currently-reading"
            },
            {
                "Title": "Потом",
                "Additional Authors": "Later Writer, Co Author",
                "Exclusive Shelf": "to-read"
            }
        ]
    })
}

pub fn sample_document() -> StatsDocument {
    serde_json::from_value(sample_document_json()).unwrap()
}

pub fn sample_authors() -> AuthorTable {
    AuthorTable::new(
        HashMap::from([("Sergei Lukyanenko".to_string(), "Сергей Лукьяненко".to_string())]),
        HashMap::from([(
            "Сергей Лукьяненко".to_string(),
            "https://example.org/lukyanenko.jpg".to_string(),
        )]),
    )
}

pub fn sample_dashboard() -> Dashboard {
    Dashboard::build(
        sample_document(),
        &CustomDates::default(),
        Arc::new(sample_authors()),
        &Settings::default(),
    )
}
