use std::collections::HashMap;

pub const PLACEHOLDER_PHOTO: &str = "https://placehold.co/64x96?text=Нет+фото";

/// Lookup of localized author names and author portraits.
pub trait AuthorDirectory: Send + Sync {
    /// Canonical display name for a raw `Author` value, when one is known.
    fn canonical_name(&self, raw_author: &str) -> Option<&str>;

    fn photo_url(&self, author: &str) -> Option<&str>;

    fn photo_or_placeholder(&self, author: &str) -> &str {
        self.photo_url(author).unwrap_or(PLACEHOLDER_PHOTO)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorTable {
    names: HashMap<String, String>,
    photos: HashMap<String, String>,
}

impl AuthorTable {
    pub fn new(names: HashMap<String, String>, photos: HashMap<String, String>) -> Self {
        Self { names, photos }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.photos.is_empty()
    }
}

impl AuthorDirectory for AuthorTable {
    fn canonical_name(&self, raw_author: &str) -> Option<&str> {
        self.names
            .get(raw_author)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    fn photo_url(&self, author: &str) -> Option<&str> {
        self.photos
            .get(author)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }
}
