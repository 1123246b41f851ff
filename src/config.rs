use crate::collection::PAGE_SIZE;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CHALLENGE_GOAL: u32 = 50;
pub const DEFAULT_CHALLENGE_YEAR: i32 = 2025;

const STATS_FILE: &str = "reading_stats.json";
const CUSTOM_DATES_FILE: &str = "custom_dates.json";
const AUTHOR_MAPPING_FILE: &str = "data/author_mapping.json";
const AUTHOR_PHOTOS_FILE: &str = "data/author_photos.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeConfig {
    pub goal: u32,
    pub year: i32,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            goal: DEFAULT_CHALLENGE_GOAL,
            year: DEFAULT_CHALLENGE_YEAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub port: u16,
    pub page_size: usize,
    pub challenge: ChallengeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            port: DEFAULT_PORT,
            page_size: PAGE_SIZE,
            challenge: ChallengeConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Missing or unparseable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: lookup("READING_SHELF_DATA_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            page_size: parsed(&lookup, "READING_SHELF_PAGE_SIZE")
                .filter(|size: &usize| *size > 0)
                .unwrap_or(defaults.page_size),
            challenge: ChallengeConfig {
                goal: parsed(&lookup, "READING_CHALLENGE_GOAL")
                    .filter(|goal: &u32| *goal > 0)
                    .unwrap_or(defaults.challenge.goal),
                year: parsed(&lookup, "READING_CHALLENGE_YEAR").unwrap_or(defaults.challenge.year),
            },
        }
    }

    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join(STATS_FILE)
    }

    pub fn custom_dates_path(&self) -> PathBuf {
        self.data_dir.join(CUSTOM_DATES_FILE)
    }

    pub fn author_mapping_path(&self) -> PathBuf {
        self.data_dir.join(AUTHOR_MAPPING_FILE)
    }

    pub fn author_photos_path(&self) -> PathBuf {
        self.data_dir.join(AUTHOR_PHOTOS_FILE)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
