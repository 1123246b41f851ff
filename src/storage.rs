use crate::authors::AuthorTable;
use crate::config::Settings;
use crate::dashboard::Dashboard;
use crate::errors::LoadError;
use crate::models::{CustomDates, StatsDocument};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let bytes = fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The statistics document is mandatory: any failure is returned to the caller.
pub async fn load_stats(path: &Path) -> Result<StatsDocument, LoadError> {
    let document: StatsDocument = read_json(path).await?;
    info!(
        "loaded {} records from {}",
        document.book_list.len(),
        path.display()
    );
    Ok(document)
}

pub async fn load_custom_dates(path: &Path) -> CustomDates {
    load_optional(path, "custom dates").await
}

pub async fn load_author_table(names_path: &Path, photos_path: &Path) -> AuthorTable {
    let names = load_optional(names_path, "author mapping").await;
    let photos = load_optional(photos_path, "author photos").await;
    AuthorTable::new(names, photos)
}

async fn load_optional<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match read_json(path).await {
        Ok(value) => value,
        Err(err) if err.is_not_found() => {
            info!("no {what} at {}, continuing without it", path.display());
            T::default()
        }
        Err(err) => {
            warn!("ignoring {what}: {err}");
            T::default()
        }
    }
}

/// Loads every document named by `settings` and builds the dashboard.
pub async fn load_dashboard(settings: &Settings) -> Result<Dashboard, LoadError> {
    let document = load_stats(&settings.stats_path()).await?;
    let custom_dates = load_custom_dates(&settings.custom_dates_path()).await;
    let authors = load_author_table(
        &settings.author_mapping_path(),
        &settings.author_photos_path(),
    )
    .await;

    Ok(Dashboard::build(
        document,
        &custom_dates,
        Arc::new(authors),
        settings,
    ))
}
