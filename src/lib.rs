pub mod app;
pub mod authors;
pub mod book;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod errors;
pub mod generate;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;

#[cfg(test)]
mod fixtures;

pub use app::router;
pub use config::Settings;
pub use dashboard::Dashboard;
pub use state::AppState;
pub use storage::load_dashboard;
