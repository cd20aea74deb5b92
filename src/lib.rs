pub mod cli;
pub mod config;
pub mod element_finder;
pub mod models;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod store;
pub mod utils;
pub mod watch_runner;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use utils::error::{AppError, Result};
