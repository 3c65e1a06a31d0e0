//! Local meal journal storage: meals captured from photos, with their
//! ingredients, cooking patterns, tags, visited places, insights, and
//! settings, kept in an embedded SQLite database.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod repository;
pub mod service;

pub use config::Config;
pub use db::Database;
pub use error::{MealError, Result};
pub use repository::{MealRepository, SearchFilters};
pub use service::MealService;
