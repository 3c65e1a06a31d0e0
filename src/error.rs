//! Error types for the meal repository.
//!
//! Repository operations return [`MealError`] so callers can tell a rejected
//! input from a missing record from a storage failure. Application-level code
//! (config, CLI, export) keeps using `anyhow`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MealError {
    /// A required field is missing or a value is out of range
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The storage layer could not run or commit the operation
    #[error("Transaction failed: {0}")]
    Transaction(#[from] rusqlite::Error),

    /// The blocking task behind an async call did not finish
    #[error("Background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, MealError>;

impl From<tokio::task::JoinError> for MealError {
    fn from(err: tokio::task::JoinError) -> Self {
        MealError::Task(err.to_string())
    }
}

impl MealError {
    pub fn validation(msg: impl Into<String>) -> Self {
        MealError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        MealError::NotFound(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MealError::NotFound(_))
    }
}
