//! Placeholder rows for a future embedding-based search index.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::from_millis;

pub(crate) const VECTOR_COLUMNS: &str = "id, meal_id, vector_data, vector_model, vector_dimension, \
     indexed_text, keywords, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchVector {
    pub id: i64,
    pub meal_id: i64,
    /// Always `None` until an embedding model exists.
    pub vector_data: Option<String>,
    pub vector_model: Option<String>,
    pub vector_dimension: Option<u32>,
    pub indexed_text: Option<String>,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SearchVector {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let keywords: Option<String> = row.get(6)?;
        let keywords: Vec<String> = keywords
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e)))?
            .unwrap_or_default();

        Ok(SearchVector {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            vector_data: row.get(2)?,
            vector_model: row.get(3)?,
            vector_dimension: row.get(4)?,
            indexed_text: row.get(5)?,
            keywords,
            created_at: from_millis(7, row.get(7)?)?,
            updated_at: from_millis(8, row.get(8)?)?,
        })
    }
}

/// Distinct words of a search text, in first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let word = word.to_lowercase();
        if !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}
