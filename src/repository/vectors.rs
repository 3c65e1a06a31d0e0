//! Placeholder search-vector rows. No embedding is computed; the row keeps
//! the text that a future model would index.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::{find_active_meal, MealRepository};
use crate::db::record::{self, next_stamp, to_millis};
use crate::db::vectors::{extract_keywords, VECTOR_COLUMNS};
use crate::db::SearchVector;
use crate::error::{MealError, Result};

impl MealRepository {
    /// Store the meal's current search text and keywords for later indexing.
    pub fn refresh_search_vector(&self, uuid: &Uuid) -> Result<SearchVector> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let meal = find_active_meal(&tx, uuid)?;
        let keywords = serde_json::to_string(&extract_keywords(&meal.search_text))
            .map_err(|e| MealError::validation(format!("keywords: {}", e)))?;

        match vector_for_meal(&tx, meal.id)? {
            Some(existing) => {
                tx.execute(
                    "UPDATE search_vectors SET indexed_text = ?, keywords = ?, updated_at = ? WHERE id = ?",
                    params![meal.search_text, keywords, to_millis(&next_stamp(existing.updated_at)), existing.id],
                )?;
            }
            None => {
                let now = to_millis(&record::now());
                tx.execute(
                    r#"
                    INSERT INTO search_vectors (meal_id, indexed_text, keywords, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                    params![meal.id, meal.search_text, keywords, now, now],
                )?;
            }
        }

        let vector = vector_for_meal(&tx, meal.id)?
            .ok_or_else(|| MealError::not_found(format!("search vector for meal {}", uuid)))?;
        tx.commit()?;

        debug!(meal = %uuid, keywords = vector.keywords.len(), "Refreshed search vector");
        Ok(vector)
    }

    pub fn search_vector(&self, uuid: &Uuid) -> Result<Option<SearchVector>> {
        let conn = self.db.lock();
        let meal = find_active_meal(&conn, uuid)?;
        Ok(vector_for_meal(&conn, meal.id)?)
    }
}

fn vector_for_meal(conn: &Connection, meal_id: i64) -> rusqlite::Result<Option<SearchVector>> {
    conn.query_row(
        &format!("SELECT {} FROM search_vectors WHERE meal_id = ?", VECTOR_COLUMNS),
        [meal_id],
        SearchVector::from_row,
    )
    .optional()
}
