//! Tag assignment for meals.

use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

use super::{find_active_meal, touch_meal, MealRepository};
use crate::db::meals::validate_unit_range;
use crate::db::record::{self, to_millis};
use crate::db::tags::TAG_COLUMNS;
use crate::db::{MealTag, Tag};
use crate::error::{MealError, Result};

impl MealRepository {
    /// Attach a tag (created on first use) to a meal.
    ///
    /// Assigning a tag the meal already carries leaves usage counts unchanged.
    pub fn tag_meal(&self, uuid: &Uuid, tag_name: &str, confidence: Option<f64>) -> Result<MealTag> {
        let tag_name = tag_name.trim();
        if tag_name.is_empty() {
            return Err(MealError::validation("tag name is required"));
        }
        validate_unit_range("tag confidence", confidence)?;

        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let mut meal = find_active_meal(&tx, uuid)?;
        let now = to_millis(&record::now());

        tx.execute(
            "INSERT INTO tags (name, usage_count, is_system_tag, created_at) VALUES (?, 0, 0, ?) ON CONFLICT(name) DO NOTHING",
            params![tag_name, now],
        )?;
        let tag_id: i64 = tx.query_row("SELECT id FROM tags WHERE name = ?", [tag_name], |row| row.get(0))?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO meal_tags (meal_id, tag_id, confidence, created_at) VALUES (?, ?, ?, ?)",
            params![meal.id, tag_id, confidence, now],
        )?;
        if inserted > 0 {
            tx.execute("UPDATE tags SET usage_count = usage_count + 1 WHERE id = ?", [tag_id])?;
            touch_meal(&tx, &mut meal)?;
            info!(meal = %uuid, tag = tag_name, "Tagged meal");
        }

        let meal_tag = tx.query_row(
            r#"
            SELECT mt.id, mt.meal_id, mt.tag_id, t.name, mt.confidence, mt.created_at
            FROM meal_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.meal_id = ? AND mt.tag_id = ?
            "#,
            params![meal.id, tag_id],
            MealTag::from_row,
        )?;
        tx.commit()?;
        Ok(meal_tag)
    }

    /// Remove a tag from a meal. Returns whether the meal carried it.
    pub fn untag_meal(&self, uuid: &Uuid, tag_name: &str) -> Result<bool> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let mut meal = find_active_meal(&tx, uuid)?;
        let removed = tx.execute(
            "DELETE FROM meal_tags WHERE meal_id = ? AND tag_id = (SELECT id FROM tags WHERE name = ?)",
            params![meal.id, tag_name.trim()],
        )?;
        if removed > 0 {
            tx.execute(
                "UPDATE tags SET usage_count = MAX(usage_count - 1, 0) WHERE name = ?",
                [tag_name.trim()],
            )?;
            touch_meal(&tx, &mut meal)?;
            info!(meal = %uuid, tag = tag_name, "Removed tag from meal");
        }
        tx.commit()?;
        Ok(removed > 0)
    }

    /// All tags, most used first.
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tags ORDER BY usage_count DESC, name ASC",
            TAG_COLUMNS
        ))?;
        let tags = stmt.query_map([], Tag::from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }
}

pub(crate) fn tags_for_meal(conn: &Connection, meal_id: i64) -> rusqlite::Result<Vec<MealTag>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT mt.id, mt.meal_id, mt.tag_id, t.name, mt.confidence, mt.created_at
        FROM meal_tags mt
        JOIN tags t ON t.id = mt.tag_id
        WHERE mt.meal_id = ?
        ORDER BY t.name
        "#,
    )?;
    let tags = stmt.query_map([meal_id], MealTag::from_row)?.collect();
    tags
}
