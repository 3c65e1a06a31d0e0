//! Types for meal tags.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::from_millis;

pub(crate) const TAG_COLUMNS: &str = "id, name, category, color, usage_count, is_system_tag, created_at";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub usage_count: i64,
    pub is_system_tag: bool,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            color: row.get(3)?,
            usage_count: row.get(4)?,
            is_system_tag: row.get(5)?,
            created_at: from_millis(6, row.get(6)?)?,
        })
    }
}

/// A tag as assigned to one meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealTag {
    pub id: i64,
    pub meal_id: i64,
    pub tag_id: i64,
    pub tag_name: String,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl MealTag {
    /// Expects `mt.id, mt.meal_id, mt.tag_id, t.name, mt.confidence, mt.created_at`.
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(MealTag {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            tag_id: row.get(2)?,
            tag_name: row.get(3)?,
            confidence: row.get(4)?,
            created_at: from_millis(5, row.get(5)?)?,
        })
    }
}
