//! Types for meal ingredients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meals::validate_unit_range;
use super::record::from_millis;
use crate::error::{MealError, Result};

pub(crate) const INGREDIENT_COLUMNS: &str =
    "id, meal_id, name, category, confidence, quantity, ingredient_type, is_user_added, created_at";

/// An ingredient row owned by a meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub meal_id: i64,
    pub name: String,
    pub category: Option<String>,
    pub confidence: Option<f64>,
    pub quantity: Option<String>,
    pub ingredient_type: Option<String>,
    /// False for ingredients recorded at capture time, true for later user edits.
    pub is_user_added: bool,
    pub created_at: DateTime<Utc>,
}

impl Ingredient {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Ingredient {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            confidence: row.get(4)?,
            quantity: row.get(5)?,
            ingredient_type: row.get(6)?,
            is_user_added: row.get(7)?,
            created_at: from_millis(8, row.get(8)?)?,
        })
    }
}

/// Ingredient descriptor supplied when a meal is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub ingredient_type: Option<String>,
}

impl NewIngredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MealError::validation("ingredient name is required"));
        }
        validate_unit_range("ingredient confidence", self.confidence)
    }
}
