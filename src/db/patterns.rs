//! Types for cooking-pattern analytics attached to a meal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meals::validate_unit_range;
use super::record::{from_millis, text_enum};
use crate::error::{MealError, Result};

/// Identifies the derivation logic that produced a cooking pattern.
pub const ANALYSIS_VERSION: &str = "1.0";

text_enum! {
    pub enum SkillLevel {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}

text_enum! {
    pub enum TimeOfDay {
        Morning => "morning",
        Afternoon => "afternoon",
        Evening => "evening",
        Night => "night",
    }
}

impl TimeOfDay {
    /// Bucket an hour of the day (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

pub(crate) const PATTERN_COLUMNS: &str = "id, meal_id, recipe_complexity, cooking_time_minutes, skill_level, \
     ingredient_count, fresh_ingredient_ratio, day_of_week, time_of_day, weather_condition, created_at, analysis_version";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookingPattern {
    pub id: i64,
    pub meal_id: i64,
    pub recipe_complexity: Option<u8>,
    pub cooking_time_minutes: Option<u32>,
    pub skill_level: Option<SkillLevel>,
    pub ingredient_count: Option<u32>,
    pub fresh_ingredient_ratio: Option<f64>,
    /// 0 = Sunday
    pub day_of_week: Option<u8>,
    pub time_of_day: Option<TimeOfDay>,
    pub weather_condition: Option<String>,
    pub created_at: DateTime<Utc>,
    pub analysis_version: String,
}

impl CookingPattern {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(CookingPattern {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            recipe_complexity: row.get(2)?,
            cooking_time_minutes: row.get(3)?,
            skill_level: row.get(4)?,
            ingredient_count: row.get(5)?,
            fresh_ingredient_ratio: row.get(6)?,
            day_of_week: row.get(7)?,
            time_of_day: row.get(8)?,
            weather_condition: row.get(9)?,
            created_at: from_millis(10, row.get(10)?)?,
            analysis_version: row.get(11)?,
        })
    }
}

/// Cooking-pattern descriptor supplied when a meal is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCookingPattern {
    pub recipe_complexity: Option<u8>,
    pub cooking_time_minutes: Option<u32>,
    pub skill_level: Option<SkillLevel>,
    pub ingredient_count: Option<u32>,
    pub fresh_ingredient_ratio: Option<f64>,
    pub day_of_week: Option<u8>,
    pub time_of_day: Option<TimeOfDay>,
    pub weather_condition: Option<String>,
}

impl NewCookingPattern {
    pub(crate) fn validate(&self) -> Result<()> {
        if matches!(self.day_of_week, Some(d) if d > 6) {
            return Err(MealError::validation("day of week must be 0-6"));
        }
        validate_unit_range("fresh ingredient ratio", self.fresh_ingredient_ratio)
    }
}
