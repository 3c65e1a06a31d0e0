//! Aggregates over non-deleted meals for the statistics screen.

use rusqlite::OptionalExtension;
use serde::Serialize;

use super::{sql_limit, MealRepository};
use crate::db::CookingLevel;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MealStatistics {
    pub total_meals: i64,
    pub homemade_meals: i64,
    pub takeout_meals: i64,
    /// Most frequent cuisine; ties go to the alphabetically first name.
    pub favorite_cuisine: Option<String>,
}

/// Homemade meals per cooking level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CookingBreakdown {
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub unrated: i64,
}

impl CookingBreakdown {
    pub fn total(&self) -> i64 {
        self.easy + self.medium + self.hard + self.unrated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishCount {
    pub meal_name: String,
    pub count: i64,
}

impl MealRepository {
    pub fn statistics(&self) -> Result<MealStatistics> {
        let conn = self.db.lock();

        let (total_meals, homemade_meals): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_homemade), 0) FROM meals WHERE is_deleted = 0",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let favorite_cuisine = conn
            .query_row(
                r#"
                SELECT cuisine_type
                FROM meals
                WHERE is_deleted = 0 AND cuisine_type IS NOT NULL AND cuisine_type != ''
                GROUP BY cuisine_type
                ORDER BY COUNT(*) DESC, cuisine_type ASC
                LIMIT 1
                "#,
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(MealStatistics {
            total_meals,
            homemade_meals,
            takeout_meals: total_meals - homemade_meals,
            favorite_cuisine,
        })
    }

    pub fn cooking_level_breakdown(&self) -> Result<CookingBreakdown> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT cooking_level, COUNT(*)
            FROM meals
            WHERE is_deleted = 0 AND is_homemade = 1
            GROUP BY cooking_level
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, Option<CookingLevel>>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut breakdown = CookingBreakdown::default();
        for (level, count) in rows {
            match level {
                Some(CookingLevel::Easy) => breakdown.easy += count,
                Some(CookingLevel::Medium) => breakdown.medium += count,
                Some(CookingLevel::Hard) => breakdown.hard += count,
                None => breakdown.unrated += count,
            }
        }
        Ok(breakdown)
    }

    /// Most frequently logged meal names, optionally restricted by homemade flag.
    pub fn top_dishes(&self, homemade: Option<bool>, limit: usize) -> Result<Vec<DishCount>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT meal_name, COUNT(*) AS n
            FROM meals
            WHERE is_deleted = 0 AND (?1 IS NULL OR is_homemade = ?1)
            GROUP BY meal_name
            ORDER BY n DESC, meal_name ASC
            LIMIT ?2
            "#,
        )?;
        let dishes = stmt
            .query_map(rusqlite::params![homemade, sql_limit(limit)], |row| {
                Ok(DishCount { meal_name: row.get(0)?, count: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(dishes)
    }

    /// Most frequent non-empty `location_name`; ties by name.
    pub fn favorite_location(&self) -> Result<Option<String>> {
        let conn = self.db.lock();
        let location = conn
            .query_row(
                r#"
                SELECT location_name
                FROM meals
                WHERE is_deleted = 0 AND location_name IS NOT NULL AND location_name != ''
                GROUP BY location_name
                ORDER BY COUNT(*) DESC, location_name ASC
                LIMIT 1
                "#,
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(location)
    }
}
