//! The meal repository: the single read/write boundary for meal data.
//!
//! Every write runs inside one SQLite transaction, so a meal and its child
//! rows (ingredients, image, cooking pattern) become visible together or not
//! at all. Deleting a meal only sets its `is_deleted` flag; all default
//! queries filter those rows out.

mod filters;
mod insights;
mod locations;
mod settings;
mod stats;
mod tags;
mod vectors;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::images::IMAGE_COLUMNS;
use crate::db::ingredients::INGREDIENT_COLUMNS;
use crate::db::meals::MEAL_COLUMNS;
use crate::db::patterns::PATTERN_COLUMNS;
use crate::db::record::{self, to_millis, SoftDelete, Timestamped};
use crate::db::{
    derive_search_text, CookingPattern, Database, Ingredient, Meal, MealImage, MealTag, MealUpdate, NewMeal,
    ProcessingStatus, ANALYSIS_VERSION,
};
use crate::error::{MealError, Result};

pub use filters::{Period, SearchFilters};
pub use stats::{CookingBreakdown, DishCount, MealStatistics};

/// Number of meals returned by `recent_meals` when the caller has no preference.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// A meal together with its child records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealDetail {
    pub meal: Meal,
    pub ingredients: Vec<Ingredient>,
    pub image: Option<MealImage>,
    pub cooking_pattern: Option<CookingPattern>,
    pub tags: Vec<MealTag>,
}

pub struct MealRepository {
    db: Arc<Database>,
}

impl MealRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a meal and its children in one transaction.
    pub fn create_meal(&self, new_meal: &NewMeal) -> Result<Meal> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let uuid = Uuid::new_v4();
        let now = to_millis(&record::now());
        let search_text = new_meal.resolved_search_text();

        tx.execute(
            r#"
            INSERT INTO meals (
                uuid, meal_name, meal_type, cuisine_type, ai_confidence, ai_source, notes, cooking_level,
                is_homemade, photo_path, photo_thumbnail_path, location_name, latitude, longitude,
                meal_datetime, search_text, is_deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, 0, ?17, ?17)
            "#,
            params![
                uuid.to_string(),
                new_meal.meal_name,
                new_meal.meal_type,
                new_meal.cuisine_type,
                new_meal.ai_confidence,
                new_meal.ai_source,
                new_meal.notes,
                new_meal.cooking_level,
                new_meal.is_homemade,
                new_meal.photo_path,
                new_meal.photo_thumbnail_path,
                new_meal.location_name,
                new_meal.latitude,
                new_meal.longitude,
                to_millis(&new_meal.meal_datetime),
                search_text,
                now,
            ],
        )?;
        let meal_id = tx.last_insert_rowid();

        for ingredient in &new_meal.ingredients {
            tx.execute(
                r#"
                INSERT INTO ingredients (meal_id, name, category, confidence, quantity, ingredient_type, is_user_added, created_at)
                VALUES (?, ?, ?, ?, ?, ?, 0, ?)
                "#,
                params![
                    meal_id,
                    ingredient.name.trim(),
                    ingredient.category,
                    ingredient.confidence,
                    ingredient.quantity,
                    ingredient.ingredient_type,
                    now,
                ],
            )?;
        }

        let photo = new_meal.captured_photo.as_ref();
        tx.execute(
            r#"
            INSERT INTO meal_images (meal_id, original_path, thumbnail_path, width, height, format, taken_at, is_processed, processing_status)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)
            "#,
            params![
                meal_id,
                new_meal.photo_path,
                new_meal.photo_thumbnail_path,
                photo.map(|p| p.width),
                photo.map(|p| p.height),
                photo.and_then(|p| p.format()),
                to_millis(&new_meal.meal_datetime),
                ProcessingStatus::Pending,
            ],
        )?;

        if let Some(pattern) = &new_meal.cooking_pattern {
            tx.execute(
                r#"
                INSERT INTO cooking_patterns (
                    meal_id, recipe_complexity, cooking_time_minutes, skill_level, ingredient_count,
                    fresh_ingredient_ratio, day_of_week, time_of_day, weather_condition, created_at, analysis_version
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    meal_id,
                    pattern.recipe_complexity,
                    pattern.cooking_time_minutes,
                    pattern.skill_level,
                    pattern.ingredient_count,
                    pattern.fresh_ingredient_ratio,
                    pattern.day_of_week,
                    pattern.time_of_day,
                    pattern.weather_condition,
                    now,
                    ANALYSIS_VERSION,
                ],
            )?;
        }

        let meal = meal_by_id(&tx, meal_id)?;
        tx.commit()?;

        info!(
            meal = %meal.uuid,
            name = %meal.meal_name,
            ingredients = new_meal.ingredients.len(),
            "Created meal"
        );
        Ok(meal)
    }

    /// Mark a meal deleted. Repeating the call on a deleted meal succeeds.
    pub fn soft_delete_meal(&self, uuid: &Uuid) -> Result<()> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let mut meal = find_meal(&tx, uuid)?.ok_or_else(|| MealError::not_found(format!("meal {}", uuid)))?;
        meal.mark_deleted();
        let updated_at = meal.touch();

        tx.execute(
            "UPDATE meals SET is_deleted = 1, updated_at = ? WHERE id = ?",
            params![to_millis(&updated_at), meal.id],
        )?;
        tx.commit()?;

        info!(meal = %uuid, "Soft-deleted meal");
        Ok(())
    }

    /// Apply the fields present in `update` to a non-deleted meal.
    pub fn update_meal(&self, uuid: &Uuid, update: &MealUpdate) -> Result<Meal> {
        if let Err(e) = update.validate() {
            warn!(meal = %uuid, "Rejected meal update: {}", e);
            return Err(e);
        }

        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let mut meal = find_active_meal(&tx, uuid)?;
        update.apply_to(&mut meal);

        if let Some(text) = &update.search_text {
            meal.search_text = text.clone();
        } else if update.touches_search_sources() {
            let names = ingredient_names(&tx, meal.id)?;
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            meal.search_text = derive_search_text(
                &meal.meal_name,
                meal.cuisine_type.as_deref(),
                meal.location_name.as_deref(),
                meal.notes.as_deref(),
                &names,
            );
        }
        meal.touch();

        tx.execute(
            r#"
            UPDATE meals SET
                meal_name = ?1, meal_type = ?2, cuisine_type = ?3, ai_confidence = ?4, ai_source = ?5,
                notes = ?6, cooking_level = ?7, is_homemade = ?8, photo_path = ?9, photo_thumbnail_path = ?10,
                location_name = ?11, latitude = ?12, longitude = ?13, meal_datetime = ?14, search_text = ?15,
                updated_at = ?16
            WHERE id = ?17
            "#,
            params![
                meal.meal_name,
                meal.meal_type,
                meal.cuisine_type,
                meal.ai_confidence,
                meal.ai_source,
                meal.notes,
                meal.cooking_level,
                meal.is_homemade,
                meal.photo_path,
                meal.photo_thumbnail_path,
                meal.location_name,
                meal.latitude,
                meal.longitude,
                to_millis(&meal.meal_datetime),
                meal.search_text,
                to_millis(&meal.updated_at),
                meal.id,
            ],
        )?;
        tx.commit()?;

        info!(meal = %uuid, "Updated meal");
        Ok(meal)
    }

    /// Record the processing state of a meal's photo.
    pub fn update_image_status(&self, uuid: &Uuid, status: ProcessingStatus) -> Result<MealImage> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        let mut meal = find_active_meal(&tx, uuid)?;
        let changed = tx.execute(
            "UPDATE meal_images SET processing_status = ?, is_processed = ? WHERE meal_id = ?",
            params![status, status == ProcessingStatus::Completed, meal.id],
        )?;
        if changed == 0 {
            return Err(MealError::not_found(format!("image for meal {}", uuid)));
        }
        touch_meal(&tx, &mut meal)?;

        let image = image_for_meal(&tx, meal.id)?
            .ok_or_else(|| MealError::not_found(format!("image for meal {}", uuid)))?;
        tx.commit()?;

        debug!(meal = %uuid, status = %status, "Updated image status");
        Ok(image)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All non-deleted meals matching every supplied filter, newest first.
    pub fn search_meals(&self, filters: &SearchFilters) -> Result<Vec<Meal>> {
        let clause = filters.where_clause();
        let conn = self.db.lock();
        let meals = query_meals(
            &conn,
            &format!("{} ORDER BY meal_datetime DESC, id DESC", clause.sql),
            params_from_iter(clause.params.iter()),
        )?;
        debug!(count = meals.len(), "search_meals");
        Ok(meals)
    }

    /// Case-insensitive substring search over name, notes, and search text.
    pub fn search_meals_by_text(&self, text: &str) -> Result<Vec<Meal>> {
        self.search_meals(&SearchFilters { text: Some(text.to_string()), ..Default::default() })
    }

    /// Non-deleted meals with `start <= meal_datetime <= end`.
    pub fn meals_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Meal>> {
        self.search_meals(&SearchFilters::between(start, end))
    }

    /// Meals within a records-list period as seen from `now`.
    pub fn meals_in_period(&self, period: Period, now: DateTime<Utc>) -> Result<Vec<Meal>> {
        match period.range(now) {
            Some((start, end)) => self.meals_by_date_range(start, end),
            None => self.search_meals(&SearchFilters::default()),
        }
    }

    /// The `limit` most recent non-deleted meals by meal time.
    pub fn recent_meals(&self, limit: usize) -> Result<Vec<Meal>> {
        let conn = self.db.lock();
        let meals = query_meals(
            &conn,
            "is_deleted = 0 ORDER BY meal_datetime DESC, id DESC LIMIT ?",
            [sql_limit(limit)],
        )?;
        Ok(meals)
    }

    /// A non-deleted meal with its ingredients, image, pattern, and tags.
    pub fn get_meal(&self, uuid: &Uuid) -> Result<Option<MealDetail>> {
        let conn = self.db.lock();
        let meal = match find_meal(&conn, uuid)? {
            Some(meal) if !meal.is_deleted => meal,
            _ => return Ok(None),
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM ingredients WHERE meal_id = ? ORDER BY id",
            INGREDIENT_COLUMNS
        ))?;
        let ingredients = stmt
            .query_map([meal.id], Ingredient::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let image = image_for_meal(&conn, meal.id)?;
        let cooking_pattern = conn
            .query_row(
                &format!("SELECT {} FROM cooking_patterns WHERE meal_id = ? ORDER BY id LIMIT 1", PATTERN_COLUMNS),
                [meal.id],
                CookingPattern::from_row,
            )
            .optional()?;
        let tags = tags::tags_for_meal(&conn, meal.id)?;

        Ok(Some(MealDetail { meal, ingredients, image, cooking_pattern, tags }))
    }
}

// ============================================================================
// Shared statement helpers
// ============================================================================

pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn query_meals<P: rusqlite::Params>(conn: &Connection, where_sql: &str, params: P) -> rusqlite::Result<Vec<Meal>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM meals WHERE {}", MEAL_COLUMNS, where_sql))?;
    let meals = stmt.query_map(params, Meal::from_row)?.collect();
    meals
}

fn meal_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Meal> {
    conn.query_row(&format!("SELECT {} FROM meals WHERE id = ?", MEAL_COLUMNS), [id], Meal::from_row)
}

/// Look up a meal by uuid regardless of its deleted flag.
pub(crate) fn find_meal(conn: &Connection, uuid: &Uuid) -> rusqlite::Result<Option<Meal>> {
    conn.query_row(
        &format!("SELECT {} FROM meals WHERE uuid = ?", MEAL_COLUMNS),
        [uuid.to_string()],
        Meal::from_row,
    )
    .optional()
}

/// Look up a meal that has not been soft-deleted, or fail with `NotFound`.
pub(crate) fn find_active_meal(conn: &Connection, uuid: &Uuid) -> Result<Meal> {
    match find_meal(conn, uuid)? {
        Some(meal) if !meal.is_deleted => Ok(meal),
        _ => Err(MealError::not_found(format!("meal {}", uuid))),
    }
}

/// Refresh `updated_at` after a write to one of the meal's child rows.
pub(crate) fn touch_meal(conn: &Connection, meal: &mut Meal) -> rusqlite::Result<()> {
    let at = meal.touch();
    conn.execute("UPDATE meals SET updated_at = ? WHERE id = ?", params![to_millis(&at), meal.id])?;
    Ok(())
}

fn ingredient_names(conn: &Connection, meal_id: i64) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM ingredients WHERE meal_id = ? ORDER BY id")?;
    let names = stmt.query_map([meal_id], |row| row.get(0))?.collect();
    names
}

fn image_for_meal(conn: &Connection, meal_id: i64) -> rusqlite::Result<Option<MealImage>> {
    conn.query_row(
        &format!("SELECT {} FROM meal_images WHERE meal_id = ? ORDER BY id LIMIT 1", IMAGE_COLUMNS),
        [meal_id],
        MealImage::from_row,
    )
    .optional()
}
