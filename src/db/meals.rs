//! Meal records and the inputs used to create and edit them.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::images::CapturedPhoto;
use super::ingredients::NewIngredient;
use super::patterns::NewCookingPattern;
use super::record::{from_millis, text_enum, uuid_column, SoftDelete, Timestamped};
use crate::error::{MealError, Result};

text_enum! {
    /// Which meal of the day a record is.
    pub enum MealType {
        Breakfast => "breakfast",
        Lunch => "lunch",
        Dinner => "dinner",
        Snack => "snack",
    }
}

text_enum! {
    /// Effort classification for homemade meals.
    pub enum CookingLevel {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

/// Column list matching [`Meal::from_row`].
pub(crate) const MEAL_COLUMNS: &str = "id, uuid, meal_name, meal_type, cuisine_type, ai_confidence, ai_source, \
     notes, cooking_level, is_homemade, photo_path, photo_thumbnail_path, location_name, latitude, longitude, \
     meal_datetime, search_text, is_deleted, created_at, updated_at";

/// One logged eating event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meal {
    pub id: i64,
    pub uuid: Uuid,
    pub meal_name: String,
    pub meal_type: Option<MealType>,
    pub cuisine_type: Option<String>,
    pub ai_confidence: Option<f64>,
    pub ai_source: Option<String>,
    pub notes: Option<String>,
    pub cooking_level: Option<CookingLevel>,
    pub is_homemade: bool,
    pub photo_path: String,
    pub photo_thumbnail_path: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub meal_datetime: DateTime<Utc>,
    pub search_text: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Meal {
            id: row.get(0)?,
            uuid: uuid_column(row, 1)?,
            meal_name: row.get(2)?,
            meal_type: row.get(3)?,
            cuisine_type: row.get(4)?,
            ai_confidence: row.get(5)?,
            ai_source: row.get(6)?,
            notes: row.get(7)?,
            cooking_level: row.get(8)?,
            is_homemade: row.get(9)?,
            photo_path: row.get(10)?,
            photo_thumbnail_path: row.get(11)?,
            location_name: row.get(12)?,
            latitude: row.get(13)?,
            longitude: row.get(14)?,
            meal_datetime: from_millis(15, row.get(15)?)?,
            search_text: row.get(16)?,
            is_deleted: row.get(17)?,
            created_at: from_millis(18, row.get(18)?)?,
            updated_at: from_millis(19, row.get(19)?)?,
        })
    }
}

impl Timestamped for Meal {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl SoftDelete for Meal {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

/// Lowercased, space-joined searchable text for a meal.
///
/// Empty parts are skipped so that missing fields leave no stray spaces.
pub fn derive_search_text(
    meal_name: &str,
    cuisine_type: Option<&str>,
    location_name: Option<&str>,
    notes: Option<&str>,
    ingredient_names: &[&str],
) -> String {
    let mut parts: Vec<&str> = vec![meal_name];
    parts.extend(cuisine_type);
    parts.extend(location_name);
    parts.extend(notes);
    parts.extend_from_slice(ingredient_names);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A validated meal ready to be inserted. Built with [`NewMeal::builder`].
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub(crate) meal_name: String,
    pub(crate) is_homemade: bool,
    pub(crate) photo_path: String,
    pub(crate) meal_datetime: DateTime<Utc>,
    pub(crate) meal_type: Option<MealType>,
    pub(crate) cuisine_type: Option<String>,
    pub(crate) ai_confidence: Option<f64>,
    pub(crate) ai_source: Option<String>,
    pub(crate) notes: Option<String>,
    pub(crate) cooking_level: Option<CookingLevel>,
    pub(crate) photo_thumbnail_path: Option<String>,
    pub(crate) location_name: Option<String>,
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) search_text: Option<String>,
    pub(crate) captured_photo: Option<CapturedPhoto>,
    pub(crate) ingredients: Vec<NewIngredient>,
    pub(crate) cooking_pattern: Option<NewCookingPattern>,
}

impl NewMeal {
    pub fn builder() -> NewMealBuilder {
        NewMealBuilder::default()
    }

    pub fn meal_name(&self) -> &str {
        &self.meal_name
    }

    pub fn ingredients(&self) -> &[NewIngredient] {
        &self.ingredients
    }

    /// The caller-supplied search text, or one derived from the meal's fields.
    pub(crate) fn resolved_search_text(&self) -> String {
        if let Some(text) = &self.search_text {
            return text.clone();
        }
        let names: Vec<&str> = self.ingredients.iter().map(|i| i.name.as_str()).collect();
        derive_search_text(
            &self.meal_name,
            self.cuisine_type.as_deref(),
            self.location_name.as_deref(),
            self.notes.as_deref(),
            &names,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewMealBuilder {
    meal_name: Option<String>,
    is_homemade: Option<bool>,
    photo_path: Option<String>,
    meal_datetime: Option<DateTime<Utc>>,
    meal_type: Option<MealType>,
    cuisine_type: Option<String>,
    ai_confidence: Option<f64>,
    ai_source: Option<String>,
    notes: Option<String>,
    cooking_level: Option<CookingLevel>,
    photo_thumbnail_path: Option<String>,
    location_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    search_text: Option<String>,
    captured_photo: Option<CapturedPhoto>,
    ingredients: Vec<NewIngredient>,
    cooking_pattern: Option<NewCookingPattern>,
}

impl NewMealBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.meal_name = Some(name.into());
        self
    }

    pub fn homemade(mut self, is_homemade: bool) -> Self {
        self.is_homemade = Some(is_homemade);
        self
    }

    pub fn photo_path(mut self, path: impl Into<String>) -> Self {
        self.photo_path = Some(path.into());
        self
    }

    pub fn meal_datetime(mut self, at: DateTime<Utc>) -> Self {
        self.meal_datetime = Some(at);
        self
    }

    pub fn meal_type(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }

    pub fn cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine_type = Some(cuisine.into());
        self
    }

    pub fn ai_guess(mut self, source: impl Into<String>, confidence: f64) -> Self {
        self.ai_source = Some(source.into());
        self.ai_confidence = Some(confidence);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn cooking_level(mut self, level: CookingLevel) -> Self {
        self.cooking_level = Some(level);
        self
    }

    pub fn thumbnail_path(mut self, path: impl Into<String>) -> Self {
        self.photo_thumbnail_path = Some(path.into());
        self
    }

    pub fn location(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Override the derived search text.
    pub fn search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn captured_photo(mut self, photo: CapturedPhoto) -> Self {
        self.captured_photo = Some(photo);
        self
    }

    pub fn ingredient(mut self, ingredient: NewIngredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn ingredients(mut self, ingredients: impl IntoIterator<Item = NewIngredient>) -> Self {
        self.ingredients.extend(ingredients);
        self
    }

    pub fn cooking_pattern(mut self, pattern: NewCookingPattern) -> Self {
        self.cooking_pattern = Some(pattern);
        self
    }

    pub fn build(self) -> Result<NewMeal> {
        let meal_name = self
            .meal_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| MealError::validation("meal name is required"))?;
        let photo_path = self
            .photo_path
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| MealError::validation("photo path is required"))?;
        let is_homemade = self
            .is_homemade
            .ok_or_else(|| MealError::validation("homemade flag is required"))?;
        let meal_datetime = self
            .meal_datetime
            .ok_or_else(|| MealError::validation("meal timestamp is required"))?
            .trunc_subsecs(3);

        validate_coordinates(self.latitude, self.longitude)?;
        validate_unit_range("ai confidence", self.ai_confidence)?;
        for ingredient in &self.ingredients {
            ingredient.validate()?;
        }
        if let Some(pattern) = &self.cooking_pattern {
            pattern.validate()?;
        }

        Ok(NewMeal {
            meal_name,
            is_homemade,
            photo_path,
            meal_datetime,
            meal_type: self.meal_type,
            cuisine_type: self.cuisine_type,
            ai_confidence: self.ai_confidence,
            ai_source: self.ai_source,
            notes: self.notes,
            cooking_level: self.cooking_level,
            photo_thumbnail_path: self.photo_thumbnail_path,
            location_name: self.location_name,
            latitude: self.latitude,
            longitude: self.longitude,
            search_text: self.search_text,
            captured_photo: self.captured_photo,
            ingredients: self.ingredients,
            cooking_pattern: self.cooking_pattern,
        })
    }
}

pub(crate) fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<()> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(MealError::validation(format!("latitude {} out of range", lat)));
        }
    }
    if let Some(lon) = longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(MealError::validation(format!("longitude {} out of range", lon)));
        }
    }
    Ok(())
}

pub(crate) fn validate_unit_range(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => {
            Err(MealError::validation(format!("{} must be between 0 and 1, got {}", field, v)))
        }
        _ => Ok(()),
    }
}

/// Partial edit of a meal.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the stored value and `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct MealUpdate {
    pub meal_name: Option<String>,
    pub meal_type: Option<Option<MealType>>,
    pub cuisine_type: Option<Option<String>>,
    pub ai_confidence: Option<Option<f64>>,
    pub ai_source: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub cooking_level: Option<Option<CookingLevel>>,
    pub is_homemade: Option<bool>,
    pub photo_path: Option<String>,
    pub photo_thumbnail_path: Option<Option<String>>,
    pub location_name: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub meal_datetime: Option<DateTime<Utc>>,
    /// Explicit search text; wins over recomputation.
    pub search_text: Option<String>,
}

impl MealUpdate {
    pub fn is_empty(&self) -> bool {
        self.meal_name.is_none()
            && self.meal_type.is_none()
            && self.cuisine_type.is_none()
            && self.ai_confidence.is_none()
            && self.ai_source.is_none()
            && self.notes.is_none()
            && self.cooking_level.is_none()
            && self.is_homemade.is_none()
            && self.photo_path.is_none()
            && self.photo_thumbnail_path.is_none()
            && self.location_name.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.meal_datetime.is_none()
            && self.search_text.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if matches!(&self.meal_name, Some(n) if n.trim().is_empty()) {
            return Err(MealError::validation("meal name cannot be empty"));
        }
        if matches!(&self.photo_path, Some(p) if p.trim().is_empty()) {
            return Err(MealError::validation("photo path cannot be empty"));
        }
        validate_coordinates(self.latitude.flatten(), self.longitude.flatten())?;
        validate_unit_range("ai confidence", self.ai_confidence.flatten())
    }

    /// Whether the update touches a field that feeds `search_text`.
    pub fn touches_search_sources(&self) -> bool {
        self.meal_name.is_some()
            || self.cuisine_type.is_some()
            || self.location_name.is_some()
            || self.notes.is_some()
    }

    /// Copy the present fields onto `meal`. Timestamps and search text are
    /// left to the caller.
    pub(crate) fn apply_to(&self, meal: &mut Meal) {
        if let Some(v) = &self.meal_name {
            meal.meal_name = v.clone();
        }
        if let Some(v) = self.meal_type {
            meal.meal_type = v;
        }
        if let Some(v) = &self.cuisine_type {
            meal.cuisine_type = v.clone();
        }
        if let Some(v) = self.ai_confidence {
            meal.ai_confidence = v;
        }
        if let Some(v) = &self.ai_source {
            meal.ai_source = v.clone();
        }
        if let Some(v) = &self.notes {
            meal.notes = v.clone();
        }
        if let Some(v) = self.cooking_level {
            meal.cooking_level = v;
        }
        if let Some(v) = self.is_homemade {
            meal.is_homemade = v;
        }
        if let Some(v) = &self.photo_path {
            meal.photo_path = v.clone();
        }
        if let Some(v) = &self.photo_thumbnail_path {
            meal.photo_thumbnail_path = v.clone();
        }
        if let Some(v) = &self.location_name {
            meal.location_name = v.clone();
        }
        if let Some(v) = self.latitude {
            meal.latitude = v;
        }
        if let Some(v) = self.longitude {
            meal.longitude = v;
        }
        if let Some(v) = self.meal_datetime {
            meal.meal_datetime = v.trunc_subsecs(3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NewMealBuilder {
        NewMeal::builder()
            .name("Ramen")
            .homemade(false)
            .photo_path("/p.jpg")
            .meal_datetime(Utc::now())
    }

    #[test]
    fn test_search_text_skips_missing_parts() {
        let text = derive_search_text("Miso Ramen", Some("Japanese"), None, Some(""), &["Noodles", "Egg"]);
        assert_eq!(text, "miso ramen japanese noodles egg");
    }

    #[test]
    fn test_build_requires_name_and_photo() {
        let err = NewMeal::builder().homemade(true).photo_path("/p.jpg").meal_datetime(Utc::now()).build();
        assert!(matches!(err, Err(MealError::Validation(_))));

        let err = base().photo_path("  ").build();
        assert!(matches!(err, Err(MealError::Validation(_))));

        let err = NewMeal::builder().name("Toast").photo_path("/t.jpg").meal_datetime(Utc::now()).build();
        assert!(matches!(err, Err(MealError::Validation(_))));
    }

    #[test]
    fn test_build_rejects_bad_coordinates() {
        assert!(base().coordinates(91.0, 0.0).build().is_err());
        assert!(base().coordinates(35.6, 139.7).build().is_ok());
    }

    #[test]
    fn test_explicit_search_text_wins() {
        let meal = base().cuisine("Japanese").search_text("custom").build().unwrap();
        assert_eq!(meal.resolved_search_text(), "custom");

        let meal = base().cuisine("Japanese").build().unwrap();
        assert_eq!(meal.resolved_search_text(), "ramen japanese");
    }

    #[test]
    fn test_update_emptiness_and_validation() {
        assert!(MealUpdate::default().is_empty());

        let update = MealUpdate { notes: Some(None), ..Default::default() };
        assert!(!update.is_empty());
        assert!(update.touches_search_sources());

        let update = MealUpdate { meal_name: Some(String::new()), ..Default::default() };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_meal_type_text_mapping() {
        assert_eq!(MealType::from_str("dinner"), Some(MealType::Dinner));
        assert_eq!(MealType::Snack.as_str(), "snack");
        assert_eq!(CookingLevel::from_str("extreme"), None);
    }
}
