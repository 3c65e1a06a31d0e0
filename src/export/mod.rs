use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::db::Meal;
use crate::repository::{MealRepository, SearchFilters};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// One meal as written to an export file
#[derive(Debug, Serialize)]
pub struct ExportedMeal {
    pub uuid: String,
    pub meal_name: String,
    pub meal_type: Option<String>,
    pub cuisine_type: Option<String>,
    pub is_homemade: bool,
    pub cooking_level: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub meal_datetime: String,
    pub photo_path: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Meal> for ExportedMeal {
    fn from(meal: &Meal) -> Self {
        Self {
            uuid: meal.uuid.to_string(),
            meal_name: meal.meal_name.clone(),
            meal_type: meal.meal_type.map(|t| t.as_str().to_string()),
            cuisine_type: meal.cuisine_type.clone(),
            is_homemade: meal.is_homemade,
            cooking_level: meal.cooking_level.map(|l| l.as_str().to_string()),
            location_name: meal.location_name.clone(),
            latitude: meal.latitude,
            longitude: meal.longitude,
            meal_datetime: meal.meal_datetime.to_rfc3339(),
            photo_path: meal.photo_path.clone(),
            notes: meal.notes.clone(),
            created_at: meal.created_at.to_rfc3339(),
            updated_at: meal.updated_at.to_rfc3339(),
        }
    }
}

/// Export all non-deleted meals, newest first. Returns how many were written.
pub fn export_meals(repo: &MealRepository, output_path: &Path, format: ExportFormat) -> Result<usize> {
    let meals: Vec<ExportedMeal> = repo
        .search_meals(&SearchFilters::default())?
        .iter()
        .map(ExportedMeal::from)
        .collect();
    let count = meals.len();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Json => export_json(&meals, output_path)?,
        ExportFormat::Csv => export_csv(&meals, output_path)?,
    }

    tracing::info!(count, format = format.name(), path = %output_path.display(), "Exported meals");
    Ok(count)
}

fn export_json(meals: &[ExportedMeal], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(meals)?;
    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn export_csv(meals: &[ExportedMeal], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;

    // Headers come from the struct's field names.
    for meal in meals {
        wtr.serialize(meal)?;
    }
    if meals.is_empty() {
        wtr.write_record([
            "uuid",
            "meal_name",
            "meal_type",
            "cuisine_type",
            "is_homemade",
            "cooking_level",
            "location_name",
            "latitude",
            "longitude",
            "meal_datetime",
            "photo_path",
            "notes",
            "created_at",
            "updated_at",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
