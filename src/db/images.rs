//! Types for meal photos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{opt_from_millis, text_enum};

text_enum! {
    /// Where a meal image is in the (future) processing pipeline.
    pub enum ProcessingStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Descriptor handed over by the camera when a capture completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPhoto {
    pub uri: String,
    pub width: u32,
    pub height: u32,
}

impl CapturedPhoto {
    /// Lowercased file extension of the URI, if any.
    pub fn format(&self) -> Option<String> {
        let name = self.uri.rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_lowercase())
        }
    }
}

pub(crate) const IMAGE_COLUMNS: &str = "id, meal_id, original_path, thumbnail_path, compressed_path, file_size, \
     width, height, format, taken_at, camera_make, camera_model, is_processed, processing_status, quality_score";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealImage {
    pub id: i64,
    pub meal_id: i64,
    pub original_path: String,
    pub thumbnail_path: Option<String>,
    pub compressed_path: Option<String>,
    pub file_size: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub is_processed: bool,
    pub processing_status: ProcessingStatus,
    pub quality_score: Option<f64>,
}

impl MealImage {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(MealImage {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            original_path: row.get(2)?,
            thumbnail_path: row.get(3)?,
            compressed_path: row.get(4)?,
            file_size: row.get(5)?,
            width: row.get(6)?,
            height: row.get(7)?,
            format: row.get(8)?,
            taken_at: opt_from_millis(9, row.get(9)?)?,
            camera_make: row.get(10)?,
            camera_model: row.get(11)?,
            is_processed: row.get(12)?,
            processing_status: row.get(13)?,
            quality_score: row.get(14)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_photo_format() {
        let photo = CapturedPhoto { uri: "file:///tmp/IMG_001.JPG".to_string(), width: 4032, height: 3024 };
        assert_eq!(photo.format().as_deref(), Some("jpg"));

        let photo = CapturedPhoto { uri: "file:///tmp/capture".to_string(), width: 1, height: 1 };
        assert_eq!(photo.format(), None);
    }
}
