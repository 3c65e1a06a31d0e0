//! Types for discovered behavior insights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::meals::validate_unit_range;
use super::record::{from_millis, opt_from_millis, text_enum};
use crate::error::{MealError, Result};

text_enum! {
    pub enum InsightType {
        Pattern => "pattern",
        Trend => "trend",
        Recommendation => "recommendation",
        Warning => "warning",
        Insight => "insight",
    }
}

pub(crate) const INSIGHT_COLUMNS: &str = "id, insight_type, title, description, confidence, analysis_start_date, \
     analysis_end_date, related_meals, statistical_data, discovered_at, is_dismissed, shown_to_user, \
     business_relevance, health_relevance, lifestyle_relevance";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorInsight {
    pub id: i64,
    pub insight_type: InsightType,
    pub title: String,
    pub description: Option<String>,
    pub confidence: f64,
    pub analysis_start_date: Option<DateTime<Utc>>,
    pub analysis_end_date: Option<DateTime<Utc>>,
    pub related_meals: Vec<Uuid>,
    pub statistical_data: Option<serde_json::Value>,
    pub discovered_at: DateTime<Utc>,
    pub is_dismissed: bool,
    pub shown_to_user: bool,
    pub business_relevance: Option<f64>,
    pub health_relevance: Option<f64>,
    pub lifestyle_relevance: Option<f64>,
}

impl BehaviorInsight {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let related: Option<String> = row.get(7)?;
        let related_meals: Vec<Uuid> = match related {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
            })?,
            None => Vec::new(),
        };
        let stats: Option<String> = row.get(8)?;
        let statistical_data: Option<serde_json::Value> = stats
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e)))?;

        Ok(BehaviorInsight {
            id: row.get(0)?,
            insight_type: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            confidence: row.get(4)?,
            analysis_start_date: opt_from_millis(5, row.get(5)?)?,
            analysis_end_date: opt_from_millis(6, row.get(6)?)?,
            related_meals,
            statistical_data,
            discovered_at: from_millis(9, row.get(9)?)?,
            is_dismissed: row.get(10)?,
            shown_to_user: row.get(11)?,
            business_relevance: row.get(12)?,
            health_relevance: row.get(13)?,
            lifestyle_relevance: row.get(14)?,
        })
    }
}

/// Input for recording a new insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInsight {
    pub insight_type: InsightType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub analysis_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub analysis_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub related_meals: Vec<Uuid>,
    #[serde(default)]
    pub statistical_data: Option<serde_json::Value>,
    #[serde(default)]
    pub business_relevance: Option<f64>,
    #[serde(default)]
    pub health_relevance: Option<f64>,
    #[serde(default)]
    pub lifestyle_relevance: Option<f64>,
}

impl NewInsight {
    pub fn new(insight_type: InsightType, title: impl Into<String>, confidence: f64) -> Self {
        Self {
            insight_type,
            title: title.into(),
            description: None,
            confidence,
            analysis_start_date: None,
            analysis_end_date: None,
            related_meals: Vec::new(),
            statistical_data: None,
            business_relevance: None,
            health_relevance: None,
            lifestyle_relevance: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(MealError::validation("insight title is required"));
        }
        validate_unit_range("insight confidence", Some(self.confidence))?;
        validate_unit_range("business relevance", self.business_relevance)?;
        validate_unit_range("health relevance", self.health_relevance)?;
        validate_unit_range("lifestyle relevance", self.lifestyle_relevance)?;
        if let (Some(start), Some(end)) = (self.analysis_start_date, self.analysis_end_date) {
            if start > end {
                return Err(MealError::validation("analysis window ends before it starts"));
            }
        }
        Ok(())
    }
}
