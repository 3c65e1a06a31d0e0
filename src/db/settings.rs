//! Types for persisted application settings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::{from_millis, text_enum, Timestamped};
use crate::error::{MealError, Result};

text_enum! {
    /// Declared type of a setting's value.
    pub enum SettingType {
        String => "string",
        Boolean => "boolean",
        Number => "number",
        Json => "json",
    }
}

impl SettingType {
    /// Check that `value` parses as this type.
    pub fn validate(&self, value: &str) -> Result<()> {
        let ok = match self {
            SettingType::String => true,
            SettingType::Boolean => matches!(value, "true" | "false"),
            SettingType::Number => value.parse::<f64>().is_ok(),
            SettingType::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
        };
        if ok {
            Ok(())
        } else {
            Err(MealError::validation(format!("'{}' is not a valid {} value", value, self)))
        }
    }
}

pub(crate) const SETTING_COLUMNS: &str =
    "id, key, value, data_type, updated_at, description, is_user_setting, requires_restart";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSetting {
    pub id: i64,
    pub key: String,
    pub value: Option<String>,
    pub data_type: SettingType,
    pub updated_at: DateTime<Utc>,
    pub description: Option<String>,
    pub is_user_setting: bool,
    pub requires_restart: bool,
}

impl AppSetting {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(AppSetting {
            id: row.get(0)?,
            key: row.get(1)?,
            value: row.get(2)?,
            data_type: row.get(3)?,
            updated_at: from_millis(4, row.get(4)?)?,
            description: row.get(5)?,
            is_user_setting: row.get(6)?,
            requires_restart: row.get(7)?,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (self.data_type, self.value.as_deref()) {
            (SettingType::Boolean, Some("true")) => Some(true),
            (SettingType::Boolean, Some("false")) => Some(false),
            _ => None,
        }
    }
}

impl Timestamped for AppSetting {
    // Settings keep no creation time; the last write stands in for it.
    fn created_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// A built-in setting written by `seed_default_settings`.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSetting {
    pub key: &'static str,
    pub value: &'static str,
    pub data_type: SettingType,
    pub description: &'static str,
    pub requires_restart: bool,
}

pub const DEFAULT_SETTINGS: &[DefaultSetting] = &[
    DefaultSetting {
        key: "reminder.enabled",
        value: "true",
        data_type: SettingType::Boolean,
        description: "Remind me to log meals",
        requires_restart: false,
    },
    DefaultSetting {
        key: "reminder.time",
        value: "19:00",
        data_type: SettingType::String,
        description: "Time of day for the logging reminder",
        requires_restart: false,
    },
    DefaultSetting {
        key: "reminder.weekdays_only",
        value: "true",
        data_type: SettingType::Boolean,
        description: "Only remind on weekdays",
        requires_restart: false,
    },
    DefaultSetting {
        key: "location.enabled",
        value: "true",
        data_type: SettingType::Boolean,
        description: "Record location when capturing a meal",
        requires_restart: false,
    },
    DefaultSetting {
        key: "backup.auto",
        value: "false",
        data_type: SettingType::Boolean,
        description: "Back up the journal automatically",
        requires_restart: false,
    },
    DefaultSetting {
        key: "camera.photo_quality",
        value: "high",
        data_type: SettingType::String,
        description: "Quality of captured meal photos",
        requires_restart: false,
    },
    DefaultSetting {
        key: "display.theme",
        value: "system",
        data_type: SettingType::String,
        description: "Colour theme",
        requires_restart: true,
    },
    DefaultSetting {
        key: "privacy.usage_data",
        value: "false",
        data_type: SettingType::Boolean,
        description: "Share anonymous usage data",
        requires_restart: false,
    },
];
