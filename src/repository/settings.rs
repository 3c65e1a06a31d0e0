//! Key/value application settings.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::MealRepository;
use crate::db::record::{self, to_millis, Timestamped};
use crate::db::settings::SETTING_COLUMNS;
use crate::db::{AppSetting, SettingType, DEFAULT_SETTINGS};
use crate::error::{MealError, Result};

impl MealRepository {
    pub fn get_setting(&self, key: &str) -> Result<Option<AppSetting>> {
        let conn = self.db.lock();
        Ok(setting_by_key(&conn, key)?)
    }

    /// Create or replace a setting after checking `value` against `data_type`.
    pub fn set_setting(&self, key: &str, value: &str, data_type: SettingType) -> Result<AppSetting> {
        let key = key.trim();
        if key.is_empty() {
            return Err(MealError::validation("setting key is required"));
        }
        data_type.validate(value)?;

        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        match setting_by_key(&tx, key)? {
            Some(mut existing) => {
                let at = existing.touch();
                tx.execute(
                    "UPDATE app_settings SET value = ?, data_type = ?, updated_at = ? WHERE id = ?",
                    params![value, data_type, to_millis(&at), existing.id],
                )?;
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO app_settings (key, value, data_type, updated_at, is_user_setting, requires_restart)
                    VALUES (?, ?, ?, ?, 1, 0)
                    "#,
                    params![key, value, data_type, to_millis(&record::now())],
                )?;
            }
        }

        let setting =
            setting_by_key(&tx, key)?.ok_or_else(|| MealError::not_found(format!("setting {}", key)))?;
        tx.commit()?;

        info!(key = key, value = value, "Updated setting");
        Ok(setting)
    }

    pub fn list_settings(&self) -> Result<Vec<AppSetting>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM app_settings ORDER BY key", SETTING_COLUMNS))?;
        let settings = stmt.query_map([], AppSetting::from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(settings)
    }

    /// Insert the built-in settings that are not present yet.
    ///
    /// Returns how many were inserted; existing values are never overwritten.
    pub fn seed_default_settings(&self) -> Result<usize> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        let now = to_millis(&record::now());

        let mut inserted = 0;
        for default in DEFAULT_SETTINGS {
            inserted += tx.execute(
                r#"
                INSERT OR IGNORE INTO app_settings (key, value, data_type, updated_at, description, is_user_setting, requires_restart)
                VALUES (?, ?, ?, ?, ?, 0, ?)
                "#,
                params![
                    default.key,
                    default.value,
                    default.data_type,
                    now,
                    default.description,
                    default.requires_restart,
                ],
            )?;
        }
        tx.commit()?;

        if inserted > 0 {
            info!(count = inserted, "Seeded default settings");
        }
        Ok(inserted)
    }
}

fn setting_by_key(conn: &Connection, key: &str) -> rusqlite::Result<Option<AppSetting>> {
    conn.query_row(
        &format!("SELECT {} FROM app_settings WHERE key = ?", SETTING_COLUMNS),
        [key],
        AppSetting::from_row,
    )
    .optional()
}
