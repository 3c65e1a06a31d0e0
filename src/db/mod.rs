mod schema;
pub mod images;
pub mod ingredients;
pub mod insights;
pub mod locations;
pub mod meals;
pub mod patterns;
pub mod record;
pub mod settings;
pub mod tags;
pub mod vectors;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use images::{CapturedPhoto, MealImage, ProcessingStatus};
pub use ingredients::{Ingredient, NewIngredient};
pub use insights::{BehaviorInsight, InsightType, NewInsight};
pub use locations::{Location, PriceRange};
pub use meals::{derive_search_text, CookingLevel, Meal, MealType, MealUpdate, NewMeal, NewMealBuilder};
pub use patterns::{CookingPattern, NewCookingPattern, SkillLevel, TimeOfDay, ANALYSIS_VERSION};
pub use record::{SoftDelete, Timestamped};
pub use settings::{AppSetting, SettingType, DEFAULT_SETTINGS};
pub use tags::{MealTag, Tag};
pub use vectors::SearchVector;

/// Handle to the embedded SQLite store.
///
/// Holds one connection; callers share it through `Arc<Database>` and each
/// operation takes the lock for the duration of its statement or transaction.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        debug!("Opened database at {:?}", path);
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Create tables and indexes and stamp the schema version.
    ///
    /// Refuses to touch a database written by a newer schema.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.lock();
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                version,
                SCHEMA_VERSION
            );
        }

        conn.execute_batch(SCHEMA).context("Failed to create schema")?;

        if version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            info!("Database schema initialized at version {}", SCHEMA_VERSION);
        }
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        let version = self.lock().query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| e).context("Failed to close database")?;
        Ok(())
    }

    /// Exclusive access to the connection.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a transaction open:
        // rusqlite rolls back when the Transaction is dropped.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
