//! Visit tracking for places.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::MealRepository;
use crate::db::locations::{average_interval_days, LOCATION_COLUMNS};
use crate::db::meals::validate_coordinates;
use crate::db::record::{self, to_millis};
use crate::db::Location;
use crate::error::{MealError, Result};

impl MealRepository {
    /// Count a visit to `name` at `at`, creating the place on first visit.
    ///
    /// Coordinates, when given, replace the stored ones.
    pub fn record_location_visit(
        &self,
        name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        at: DateTime<Utc>,
    ) -> Result<Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MealError::validation("location name is required"));
        }
        validate_coordinates(latitude, longitude)?;
        let at = at.trunc_subsecs(3);

        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        match location_by_name(&tx, name)? {
            None => {
                tx.execute(
                    r#"
                    INSERT INTO locations (name, latitude, longitude, visit_count, first_visit, last_visit, is_favorite, created_at)
                    VALUES (?, ?, ?, 1, ?, ?, 0, ?)
                    "#,
                    params![name, latitude, longitude, to_millis(&at), to_millis(&at), to_millis(&record::now())],
                )?;
            }
            Some(existing) => {
                let visit_count = existing.visit_count + 1;
                let first = existing.first_visit.map_or(at, |f| f.min(at));
                let last = existing.last_visit.map_or(at, |l| l.max(at));
                tx.execute(
                    r#"
                    UPDATE locations SET
                        visit_count = ?, first_visit = ?, last_visit = ?, average_interval_days = ?,
                        latitude = COALESCE(?, latitude), longitude = COALESCE(?, longitude)
                    WHERE id = ?
                    "#,
                    params![
                        visit_count,
                        to_millis(&first),
                        to_millis(&last),
                        average_interval_days(first, last, visit_count),
                        latitude,
                        longitude,
                        existing.id,
                    ],
                )?;
            }
        }

        let location = location_by_name(&tx, name)?
            .ok_or_else(|| MealError::not_found(format!("location {}", name)))?;
        tx.commit()?;

        info!(location = name, visits = location.visit_count, "Recorded location visit");
        Ok(location)
    }

    pub fn set_location_favorite(&self, name: &str, favorite: bool) -> Result<Location> {
        let conn = self.db.lock();
        let changed = conn.execute(
            "UPDATE locations SET is_favorite = ? WHERE name = ?",
            params![favorite, name.trim()],
        )?;
        if changed == 0 {
            return Err(MealError::not_found(format!("location {}", name)));
        }
        location_by_name(&conn, name.trim())?.ok_or_else(|| MealError::not_found(format!("location {}", name)))
    }

    /// Favorites first, then by visit count.
    pub fn list_locations(&self) -> Result<Vec<Location>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM locations ORDER BY is_favorite DESC, visit_count DESC, name ASC",
            LOCATION_COLUMNS
        ))?;
        let locations = stmt.query_map([], Location::from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }
}

fn location_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Location>> {
    conn.query_row(
        &format!("SELECT {} FROM locations WHERE name = ?", LOCATION_COLUMNS),
        [name],
        Location::from_row,
    )
    .optional()
}
