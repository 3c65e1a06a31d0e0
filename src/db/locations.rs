//! Types for visited places.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::{from_millis, opt_from_millis, text_enum};

text_enum! {
    pub enum PriceRange {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

pub(crate) const LOCATION_COLUMNS: &str = "id, name, category, latitude, longitude, address, visit_count, \
     last_visit, first_visit, average_interval_days, business_hours, price_range, is_favorite, notes, created_at";

/// A place visited. Not linked to `Meal::location_name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub visit_count: i64,
    pub last_visit: Option<DateTime<Utc>>,
    pub first_visit: Option<DateTime<Utc>>,
    pub average_interval_days: Option<f64>,
    pub business_hours: Option<String>,
    pub price_range: Option<PriceRange>,
    pub is_favorite: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Location {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            address: row.get(5)?,
            visit_count: row.get(6)?,
            last_visit: opt_from_millis(7, row.get(7)?)?,
            first_visit: opt_from_millis(8, row.get(8)?)?,
            average_interval_days: row.get(9)?,
            business_hours: row.get(10)?,
            price_range: row.get(11)?,
            is_favorite: row.get(12)?,
            notes: row.get(13)?,
            created_at: from_millis(14, row.get(14)?)?,
        })
    }
}

/// Mean days between visits given the first and last visit.
///
/// Undefined until there are at least two visits.
pub fn average_interval_days(first: DateTime<Utc>, last: DateTime<Utc>, visit_count: i64) -> Option<f64> {
    if visit_count < 2 {
        return None;
    }
    let span_days = (last - first).num_milliseconds() as f64 / 86_400_000.0;
    Some(span_days / (visit_count - 1) as f64)
}
