//! Helpers shared by every record type: timestamps, soft delete, and the
//! column conversions SQLite needs for our value types.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::types::Type;
use uuid::Uuid;

/// Current time truncated to the millisecond precision we store.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Timestamp for a write following `previous`.
///
/// Always strictly later than `previous`, even when the clock has not moved
/// (or moved backwards) since the last write.
pub fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

pub fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

pub fn opt_from_millis(idx: usize, millis: Option<i64>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    millis.map(|m| from_millis(idx, m)).transpose()
}

/// Read a TEXT column holding a hyphenated UUID.
pub fn uuid_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Records carrying `created_at`/`updated_at`.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Refresh `updated_at` for a write, keeping it strictly increasing.
    fn touch(&mut self) -> DateTime<Utc> {
        let at = next_stamp(self.updated_at());
        self.set_updated_at(at);
        at
    }
}

/// Records hidden by a flag instead of being removed.
pub trait SoftDelete {
    fn is_deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);

    fn mark_deleted(&mut self) {
        self.set_deleted(true);
    }
}

/// Declares a closed set of lowercase string values stored in a TEXT column.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let text = value.as_str()?;
                $name::from_str(text).ok_or_else(|| {
                    rusqlite::types::FromSqlError::Other(
                        format!("unknown {} value: {}", stringify!($name), text).into(),
                    )
                })
            }
        }
    };
}

pub(crate) use text_enum;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_stamp_advances_past_future_previous() {
        let future = now() + Duration::seconds(60);
        assert_eq!(next_stamp(future), future + Duration::milliseconds(1));
    }

    #[test]
    fn test_next_stamp_uses_clock_when_later() {
        let past = now() - Duration::seconds(60);
        let stamp = next_stamp(past);
        assert!(stamp > past + Duration::seconds(59));
        assert_eq!(stamp.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_millis_conversion() {
        let at = now();
        assert_eq!(from_millis(0, to_millis(&at)).unwrap(), at);
        assert_eq!(opt_from_millis(0, None).unwrap(), None);
    }
}
