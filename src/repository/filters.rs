//! Search criteria and the SQL predicates they translate to.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use rusqlite::types::Value;

use crate::db::record::to_millis;
use crate::db::CookingLevel;

/// Matches the free-text input against name, notes, and derived search text.
pub(crate) const TEXT_PREDICATE: &str =
    r"(meal_name LIKE ?1 ESCAPE '\' OR notes LIKE ?1 ESCAPE '\' OR search_text LIKE ?1 ESCAPE '\')";

/// Conjunctive filters for `MealRepository::search_meals`.
///
/// Every field is optional; an empty filter matches all non-deleted meals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Inclusive lower bound on `meal_datetime`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `meal_datetime`.
    pub date_to: Option<DateTime<Utc>>,
    pub cuisine_type: Option<String>,
    pub is_homemade: Option<bool>,
    pub cooking_level: Option<CookingLevel>,
    /// Case-sensitive substring of `location_name`.
    pub location_name: Option<String>,
    /// Case-insensitive substring of name, notes, or search text.
    pub text: Option<String>,
}

/// A SQL `WHERE` body with positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WhereClause {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SearchFilters {
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { date_from: Some(from), date_to: Some(to), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn where_clause(&self) -> WhereClause {
        let mut clauses: Vec<String> = vec!["is_deleted = 0".to_string()];
        let mut params: Vec<Value> = Vec::new();

        // Numbered placeholders so the text predicate can reuse one parameter.
        let mut push = |clause: &str, value: Value, params: &mut Vec<Value>| {
            params.push(value);
            clauses.push(clause.replace("?1", &format!("?{}", params.len())));
        };

        if let Some(from) = &self.date_from {
            push("meal_datetime >= ?1", Value::Integer(to_millis(from)), &mut params);
        }
        if let Some(to) = &self.date_to {
            push("meal_datetime <= ?1", Value::Integer(to_millis(to)), &mut params);
        }
        if let Some(cuisine) = &self.cuisine_type {
            push("cuisine_type = ?1", Value::Text(cuisine.clone()), &mut params);
        }
        if let Some(homemade) = self.is_homemade {
            push("is_homemade = ?1", Value::Integer(homemade as i64), &mut params);
        }
        if let Some(level) = self.cooking_level {
            push("cooking_level = ?1", Value::Text(level.as_str().to_string()), &mut params);
        }
        if let Some(location) = &self.location_name {
            push("instr(location_name, ?1) > 0", Value::Text(location.clone()), &mut params);
        }
        if let Some(text) = &self.text {
            push(TEXT_PREDICATE, Value::Text(like_pattern(text)), &mut params);
        }

        WhereClause { sql: clauses.join(" AND "), params }
    }
}

/// `%text%` with LIKE wildcards in `text` escaped.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Time windows offered by the records list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    /// Monday through Sunday.
    ThisWeek,
    ThisMonth,
    All,
}

impl Period {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "today" => Some(Period::Today),
            "week" => Some(Period::ThisWeek),
            "month" => Some(Period::ThisMonth),
            "all" => Some(Period::All),
            _ => None,
        }
    }

    /// Inclusive UTC bounds of the period containing `now`; `None` for `All`.
    pub fn range(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let today = now.date_naive();
        let last_ms = Duration::milliseconds(1);
        match self {
            Period::Today => {
                let start = today.and_time(NaiveTime::MIN).and_utc();
                Some((start, start + Duration::days(1) - last_ms))
            }
            Period::ThisWeek => {
                let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                let start = monday.and_time(NaiveTime::MIN).and_utc();
                Some((start, start + Duration::days(7) - last_ms))
            }
            Period::ThisMonth => {
                let first = today.with_day(1)?;
                let next = first.checked_add_months(Months::new(1))?;
                Some((
                    first.and_time(NaiveTime::MIN).and_utc(),
                    next.and_time(NaiveTime::MIN).and_utc() - last_ms,
                ))
            }
            Period::All => None,
        }
    }
}
