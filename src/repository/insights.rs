//! Storage for discovered behavior insights.

use rusqlite::params;
use tracing::info;

use super::MealRepository;
use crate::db::insights::INSIGHT_COLUMNS;
use crate::db::record::{self, to_millis};
use crate::db::{BehaviorInsight, NewInsight};
use crate::error::{MealError, Result};

impl MealRepository {
    pub fn record_insight(&self, insight: &NewInsight) -> Result<BehaviorInsight> {
        insight.validate()?;

        let related = serde_json::to_string(&insight.related_meals)
            .map_err(|e| MealError::validation(format!("related meals: {}", e)))?;
        let stats = insight
            .statistical_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| MealError::validation(format!("statistical data: {}", e)))?;

        let conn = self.db.lock();
        conn.execute(
            r#"
            INSERT INTO behavior_insights (
                insight_type, title, description, confidence, analysis_start_date, analysis_end_date,
                related_meals, statistical_data, discovered_at, is_dismissed, shown_to_user,
                business_relevance, health_relevance, lifestyle_relevance
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?)
            "#,
            params![
                insight.insight_type,
                insight.title,
                insight.description,
                insight.confidence,
                insight.analysis_start_date.as_ref().map(to_millis),
                insight.analysis_end_date.as_ref().map(to_millis),
                related,
                stats,
                to_millis(&record::now()),
                insight.business_relevance,
                insight.health_relevance,
                insight.lifestyle_relevance,
            ],
        )?;
        let id = conn.last_insert_rowid();
        let stored = conn.query_row(
            &format!("SELECT {} FROM behavior_insights WHERE id = ?", INSIGHT_COLUMNS),
            [id],
            BehaviorInsight::from_row,
        )?;

        info!(insight = id, kind = %stored.insight_type, "Recorded insight");
        Ok(stored)
    }

    /// Insights the user has not dismissed, newest first.
    pub fn active_insights(&self) -> Result<Vec<BehaviorInsight>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM behavior_insights WHERE is_dismissed = 0 ORDER BY discovered_at DESC, id DESC",
            INSIGHT_COLUMNS
        ))?;
        let insights = stmt
            .query_map([], BehaviorInsight::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(insights)
    }

    pub fn dismiss_insight(&self, id: i64) -> Result<()> {
        self.set_insight_flag("is_dismissed", id)
    }

    pub fn mark_insight_shown(&self, id: i64) -> Result<()> {
        self.set_insight_flag("shown_to_user", id)
    }

    fn set_insight_flag(&self, column: &'static str, id: i64) -> Result<()> {
        let conn = self.db.lock();
        let changed = conn.execute(&format!("UPDATE behavior_insights SET {} = 1 WHERE id = ?", column), [id])?;
        if changed == 0 {
            return Err(MealError::not_found(format!("insight {}", id)));
        }
        Ok(())
    }
}
