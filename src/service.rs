//! Async front for [`MealRepository`].
//!
//! SQLite calls block, so every method hands its work to the blocking pool.
//! A spawned task runs to completion even if the returned future is dropped,
//! which means a write that has started is never cut short by the caller.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    AppSetting, BehaviorInsight, Location, Meal, MealImage, MealTag, MealUpdate, NewInsight, NewMeal,
    ProcessingStatus, SearchVector, SettingType, Tag,
};
use crate::error::Result;
use crate::repository::{
    CookingBreakdown, DishCount, MealDetail, MealRepository, MealStatistics, Period, SearchFilters,
};

#[derive(Clone)]
pub struct MealService {
    repo: Arc<MealRepository>,
}

async fn run_blocking<F, T>(repo: Arc<MealRepository>, f: F) -> Result<T>
where
    F: FnOnce(&MealRepository) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&repo)).await?
}

impl MealService {
    pub fn new(repo: Arc<MealRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<MealRepository> {
        &self.repo
    }

    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&MealRepository) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(Arc::clone(&self.repo), f).await
    }

    // ========================================================================
    // Meals
    // ========================================================================

    pub async fn create_meal(&self, new_meal: NewMeal) -> Result<Meal> {
        self.run(move |repo| repo.create_meal(&new_meal)).await
    }

    pub async fn get_meal(&self, uuid: Uuid) -> Result<Option<MealDetail>> {
        self.run(move |repo| repo.get_meal(&uuid)).await
    }

    pub async fn update_meal(&self, uuid: Uuid, update: MealUpdate) -> Result<Meal> {
        self.run(move |repo| repo.update_meal(&uuid, &update)).await
    }

    pub async fn soft_delete_meal(&self, uuid: Uuid) -> Result<()> {
        self.run(move |repo| repo.soft_delete_meal(&uuid)).await
    }

    pub async fn update_image_status(&self, uuid: Uuid, status: ProcessingStatus) -> Result<MealImage> {
        self.run(move |repo| repo.update_image_status(&uuid, status)).await
    }

    pub async fn search_meals(&self, filters: SearchFilters) -> Result<Vec<Meal>> {
        self.run(move |repo| repo.search_meals(&filters)).await
    }

    pub async fn search_meals_by_text(&self, text: String) -> Result<Vec<Meal>> {
        self.run(move |repo| repo.search_meals_by_text(&text)).await
    }

    pub async fn meals_by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Meal>> {
        self.run(move |repo| repo.meals_by_date_range(start, end)).await
    }

    pub async fn meals_in_period(&self, period: Period, now: DateTime<Utc>) -> Result<Vec<Meal>> {
        self.run(move |repo| repo.meals_in_period(period, now)).await
    }

    pub async fn recent_meals(&self, limit: usize) -> Result<Vec<Meal>> {
        self.run(move |repo| repo.recent_meals(limit)).await
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub async fn statistics(&self) -> Result<MealStatistics> {
        self.run(|repo| repo.statistics()).await
    }

    pub async fn cooking_level_breakdown(&self) -> Result<CookingBreakdown> {
        self.run(|repo| repo.cooking_level_breakdown()).await
    }

    pub async fn top_dishes(&self, homemade: Option<bool>, limit: usize) -> Result<Vec<DishCount>> {
        self.run(move |repo| repo.top_dishes(homemade, limit)).await
    }

    pub async fn favorite_location(&self) -> Result<Option<String>> {
        self.run(|repo| repo.favorite_location()).await
    }

    // ========================================================================
    // Tags and locations
    // ========================================================================

    pub async fn tag_meal(&self, uuid: Uuid, tag: String, confidence: Option<f64>) -> Result<MealTag> {
        self.run(move |repo| repo.tag_meal(&uuid, &tag, confidence)).await
    }

    pub async fn untag_meal(&self, uuid: Uuid, tag: String) -> Result<bool> {
        self.run(move |repo| repo.untag_meal(&uuid, &tag)).await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.run(|repo| repo.list_tags()).await
    }

    pub async fn record_location_visit(
        &self,
        name: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
        at: DateTime<Utc>,
    ) -> Result<Location> {
        self.run(move |repo| repo.record_location_visit(&name, latitude, longitude, at)).await
    }

    pub async fn set_location_favorite(&self, name: String, favorite: bool) -> Result<Location> {
        self.run(move |repo| repo.set_location_favorite(&name, favorite)).await
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        self.run(|repo| repo.list_locations()).await
    }

    // ========================================================================
    // Insights and search vectors
    // ========================================================================

    pub async fn record_insight(&self, insight: NewInsight) -> Result<BehaviorInsight> {
        self.run(move |repo| repo.record_insight(&insight)).await
    }

    pub async fn active_insights(&self) -> Result<Vec<BehaviorInsight>> {
        self.run(|repo| repo.active_insights()).await
    }

    pub async fn dismiss_insight(&self, id: i64) -> Result<()> {
        self.run(move |repo| repo.dismiss_insight(id)).await
    }

    pub async fn mark_insight_shown(&self, id: i64) -> Result<()> {
        self.run(move |repo| repo.mark_insight_shown(id)).await
    }

    pub async fn refresh_search_vector(&self, uuid: Uuid) -> Result<SearchVector> {
        self.run(move |repo| repo.refresh_search_vector(&uuid)).await
    }

    pub async fn search_vector(&self, uuid: Uuid) -> Result<Option<SearchVector>> {
        self.run(move |repo| repo.search_vector(&uuid)).await
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub async fn get_setting(&self, key: String) -> Result<Option<AppSetting>> {
        self.run(move |repo| repo.get_setting(&key)).await
    }

    pub async fn set_setting(&self, key: String, value: String, data_type: SettingType) -> Result<AppSetting> {
        self.run(move |repo| repo.set_setting(&key, &value, data_type)).await
    }

    pub async fn list_settings(&self) -> Result<Vec<AppSetting>> {
        self.run(|repo| repo.list_settings()).await
    }

    pub async fn seed_default_settings(&self) -> Result<usize> {
        self.run(|repo| repo.seed_default_settings()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::MealError;
    use chrono::TimeZone;

    fn service() -> MealService {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        MealService::new(Arc::new(MealRepository::new(Arc::new(db))))
    }

    fn new_meal(name: &str, homemade: bool) -> NewMeal {
        NewMeal::builder()
            .name(name)
            .homemade(homemade)
            .photo_path("/photos/meal.jpg")
            .meal_datetime(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_service_round_trip() {
        let service = service();
        let created = service.create_meal(new_meal("Gyoza", false)).await.unwrap();

        let found = service.search_meals_by_text("gyoza".into()).await.unwrap();
        assert_eq!(found, vec![created.clone()]);

        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.total_meals, 1);
        assert_eq!(stats.takeout_meals, 1);

        service.soft_delete_meal(created.uuid).await.unwrap();
        assert!(service.recent_meals(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_surfaces_repository_errors() {
        let service = service();
        let err = service.update_meal(Uuid::new_v4(), MealUpdate::default()).await.unwrap_err();
        assert!(matches!(err, MealError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_all_stored() {
        let service = service();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.create_meal(new_meal(&format!("Meal {}", i), i % 2 == 0)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.total_meals, 8);
        assert_eq!(stats.homemade_meals, 4);
    }

    #[tokio::test]
    async fn test_dropped_future_still_commits() {
        let service = service();
        // Poll once so the write is handed to the blocking pool, then drop it.
        let pending = service.create_meal(new_meal("Focaccia", true));
        let _ = tokio::time::timeout(std::time::Duration::ZERO, pending).await;

        // The blocking write may still be running; wait for it to land.
        for _ in 0..50 {
            if !service.recent_meals(1).await.unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("meal was not stored after the caller went away");
    }
}
