use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use super::*;
use crate::db::{
    CapturedPhoto, CookingLevel, InsightType, MealType, NewCookingPattern, NewIngredient, NewInsight, SettingType,
    SkillLevel, DEFAULT_SETTINGS,
};

fn repo() -> MealRepository {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    MealRepository::new(Arc::new(db))
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

fn meal(name: &str, homemade: bool, when: DateTime<Utc>) -> NewMeal {
    NewMeal::builder()
        .name(name)
        .homemade(homemade)
        .photo_path(format!("/photos/{}.jpg", name.to_lowercase()))
        .meal_datetime(when)
        .build()
        .unwrap()
}

fn meal_with_cuisine(name: &str, cuisine: &str, when: DateTime<Utc>) -> NewMeal {
    NewMeal::builder()
        .name(name)
        .homemade(false)
        .photo_path("/p.jpg")
        .meal_datetime(when)
        .cuisine(cuisine)
        .build()
        .unwrap()
}

fn count_rows(repo: &MealRepository, table: &str) -> i64 {
    repo.db
        .lock()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}

// ============================================================================
// create_meal
// ============================================================================

#[test]
fn test_create_meal_stamps_new_record() {
    let repo = repo();
    let created = repo.create_meal(&meal("Ramen", false, at(1, 19))).unwrap();

    assert!(!created.is_deleted);
    assert_eq!(created.created_at, created.updated_at);
    assert!(!created.uuid.is_nil());
    assert_eq!(created.meal_name, "Ramen");
    assert_eq!(created.meal_datetime, at(1, 19));
    assert_eq!(created.search_text, "ramen");
}

#[test]
fn test_create_meal_writes_children() {
    let repo = repo();
    let new_meal = NewMeal::builder()
        .name("Carbonara")
        .homemade(true)
        .photo_path("/photos/carbonara.JPG")
        .meal_datetime(at(2, 20))
        .meal_type(MealType::Dinner)
        .cuisine("Italian")
        .cooking_level(CookingLevel::Medium)
        .captured_photo(CapturedPhoto { uri: "file:///photos/carbonara.JPG".into(), width: 4032, height: 3024 })
        .ingredient(NewIngredient::named("Guanciale"))
        .ingredient(NewIngredient::named("Pecorino"))
        .cooking_pattern(NewCookingPattern {
            skill_level: Some(SkillLevel::Intermediate),
            cooking_time_minutes: Some(25),
            ..Default::default()
        })
        .build()
        .unwrap();

    let created = repo.create_meal(&new_meal).unwrap();
    assert_eq!(created.search_text, "carbonara italian guanciale pecorino");

    let detail = repo.get_meal(&created.uuid).unwrap().unwrap();
    assert_eq!(detail.meal, created);
    assert_eq!(detail.ingredients.len(), 2);
    assert!(detail.ingredients.iter().all(|i| !i.is_user_added));

    let image = detail.image.unwrap();
    assert_eq!(image.original_path, "/photos/carbonara.JPG");
    assert_eq!(image.width, Some(4032));
    assert_eq!(image.format.as_deref(), Some("jpg"));
    assert_eq!(image.processing_status, ProcessingStatus::Pending);

    let pattern = detail.cooking_pattern.unwrap();
    assert_eq!(pattern.analysis_version, ANALYSIS_VERSION);
    assert_eq!(pattern.cooking_time_minutes, Some(25));
}

#[test]
fn test_create_meal_uses_supplied_search_text() {
    let repo = repo();
    let new_meal = NewMeal::builder()
        .name("Pho")
        .homemade(false)
        .photo_path("/p.jpg")
        .meal_datetime(at(3, 12))
        .search_text("beef noodle soup")
        .build()
        .unwrap();

    let created = repo.create_meal(&new_meal).unwrap();
    assert_eq!(created.search_text, "beef noodle soup");
    assert_eq!(repo.search_meals_by_text("noodle").unwrap().len(), 1);
}

#[test]
fn test_create_meal_rolls_back_when_child_insert_fails() {
    let repo = repo();
    repo.db.lock().execute_batch("DROP TABLE cooking_patterns;").unwrap();

    let new_meal = NewMeal::builder()
        .name("Curry")
        .homemade(true)
        .photo_path("/p.jpg")
        .meal_datetime(at(4, 19))
        .ingredient(NewIngredient::named("Rice"))
        .cooking_pattern(NewCookingPattern::default())
        .build()
        .unwrap();

    let err = repo.create_meal(&new_meal).unwrap_err();
    assert!(matches!(err, MealError::Transaction(_)));
    assert_eq!(count_rows(&repo, "meals"), 0);
    assert_eq!(count_rows(&repo, "ingredients"), 0);
    assert_eq!(count_rows(&repo, "meal_images"), 0);
}

#[test]
fn test_builder_rejects_missing_fields() {
    let err = NewMeal::builder()
        .name("  ")
        .homemade(true)
        .photo_path("/p.jpg")
        .meal_datetime(at(1, 8))
        .build()
        .unwrap_err();
    assert!(matches!(err, MealError::Validation(_)));

    let err = NewMeal::builder().name("Toast").homemade(true).meal_datetime(at(1, 8)).build().unwrap_err();
    assert!(matches!(err, MealError::Validation(_)));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_search_meals_hides_deleted() {
    let repo = repo();
    let kept = repo.create_meal(&meal("Salad", true, at(1, 12))).unwrap();
    let gone = repo.create_meal(&meal("Burger", false, at(1, 19))).unwrap();
    repo.soft_delete_meal(&gone.uuid).unwrap();

    let all = repo.search_meals(&SearchFilters::default()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].uuid, kept.uuid);
    assert!(all.iter().all(|m| !m.is_deleted));
}

#[test]
fn test_search_meals_combines_filters() {
    let repo = repo();
    repo.create_meal(&meal_with_cuisine("Pizza", "Italian", at(1, 19))).unwrap();
    repo.create_meal(&meal_with_cuisine("Sushi", "Japanese", at(2, 19))).unwrap();
    let homemade = NewMeal::builder()
        .name("Lasagna")
        .homemade(true)
        .photo_path("/p.jpg")
        .meal_datetime(at(3, 19))
        .cuisine("Italian")
        .cooking_level(CookingLevel::Hard)
        .location("Home Kitchen")
        .build()
        .unwrap();
    repo.create_meal(&homemade).unwrap();

    let italian = SearchFilters { cuisine_type: Some("Italian".into()), ..Default::default() };
    let names: Vec<_> = repo.search_meals(&italian).unwrap().into_iter().map(|m| m.meal_name).collect();
    assert_eq!(names, vec!["Lasagna", "Pizza"]);

    let filters = SearchFilters {
        cuisine_type: Some("Italian".into()),
        is_homemade: Some(true),
        cooking_level: Some(CookingLevel::Hard),
        location_name: Some("Kitchen".into()),
        ..Default::default()
    };
    let found = repo.search_meals(&filters).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].meal_name, "Lasagna");

    let wrong_case = SearchFilters { location_name: Some("kitchen".into()), ..Default::default() };
    assert!(repo.search_meals(&wrong_case).unwrap().is_empty());
}

#[test]
fn test_text_search_is_case_insensitive_and_literal() {
    let repo = repo();
    let ramen = repo.create_meal(&meal("Tonkotsu Ramen", false, at(1, 19))).unwrap();
    let discounted = NewMeal::builder()
        .name("Soup")
        .homemade(false)
        .photo_path("/p.jpg")
        .meal_datetime(at(2, 19))
        .notes("50% off")
        .build()
        .unwrap();
    repo.create_meal(&discounted).unwrap();

    let found = repo.search_meals_by_text("RAMEN").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uuid, ramen.uuid);

    assert_eq!(repo.search_meals_by_text("50%").unwrap().len(), 1);
    assert!(repo.search_meals_by_text("%").unwrap().len() == 1);
    assert!(repo.search_meals_by_text("_amen").unwrap().is_empty());
}

#[test]
fn test_date_range_bounds_are_inclusive() {
    let repo = repo();
    let start = at(10, 0);
    let end = at(11, 0);
    let ms = Duration::milliseconds(1);

    repo.create_meal(&meal("Before", true, start - ms)).unwrap();
    repo.create_meal(&meal("AtStart", true, start)).unwrap();
    repo.create_meal(&meal("AtEnd", true, end)).unwrap();
    repo.create_meal(&meal("After", true, end + ms)).unwrap();

    let names: Vec<_> =
        repo.meals_by_date_range(start, end).unwrap().into_iter().map(|m| m.meal_name).collect();
    assert_eq!(names, vec!["AtEnd", "AtStart"]);
}

#[test]
fn test_recent_meals_orders_by_meal_time() {
    let repo = repo();
    // Inserted out of chronological order.
    repo.create_meal(&meal("Second", true, at(2, 12))).unwrap();
    repo.create_meal(&meal("Third", true, at(3, 12))).unwrap();
    repo.create_meal(&meal("First", true, at(1, 12))).unwrap();

    let names: Vec<_> = repo.recent_meals(2).unwrap().into_iter().map(|m| m.meal_name).collect();
    assert_eq!(names, vec!["Third", "Second"]);
    assert_eq!(repo.recent_meals(DEFAULT_RECENT_LIMIT).unwrap().len(), 3);
    assert!(repo.recent_meals(0).unwrap().is_empty());
}

#[test]
fn test_meals_in_period() {
    let repo = repo();
    // 2024-05-15 is a Wednesday.
    let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 0, 0).unwrap();
    repo.create_meal(&meal("Today", true, at(15, 8))).unwrap();
    repo.create_meal(&meal("Monday", true, at(13, 8))).unwrap();
    repo.create_meal(&meal("EarlyMay", true, at(2, 8))).unwrap();
    repo.create_meal(&meal("April", true, Utc.with_ymd_and_hms(2024, 4, 30, 8, 0, 0).unwrap())).unwrap();

    assert_eq!(repo.meals_in_period(Period::Today, now).unwrap().len(), 1);
    assert_eq!(repo.meals_in_period(Period::ThisWeek, now).unwrap().len(), 2);
    assert_eq!(repo.meals_in_period(Period::ThisMonth, now).unwrap().len(), 3);
    assert_eq!(repo.meals_in_period(Period::All, now).unwrap().len(), 4);
}

#[test]
fn test_get_meal_skips_deleted_and_unknown() {
    let repo = repo();
    let created = repo.create_meal(&meal("Tacos", false, at(5, 19))).unwrap();
    repo.soft_delete_meal(&created.uuid).unwrap();

    assert!(repo.get_meal(&created.uuid).unwrap().is_none());
    assert!(repo.get_meal(&Uuid::new_v4()).unwrap().is_none());
}

// ============================================================================
// soft_delete_meal / update_meal
// ============================================================================

#[test]
fn test_soft_delete_advances_updated_at_and_is_idempotent() {
    let repo = repo();
    let created = repo.create_meal(&meal("Bagel", true, at(6, 8))).unwrap();

    repo.soft_delete_meal(&created.uuid).unwrap();
    let first = find_meal(&repo.db.lock(), &created.uuid).unwrap().unwrap();
    assert!(first.is_deleted);
    assert!(first.updated_at > created.updated_at);

    repo.soft_delete_meal(&created.uuid).unwrap();
    let second = find_meal(&repo.db.lock(), &created.uuid).unwrap().unwrap();
    assert!(second.is_deleted);
    assert!(second.updated_at > first.updated_at);
}

#[test]
fn test_soft_delete_unknown_is_not_found() {
    let repo = repo();
    let err = repo.soft_delete_meal(&Uuid::new_v4()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_update_notes_only_changes_notes_and_derived_fields() {
    let repo = repo();
    let before = repo.create_meal(&meal_with_cuisine("Bibimbap", "Korean", at(7, 13))).unwrap();

    let update = MealUpdate { notes: Some(Some("x".into())), ..Default::default() };
    let after = repo.update_meal(&before.uuid, &update).unwrap();

    assert_eq!(after.notes.as_deref(), Some("x"));
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.search_text, "bibimbap korean x");

    let mut expected = before.clone();
    expected.notes = Some("x".into());
    expected.search_text = after.search_text.clone();
    expected.updated_at = after.updated_at;
    assert_eq!(after, expected);

    let stored = find_meal(&repo.db.lock(), &before.uuid).unwrap().unwrap();
    assert_eq!(stored, after);
}

#[test]
fn test_update_can_clear_and_override_search_text() {
    let repo = repo();
    let created = repo.create_meal(&meal_with_cuisine("Paella", "Spanish", at(8, 20))).unwrap();

    let cleared = repo
        .update_meal(&created.uuid, &MealUpdate { cuisine_type: Some(None), ..Default::default() })
        .unwrap();
    assert_eq!(cleared.cuisine_type, None);
    assert_eq!(cleared.search_text, "paella");

    let overridden = repo
        .update_meal(
            &created.uuid,
            &MealUpdate { notes: Some(Some("saffron".into())), search_text: Some("custom".into()), ..Default::default() },
        )
        .unwrap();
    assert_eq!(overridden.search_text, "custom");
}

#[test]
fn test_update_rejects_deleted_unknown_and_invalid() {
    let repo = repo();
    let created = repo.create_meal(&meal("Waffles", true, at(9, 9))).unwrap();

    let blank = MealUpdate { meal_name: Some(" ".into()), ..Default::default() };
    assert!(matches!(repo.update_meal(&created.uuid, &blank).unwrap_err(), MealError::Validation(_)));

    let rename = MealUpdate { meal_name: Some("Pancakes".into()), ..Default::default() };
    assert!(repo.update_meal(&Uuid::new_v4(), &rename).unwrap_err().is_not_found());

    repo.soft_delete_meal(&created.uuid).unwrap();
    assert!(repo.update_meal(&created.uuid, &rename).unwrap_err().is_not_found());
}

#[test]
fn test_update_image_status_touches_meal() {
    let repo = repo();
    let created = repo.create_meal(&meal("Dumplings", false, at(10, 19))).unwrap();

    let image = repo.update_image_status(&created.uuid, ProcessingStatus::Completed).unwrap();
    assert_eq!(image.processing_status, ProcessingStatus::Completed);
    assert!(image.is_processed);

    let stored = find_meal(&repo.db.lock(), &created.uuid).unwrap().unwrap();
    assert!(stored.updated_at > created.updated_at);
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_statistics_single_takeout_meal() {
    let repo = repo();
    repo.create_meal(&meal("Ramen", false, at(1, 19))).unwrap();

    let stats = repo.statistics().unwrap();
    assert_eq!(stats.total_meals, 1);
    assert_eq!(stats.homemade_meals, 0);
    assert_eq!(stats.takeout_meals, 1);
    assert_eq!(stats.favorite_cuisine, None);
}

#[test]
fn test_statistics_favorite_cuisine() {
    let repo = repo();
    repo.create_meal(&meal_with_cuisine("Pizza", "Italian", at(1, 19))).unwrap();
    repo.create_meal(&meal_with_cuisine("Risotto", "Italian", at(2, 19))).unwrap();
    repo.create_meal(&meal_with_cuisine("Sushi", "Japanese", at(3, 19))).unwrap();

    assert_eq!(repo.statistics().unwrap().favorite_cuisine.as_deref(), Some("Italian"));
}

#[test]
fn test_statistics_cuisine_tie_is_alphabetical_and_ignores_deleted() {
    let repo = repo();
    repo.create_meal(&meal_with_cuisine("Sushi", "Japanese", at(1, 19))).unwrap();
    repo.create_meal(&meal_with_cuisine("Tacos", "Mexican", at(2, 19))).unwrap();
    let extra = repo.create_meal(&meal_with_cuisine("Burrito", "Mexican", at(3, 19))).unwrap();
    repo.soft_delete_meal(&extra.uuid).unwrap();

    let stats = repo.statistics().unwrap();
    assert_eq!(stats.total_meals, 2);
    assert_eq!(stats.favorite_cuisine.as_deref(), Some("Japanese"));
}

#[test]
fn test_statistics_empty_database() {
    let repo = repo();
    let stats = repo.statistics().unwrap();
    assert_eq!(stats.total_meals, 0);
    assert_eq!(stats.takeout_meals, 0);
    assert_eq!(stats.favorite_cuisine, None);
    assert_eq!(repo.favorite_location().unwrap(), None);
}

#[test]
fn test_cooking_breakdown_and_top_dishes() {
    let repo = repo();
    for (day, level) in [(1, Some(CookingLevel::Easy)), (2, Some(CookingLevel::Easy)), (3, None)] {
        let mut builder =
            NewMeal::builder().name("Omelette").homemade(true).photo_path("/p.jpg").meal_datetime(at(day, 8));
        if let Some(level) = level {
            builder = builder.cooking_level(level);
        }
        repo.create_meal(&builder.build().unwrap()).unwrap();
    }
    repo.create_meal(&meal("Curry", true, at(4, 19))).unwrap();
    repo.create_meal(&meal("Kebab", false, at(5, 23))).unwrap();

    let breakdown = repo.cooking_level_breakdown().unwrap();
    assert_eq!(breakdown.easy, 2);
    assert_eq!(breakdown.hard, 0);
    assert_eq!(breakdown.unrated, 2);
    assert_eq!(breakdown.total(), 4);

    let top = repo.top_dishes(Some(true), 2).unwrap();
    assert_eq!(top[0], DishCount { meal_name: "Omelette".into(), count: 3 });
    assert_eq!(top[1].meal_name, "Curry");

    let takeout = repo.top_dishes(Some(false), 10).unwrap();
    assert_eq!(takeout.len(), 1);
    assert_eq!(repo.top_dishes(None, 10).unwrap().len(), 3);
}

#[test]
fn test_favorite_location() {
    let repo = repo();
    for (day, place) in [(1, "Noodle Bar"), (2, "Cafe"), (3, "Noodle Bar")] {
        let new_meal = NewMeal::builder()
            .name("Lunch")
            .homemade(false)
            .photo_path("/p.jpg")
            .meal_datetime(at(day, 12))
            .location(place)
            .build()
            .unwrap();
        repo.create_meal(&new_meal).unwrap();
    }
    assert_eq!(repo.favorite_location().unwrap().as_deref(), Some("Noodle Bar"));
}

// ============================================================================
// Tags, locations, insights, vectors, settings
// ============================================================================

#[test]
fn test_tag_meal_counts_usage_once() {
    let repo = repo();
    let created = repo.create_meal(&meal("Steak", true, at(1, 20))).unwrap();

    repo.tag_meal(&created.uuid, "celebration", Some(0.9)).unwrap();
    let again = repo.tag_meal(&created.uuid, " celebration ", None).unwrap();
    assert_eq!(again.tag_name, "celebration");
    assert_eq!(again.confidence, Some(0.9));

    let tags = repo.list_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].usage_count, 1);

    let detail = repo.get_meal(&created.uuid).unwrap().unwrap();
    assert_eq!(detail.tags.len(), 1);
    assert!(detail.meal.updated_at > created.updated_at);

    assert!(repo.untag_meal(&created.uuid, "celebration").unwrap());
    assert!(!repo.untag_meal(&created.uuid, "celebration").unwrap());
    assert_eq!(repo.list_tags().unwrap()[0].usage_count, 0);
}

#[test]
fn test_tag_meal_validation() {
    let repo = repo();
    let created = repo.create_meal(&meal("Soup", true, at(1, 20))).unwrap();

    assert!(matches!(repo.tag_meal(&created.uuid, "", None).unwrap_err(), MealError::Validation(_)));
    assert!(matches!(repo.tag_meal(&created.uuid, "spicy", Some(1.5)).unwrap_err(), MealError::Validation(_)));
    assert!(repo.tag_meal(&Uuid::new_v4(), "spicy", None).unwrap_err().is_not_found());
}

#[test]
fn test_location_visits_track_interval() {
    let repo = repo();
    let start = at(1, 12);
    repo.record_location_visit("Corner Deli", None, None, start).unwrap();
    repo.record_location_visit("Corner Deli", Some(40.7), Some(-74.0), start + Duration::days(6)).unwrap();
    let location = repo.record_location_visit("Corner Deli", None, None, start + Duration::days(2)).unwrap();

    assert_eq!(location.visit_count, 3);
    assert_eq!(location.first_visit, Some(start));
    assert_eq!(location.last_visit, Some(start + Duration::days(6)));
    assert_eq!(location.average_interval_days, Some(3.0));
    assert_eq!(location.latitude, Some(40.7));
}

#[test]
fn test_location_favorites_sort_first() {
    let repo = repo();
    repo.record_location_visit("Busy Place", None, None, at(1, 12)).unwrap();
    repo.record_location_visit("Busy Place", None, None, at(2, 12)).unwrap();
    repo.record_location_visit("Quiet Place", None, None, at(3, 12)).unwrap();

    let favorite = repo.set_location_favorite("Quiet Place", true).unwrap();
    assert!(favorite.is_favorite);

    let names: Vec<_> = repo.list_locations().unwrap().into_iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["Quiet Place", "Busy Place"]);

    assert!(repo.set_location_favorite("Nowhere", true).unwrap_err().is_not_found());
    assert!(matches!(
        repo.record_location_visit("Bad", Some(95.0), Some(0.0), at(1, 1)).unwrap_err(),
        MealError::Validation(_)
    ));
}

#[test]
fn test_insight_lifecycle() {
    let repo = repo();
    let created = repo.create_meal(&meal("Pizza", false, at(1, 19))).unwrap();

    let mut new_insight = NewInsight::new(InsightType::Pattern, "Pizza on Fridays", 0.8);
    new_insight.related_meals = vec![created.uuid];
    new_insight.statistical_data = Some(serde_json::json!({ "fridays": 4 }));

    let insight = repo.record_insight(&new_insight).unwrap();
    assert_eq!(insight.related_meals, vec![created.uuid]);
    assert!(!insight.shown_to_user);

    repo.mark_insight_shown(insight.id).unwrap();
    assert!(repo.active_insights().unwrap()[0].shown_to_user);

    repo.dismiss_insight(insight.id).unwrap();
    assert!(repo.active_insights().unwrap().is_empty());
    assert!(repo.dismiss_insight(insight.id + 100).unwrap_err().is_not_found());

    let invalid = NewInsight::new(InsightType::Pattern, "Too sure", 1.2);
    assert!(matches!(repo.record_insight(&invalid).unwrap_err(), MealError::Validation(_)));
}

#[test]
fn test_search_vector_refresh() {
    let repo = repo();
    let created = repo.create_meal(&meal_with_cuisine("Pad Thai", "Thai", at(1, 19))).unwrap();
    assert!(repo.search_vector(&created.uuid).unwrap().is_none());

    let first = repo.refresh_search_vector(&created.uuid).unwrap();
    assert_eq!(first.indexed_text.as_deref(), Some("pad thai thai"));
    assert_eq!(first.keywords, vec!["pad", "thai"]);
    assert!(first.vector_data.is_none());

    repo.update_meal(&created.uuid, &MealUpdate { notes: Some(Some("Peanuts".into())), ..Default::default() })
        .unwrap();
    let second = repo.refresh_search_vector(&created.uuid).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.keywords, vec!["pad", "thai", "peanuts"]);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(repo.search_vector(&created.uuid).unwrap(), Some(second));
}

#[test]
fn test_settings_seed_and_update() {
    let repo = repo();
    assert_eq!(repo.seed_default_settings().unwrap(), DEFAULT_SETTINGS.len());

    let updated = repo.set_setting("reminder.time", "08:30", SettingType::String).unwrap();
    assert_eq!(updated.value.as_deref(), Some("08:30"));

    assert_eq!(repo.seed_default_settings().unwrap(), 0);
    assert_eq!(repo.list_settings().unwrap().len(), DEFAULT_SETTINGS.len());
    let kept = repo.get_setting("reminder.time").unwrap().unwrap();
    assert_eq!(kept.value.as_deref(), Some("08:30"));
    assert!(kept.updated_at >= updated.updated_at);

    assert!(matches!(
        repo.set_setting("backup.auto", "maybe", SettingType::Boolean).unwrap_err(),
        MealError::Validation(_)
    ));
    assert!(repo.get_setting("missing").unwrap().is_none());
}
