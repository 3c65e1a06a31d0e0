/// Version stored in `PRAGMA user_version` once the schema is created.
pub const SCHEMA_VERSION: i32 = 1;

// All timestamps are INTEGER epoch milliseconds (UTC).
pub const SCHEMA: &str = r#"
-- Meals table: one logged eating event
CREATE TABLE IF NOT EXISTS meals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    meal_name TEXT NOT NULL,
    meal_type TEXT,             -- 'breakfast', 'lunch', 'dinner', 'snack'
    cuisine_type TEXT,
    ai_confidence REAL,         -- reserved for food recognition
    ai_source TEXT,
    notes TEXT,
    cooking_level TEXT,         -- 'easy', 'medium', 'hard'
    is_homemade INTEGER NOT NULL DEFAULT 0,
    photo_path TEXT NOT NULL,
    photo_thumbnail_path TEXT,
    location_name TEXT,
    latitude REAL,
    longitude REAL,
    meal_datetime INTEGER NOT NULL,
    search_text TEXT NOT NULL DEFAULT '',
    is_deleted INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_meals_name ON meals(meal_name);
CREATE INDEX IF NOT EXISTS idx_meals_cuisine ON meals(cuisine_type);
CREATE INDEX IF NOT EXISTS idx_meals_homemade ON meals(is_homemade);
CREATE INDEX IF NOT EXISTS idx_meals_location ON meals(location_name);
CREATE INDEX IF NOT EXISTS idx_meals_datetime ON meals(meal_datetime);
CREATE INDEX IF NOT EXISTS idx_meals_deleted ON meals(is_deleted);
CREATE INDEX IF NOT EXISTS idx_meals_created ON meals(created_at);

-- Ingredients: detected or user-added components of a meal
CREATE TABLE IF NOT EXISTS ingredients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    category TEXT,
    confidence REAL,
    quantity TEXT,
    ingredient_type TEXT,
    is_user_added INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (meal_id) REFERENCES meals(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_ingredients_meal ON ingredients(meal_id);
CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name);

-- Locations: places visited, independent of meals.location_name
CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    category TEXT,
    latitude REAL,
    longitude REAL,
    address TEXT,
    visit_count INTEGER NOT NULL DEFAULT 0,
    last_visit INTEGER,
    first_visit INTEGER,
    average_interval_days REAL,
    business_hours TEXT,
    price_range TEXT,           -- 'low', 'medium', 'high'
    is_favorite INTEGER NOT NULL DEFAULT 0,
    notes TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_locations_visits ON locations(visit_count);
CREATE INDEX IF NOT EXISTS idx_locations_favorite ON locations(is_favorite);

-- Meal images: the captured photo and its derived files
CREATE TABLE IF NOT EXISTS meal_images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL,
    original_path TEXT NOT NULL,
    thumbnail_path TEXT,
    compressed_path TEXT,
    file_size INTEGER,
    width INTEGER,
    height INTEGER,
    format TEXT,
    taken_at INTEGER,
    camera_make TEXT,
    camera_model TEXT,
    is_processed INTEGER NOT NULL DEFAULT 0,
    processing_status TEXT NOT NULL DEFAULT 'pending',  -- 'pending', 'processing', 'completed', 'failed'
    quality_score REAL,
    FOREIGN KEY (meal_id) REFERENCES meals(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_meal_images_meal ON meal_images(meal_id);

-- Cooking patterns: derived analytics for homemade meals
CREATE TABLE IF NOT EXISTS cooking_patterns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL,
    recipe_complexity INTEGER,
    cooking_time_minutes INTEGER,
    skill_level TEXT,           -- 'beginner', 'intermediate', 'advanced'
    ingredient_count INTEGER,
    fresh_ingredient_ratio REAL,
    day_of_week INTEGER,        -- 0 = Sunday
    time_of_day TEXT,           -- 'morning', 'afternoon', 'evening', 'night'
    weather_condition TEXT,
    created_at INTEGER NOT NULL,
    analysis_version TEXT NOT NULL,
    FOREIGN KEY (meal_id) REFERENCES meals(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_cooking_patterns_meal ON cooking_patterns(meal_id);

-- Tags and their assignment to meals
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    category TEXT,
    color TEXT,
    usage_count INTEGER NOT NULL DEFAULT 0,
    is_system_tag INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tags_usage ON tags(usage_count);

CREATE TABLE IF NOT EXISTS meal_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    confidence REAL,
    created_at INTEGER NOT NULL,
    UNIQUE (meal_id, tag_id),
    FOREIGN KEY (meal_id) REFERENCES meals(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_meal_tags_meal ON meal_tags(meal_id);
CREATE INDEX IF NOT EXISTS idx_meal_tags_tag ON meal_tags(tag_id);

-- Behavior insights: discovered patterns and trends
CREATE TABLE IF NOT EXISTS behavior_insights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    insight_type TEXT NOT NULL,  -- 'pattern', 'trend', 'recommendation', 'warning', 'insight'
    title TEXT NOT NULL,
    description TEXT,
    confidence REAL NOT NULL,
    analysis_start_date INTEGER,
    analysis_end_date INTEGER,
    related_meals TEXT,          -- JSON array of meal uuids
    statistical_data TEXT,       -- JSON object
    discovered_at INTEGER NOT NULL,
    is_dismissed INTEGER NOT NULL DEFAULT 0,
    shown_to_user INTEGER NOT NULL DEFAULT 0,
    business_relevance REAL,
    health_relevance REAL,
    lifestyle_relevance REAL
);

CREATE INDEX IF NOT EXISTS idx_insights_type ON behavior_insights(insight_type);
CREATE INDEX IF NOT EXISTS idx_insights_dismissed ON behavior_insights(is_dismissed);
CREATE INDEX IF NOT EXISTS idx_insights_shown ON behavior_insights(shown_to_user);

-- Search vectors: reserved for embedding-based search
CREATE TABLE IF NOT EXISTS search_vectors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    meal_id INTEGER NOT NULL UNIQUE,
    vector_data TEXT,
    vector_model TEXT,
    vector_dimension INTEGER,
    indexed_text TEXT,
    keywords TEXT,               -- JSON array
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    FOREIGN KEY (meal_id) REFERENCES meals(id) ON DELETE CASCADE
);

-- Application settings
CREATE TABLE IF NOT EXISTS app_settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL UNIQUE,
    value TEXT,
    data_type TEXT NOT NULL DEFAULT 'string',  -- 'string', 'boolean', 'number', 'json'
    updated_at INTEGER NOT NULL,
    description TEXT,
    is_user_setting INTEGER NOT NULL DEFAULT 1,
    requires_restart INTEGER NOT NULL DEFAULT 0
);
"#;
