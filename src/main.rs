use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use dining_memory::config::Config;
use dining_memory::db::{CookingLevel, Meal, MealType, MealUpdate, NewIngredient, NewMeal, SettingType};
use dining_memory::export::{export_meals, ExportFormat};
use dining_memory::repository::{Period, SearchFilters};
use dining_memory::{logging, Database, MealRepository, MealService};

struct Args {
    config_path: Option<PathBuf>,
    command: String,
    rest: Vec<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("dining-memory {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
            _ => break,
        }
        i += 1;
    }

    let command = args.get(i).cloned().unwrap_or_else(|| "list".to_string());
    let rest = args.iter().skip(i + 1).cloned().collect();
    Args { config_path, command, rest }
}

fn print_help() {
    println!(
        r#"dining-memory - meal journal

USAGE:
    dining-memory [OPTIONS] [COMMAND] [ARGS]

COMMANDS:
    add --name NAME --photo PATH [--homemade] [--at TIME] [--type TYPE]
        [--cuisine C] [--level LEVEL] [--location L] [--notes N] [--ingredient I]...
    list [--period today|week|month|all] [--limit N]
    show UUID
    search [TEXT] [--cuisine C] [--homemade|--takeout] [--level LEVEL]
        [--location L] [--from DATE] [--to DATE]
    edit UUID [--name N] [--notes N] [--cuisine C] [--location L] [--level LEVEL]
        [--clear-notes] [--clear-cuisine] [--clear-location]
    delete UUID
    stats
    tag UUID TAG [--remove]
    export [--format json|csv] [--output PATH]
    settings [KEY VALUE [--type string|boolean|number|json]]

OPTIONS:
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    DINING_MEMORY_CONFIG   Path to config file (overrides default location)
    DINING_MEMORY_LOG      Log filter (trace, debug, info, warn, error)

TIME accepts RFC 3339 (2024-05-01T19:30:00Z); DATE accepts YYYY-MM-DD.
Config file location: $XDG_CONFIG_HOME/dining-memory/config.toml"#
    );
}

/// Flag/value cursor over a command's arguments.
struct Flags {
    args: Vec<String>,
}

impl Flags {
    fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Remove `--flag` and return whether it was present.
    fn switch(&mut self, flag: &str) -> bool {
        match self.args.iter().position(|a| a == flag) {
            Some(pos) => {
                self.args.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove `--flag VALUE` and return the value.
    fn value(&mut self, flag: &str) -> Result<Option<String>> {
        let Some(pos) = self.args.iter().position(|a| a == flag) else {
            return Ok(None);
        };
        if pos + 1 >= self.args.len() {
            bail!("{} requires a value", flag);
        }
        let value = self.args.remove(pos + 1);
        self.args.remove(pos);
        Ok(Some(value))
    }

    /// Remove every `--flag VALUE` pair.
    fn values(&mut self, flag: &str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        while let Some(value) = self.value(flag)? {
            values.push(value);
        }
        Ok(values)
    }

    fn positional(&mut self) -> Option<String> {
        let pos = self.args.iter().position(|a| !a.starts_with("--"))?;
        Some(self.args.remove(pos))
    }

    fn finish(self) -> Result<()> {
        match self.args.first() {
            Some(arg) => bail!("Unexpected argument: {}", arg),
            None => Ok(()),
        }
    }
}

fn parse_uuid(flags: &mut Flags) -> Result<Uuid> {
    let raw = flags.positional().ok_or_else(|| anyhow!("a meal UUID is required"))?;
    Uuid::parse_str(&raw).with_context(|| format!("Invalid UUID: {}", raw))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid time: {}", raw))?
        .with_timezone(&Utc))
}

fn parse_date(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", raw))?;
    let start = date.and_time(NaiveTime::MIN).and_utc();
    Ok(if end_of_day { start + chrono::Duration::days(1) - chrono::Duration::milliseconds(1) } else { start })
}

fn parse_level(raw: &str) -> Result<CookingLevel> {
    CookingLevel::from_str(raw).ok_or_else(|| anyhow!("Unknown cooking level: {}", raw))
}

fn print_meals(meals: &[Meal]) {
    if meals.is_empty() {
        println!("No meals.");
        return;
    }
    for meal in meals {
        let kind = if meal.is_homemade { "homemade" } else { "takeout" };
        let cuisine = meal.cuisine_type.as_deref().unwrap_or("-");
        println!(
            "{}  {}  {:<24} {:<10} {}",
            meal.uuid,
            meal.meal_datetime.format("%Y-%m-%d %H:%M"),
            meal.meal_name,
            cuisine,
            kind
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    let _ = logging::init(None);

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let db = Database::open(&config.db_path())?;
    db.initialize()?;
    let service = MealService::new(Arc::new(MealRepository::new(Arc::new(db))));
    service.seed_default_settings().await?;

    let mut flags = Flags::new(args.rest);
    match args.command.as_str() {
        "add" => cmd_add(&service, &mut flags).await?,
        "list" => cmd_list(&service, &config, &mut flags).await?,
        "show" => cmd_show(&service, &mut flags).await?,
        "search" => cmd_search(&service, &mut flags).await?,
        "edit" => cmd_edit(&service, &mut flags).await?,
        "delete" => {
            let uuid = parse_uuid(&mut flags)?;
            service.soft_delete_meal(uuid).await?;
            println!("Deleted {}", uuid);
        }
        "stats" => cmd_stats(&service).await?,
        "tag" => cmd_tag(&service, &mut flags).await?,
        "export" => cmd_export(&service, &config, &mut flags).await?,
        "settings" => cmd_settings(&service, &mut flags).await?,
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
    }
    flags.finish()
}

async fn cmd_add(service: &MealService, flags: &mut Flags) -> Result<()> {
    let name = flags.value("--name")?.ok_or_else(|| anyhow!("--name is required"))?;
    let photo = flags.value("--photo")?.ok_or_else(|| anyhow!("--photo is required"))?;
    let at = match flags.value("--at")? {
        Some(raw) => parse_time(&raw)?,
        None => Utc::now(),
    };

    let mut builder = NewMeal::builder()
        .name(name)
        .photo_path(photo)
        .homemade(flags.switch("--homemade"))
        .meal_datetime(at);
    if let Some(raw) = flags.value("--type")? {
        builder = builder.meal_type(MealType::from_str(&raw).ok_or_else(|| anyhow!("Unknown meal type: {}", raw))?);
    }
    if let Some(cuisine) = flags.value("--cuisine")? {
        builder = builder.cuisine(cuisine);
    }
    if let Some(raw) = flags.value("--level")? {
        builder = builder.cooking_level(parse_level(&raw)?);
    }
    if let Some(location) = flags.value("--location")? {
        builder = builder.location(location);
    }
    if let Some(notes) = flags.value("--notes")? {
        builder = builder.notes(notes);
    }
    builder = builder.ingredients(flags.values("--ingredient")?.into_iter().map(NewIngredient::named));

    let meal = service.create_meal(builder.build()?).await?;
    if let Some(location) = &meal.location_name {
        service
            .record_location_visit(location.clone(), meal.latitude, meal.longitude, meal.meal_datetime)
            .await?;
    }
    service.refresh_search_vector(meal.uuid).await?;
    println!("Added {} ({})", meal.meal_name, meal.uuid);
    Ok(())
}

async fn cmd_list(service: &MealService, config: &Config, flags: &mut Flags) -> Result<()> {
    let limit = match flags.value("--limit")? {
        Some(raw) => raw.parse().with_context(|| format!("Invalid limit: {}", raw))?,
        None => config.display.recent_limit,
    };
    let meals = match flags.value("--period")? {
        Some(raw) => {
            let period = Period::from_str(&raw).ok_or_else(|| anyhow!("Unknown period: {}", raw))?;
            service.meals_in_period(period, Utc::now()).await?
        }
        None => service.recent_meals(limit).await?,
    };
    print_meals(&meals);
    Ok(())
}

async fn cmd_show(service: &MealService, flags: &mut Flags) -> Result<()> {
    let uuid = parse_uuid(flags)?;
    let detail = service.get_meal(uuid).await?.ok_or_else(|| anyhow!("No meal {}", uuid))?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

async fn cmd_search(service: &MealService, flags: &mut Flags) -> Result<()> {
    let is_homemade = match (flags.switch("--homemade"), flags.switch("--takeout")) {
        (true, true) => bail!("--homemade and --takeout are exclusive"),
        (true, false) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    let filters = SearchFilters {
        date_from: flags.value("--from")?.map(|d| parse_date(&d, false)).transpose()?,
        date_to: flags.value("--to")?.map(|d| parse_date(&d, true)).transpose()?,
        cuisine_type: flags.value("--cuisine")?,
        is_homemade,
        cooking_level: flags.value("--level")?.map(|l| parse_level(&l)).transpose()?,
        location_name: flags.value("--location")?,
        text: flags.positional(),
    };
    print_meals(&service.search_meals(filters).await?);
    Ok(())
}

async fn cmd_edit(service: &MealService, flags: &mut Flags) -> Result<()> {
    let uuid = parse_uuid(flags)?;

    let mut update = MealUpdate {
        meal_name: flags.value("--name")?,
        cooking_level: flags.value("--level")?.map(|l| parse_level(&l)).transpose()?.map(Some),
        ..Default::default()
    };
    update.notes = clearable(flags, "--notes", "--clear-notes")?;
    update.cuisine_type = clearable(flags, "--cuisine", "--clear-cuisine")?;
    update.location_name = clearable(flags, "--location", "--clear-location")?;
    if update.is_empty() {
        bail!("Nothing to change");
    }

    let meal = service.update_meal(uuid, update).await?;
    service.refresh_search_vector(uuid).await?;
    println!("Updated {} ({})", meal.meal_name, meal.uuid);
    Ok(())
}

fn clearable(flags: &mut Flags, set: &str, clear: &str) -> Result<Option<Option<String>>> {
    if flags.switch(clear) {
        return Ok(Some(None));
    }
    Ok(flags.value(set)?.map(Some))
}

async fn cmd_stats(service: &MealService) -> Result<()> {
    let stats = service.statistics().await?;
    let levels = service.cooking_level_breakdown().await?;
    let dishes = service.top_dishes(None, 5).await?;
    let place = service.favorite_location().await?;

    println!("Total meals:      {}", stats.total_meals);
    println!("Homemade:         {}", stats.homemade_meals);
    println!("Takeout:          {}", stats.takeout_meals);
    println!("Favorite cuisine: {}", stats.favorite_cuisine.as_deref().unwrap_or("-"));
    println!("Favorite place:   {}", place.as_deref().unwrap_or("-"));
    println!(
        "Cooking levels:   easy {} / medium {} / hard {} / unrated {}",
        levels.easy, levels.medium, levels.hard, levels.unrated
    );
    if !dishes.is_empty() {
        println!("Top dishes:");
        for dish in dishes {
            println!("  {:>3}  {}", dish.count, dish.meal_name);
        }
    }
    Ok(())
}

async fn cmd_tag(service: &MealService, flags: &mut Flags) -> Result<()> {
    let remove = flags.switch("--remove");
    let uuid = parse_uuid(flags)?;
    let tag = flags.positional().ok_or_else(|| anyhow!("a tag name is required"))?;

    if remove {
        if service.untag_meal(uuid, tag.clone()).await? {
            println!("Removed tag '{}'", tag);
        } else {
            println!("Meal was not tagged '{}'", tag);
        }
    } else {
        let meal_tag = service.tag_meal(uuid, tag, None).await?;
        println!("Tagged '{}'", meal_tag.tag_name);
    }
    Ok(())
}

async fn cmd_export(service: &MealService, config: &Config, flags: &mut Flags) -> Result<()> {
    let format = match flags.value("--format")? {
        Some(raw) => ExportFormat::from_str(&raw).ok_or_else(|| anyhow!("Unknown export format: {}", raw))?,
        None => config.export.format(),
    };
    let output = match flags.value("--output")? {
        Some(path) => PathBuf::from(path),
        None => config
            .export
            .output_dir
            .join(format!("meals-{}.{}", Utc::now().format("%Y%m%d-%H%M%S"), format.extension())),
    };

    let repo = Arc::clone(service.repository());
    let target = output.clone();
    let count = tokio::task::spawn_blocking(move || export_meals(&repo, &target, format)).await??;
    println!("Exported {} meals as {} to {}", count, format.name(), output.display());
    Ok(())
}

async fn cmd_settings(service: &MealService, flags: &mut Flags) -> Result<()> {
    let data_type = match flags.value("--type")? {
        Some(raw) => Some(SettingType::from_str(&raw).ok_or_else(|| anyhow!("Unknown setting type: {}", raw))?),
        None => None,
    };

    match (flags.positional(), flags.positional()) {
        (None, _) => {
            for setting in service.list_settings().await? {
                println!("{:<24} {}", setting.key, setting.value.as_deref().unwrap_or(""));
            }
        }
        (Some(key), None) => {
            let setting = service.get_setting(key.clone()).await?.ok_or_else(|| anyhow!("No setting {}", key))?;
            println!("{}", setting.value.as_deref().unwrap_or(""));
        }
        (Some(key), Some(value)) => {
            // Keep the stored type unless a new one is given.
            let data_type = match data_type {
                Some(t) => t,
                None => service
                    .get_setting(key.clone())
                    .await?
                    .map(|s| s.data_type)
                    .unwrap_or(SettingType::String),
            };
            let setting = service.set_setting(key, value, data_type).await?;
            println!("{} = {}", setting.key, setting.value.as_deref().unwrap_or(""));
        }
    }
    Ok(())
}
