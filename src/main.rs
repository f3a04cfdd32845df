// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use infinite_recipe_book::database::{self, query};
use infinite_recipe_book::enums::{IngredientCategory, MealType};
use infinite_recipe_book::models::{Ingredient, RecipeId};
use std::path::PathBuf;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
struct Args {
    /// Use this database file instead of the one in the user data directory.
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List recipes by name.
    Recipes {
        #[arg(long, value_parser = parse_enum::<MealType>)]
        meal_type: Option<MealType>,
    },
    /// Show a recipe with its ingredients and steps.
    Recipe { id: i32 },
    Ingredients,
    /// List common ingredients, most popular first.
    CommonIngredients,
    AddIngredient {
        name: String,
        #[arg(long, value_parser = parse_enum::<IngredientCategory>)]
        category: Option<IngredientCategory>,
        #[arg(long = "unit")]
        units: Vec<String>,
        #[arg(long)]
        common: bool,
    },
}

/// Accepts `dairy`, `Dairy` or `DAIRY` alike, and dashes for underscores.
fn parse_enum<T: std::str::FromStr<Err = strum::ParseError>>(
    s: &str,
) -> std::result::Result<T, strum::ParseError> {
    s.trim().to_uppercase().replace('-', "_").parse()
}

/// This is where the database lives on-disk. On Linux it should be like:
/// `~/.local/share/infinite_recipe_book/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    let path = dirs.data_dir().join("infinite_recipe_book");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn list_recipes(conn: &mut database::Connection, meal_type: Option<MealType>) -> Result<()> {
    for recipe in query::list_recipes(conn, meal_type)? {
        let id = recipe.id.map(|id| id.to_string()).unwrap_or_default();
        println!("{id:>5}  {}", recipe.name);
    }
    Ok(())
}

fn show_recipe(conn: &mut database::Connection, id: RecipeId) -> Result<()> {
    let recipe = query::load_recipe(conn, id)?;

    println!("{}", recipe.name());
    if let Some(description) = recipe.description() {
        println!("{description}");
    }
    println!();
    if let Some(meal_type) = recipe.meal_type() {
        println!("meal: {}", meal_type.label());
    }
    if let Some(difficulty) = recipe.difficulty() {
        println!("difficulty: {}", difficulty.label());
    }
    if let Some(minutes) = recipe.cooking_time_minutes() {
        println!("time: {minutes} minutes");
    }
    if let Some(servings) = recipe.servings() {
        println!("servings: {servings}");
    }
    if let Some(tags) = recipe.tags() {
        println!("tags: {}", tags.join(", "));
    }
    if let Some(nutrition) = recipe.nutritional_info() {
        let facts = [
            ("calories", nutrition.calories),
            ("protein", nutrition.protein),
            ("carbs", nutrition.carbs),
            ("fat", nutrition.fat),
            ("fiber", nutrition.fiber),
            ("sugar", nutrition.sugar),
            ("sodium", nutrition.sodium),
        ];
        let facts: Vec<String> = facts
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| format!("{name} {v}")))
            .collect();
        println!("nutrition: {}", facts.join(", "));
    }

    println!();
    println!("Ingredients:");
    for usage in recipe.ingredients() {
        let mut line = String::new();
        if let Some(quantity) = usage.quantity() {
            line += &format!("{quantity} ");
        }
        if let Some(unit) = usage.unit() {
            line += &format!("{unit} ");
        }
        if let Some(ingredient) = usage.ingredient() {
            line += &ingredient.name;
        }
        if !usage.is_required() {
            line += " (optional)";
        }
        println!("  - {line}");
    }

    println!();
    println!("Steps:");
    for (position, instruction) in (1..).zip(recipe.instructions()) {
        match instruction.step_number() {
            Some(number) => println!("  {number}. {}", instruction.description()),
            None => println!("  {position}. {}", instruction.description()),
        }
    }
    Ok(())
}

fn list_ingredients(conn: &mut database::Connection) -> Result<()> {
    for ingredient in query::list_ingredients(conn)? {
        let category = ingredient.category().map(|c| c.label()).unwrap_or("");
        println!("{:<30} {category}", ingredient.name());
    }
    Ok(())
}

fn list_common_ingredients(conn: &mut database::Connection) -> Result<()> {
    for common in query::list_common_ingredients(conn)? {
        let name = common.ingredient().map(|i| i.name.as_str()).unwrap_or("");
        println!("{:>5}  {name}", common.popularity_score());
    }
    Ok(())
}

fn add_ingredient(
    conn: &mut database::Connection,
    name: String,
    category: Option<IngredientCategory>,
    units: Vec<String>,
    common: bool,
) -> Result<()> {
    if let Some(existing) = query::find_ingredient_by_name(conn, &name)? {
        return Err(format!("ingredient {:?} already exists", existing.name()).into());
    }

    let mut ingredient = Ingredient::builder()
        .normalized_name(Ingredient::normalize_name(&name))
        .name(name)
        .common(common)
        .build();
    ingredient.set_category(category);
    if !units.is_empty() {
        ingredient.set_common_units(Some(units));
    }
    query::save_ingredient(conn, &mut ingredient)?;

    let id = ingredient.id().ok_or("ingredient was not assigned an id")?;
    if common {
        query::increment_popularity(conn, id)?;
    }
    log::info!("added ingredient {id} {:?}", ingredient.name());
    println!("{id}");
    Ok(())
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args = Args::parse();
    let path = match args.database {
        Some(path) => path,
        None => data_path()?.join("data.sqlite"),
    };
    let mut conn = database::establish_connection(path)?;
    match args.commands {
        Commands::Recipes { meal_type } => list_recipes(&mut conn, meal_type)?,
        Commands::Recipe { id } => show_recipe(&mut conn, RecipeId::new(id))?,
        Commands::Ingredients => list_ingredients(&mut conn)?,
        Commands::CommonIngredients => list_common_ingredients(&mut conn)?,
        Commands::AddIngredient {
            name,
            category,
            units,
            common,
        } => add_ingredient(&mut conn, name, category, units, common)?,
    }
    Ok(())
}
