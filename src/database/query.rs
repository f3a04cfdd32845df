// Copyright 2023 Remi Bernotavicius

use super::models::{
    CommonIngredientRow, CommonIngredientValues, IngredientRow, IngredientValues,
    RecipeIngredientRow, RecipeIngredientValues, RecipeInstructionRow, RecipeInstructionValues,
    RecipeRow, RecipeValues,
};
use super::schema::{
    common_ingredients, ingredients, recipe_ingredients, recipe_instructions, recipes,
};
use super::{Connection, Error, Result};
use crate::enums::MealType;
use crate::models::{
    CommonIngredient, CommonIngredientId, Ingredient, IngredientHandle, IngredientId, Recipe,
    RecipeHandle, RecipeId, RecipeIngredient, RecipeIngredientId, RecipeInstruction,
    RecipeInstructionId,
};
use crate::validation::Validate as _;
use chrono::NaiveDateTime;
use diesel::expression_methods::EscapeExpressionMethods as _;
use diesel::prelude::Connection as _;
use diesel::BelongingToDsl as _;
use diesel::ExpressionMethods as _;
use diesel::OptionalExtension as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use diesel::TextExpressionMethods as _;

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Inserts the ingredient if it has no id yet, otherwise updates it. Its recipe usages are not
/// written, those belong to the recipes.
pub fn save_ingredient(conn: &mut Connection, ingredient: &mut Ingredient) -> Result<()> {
    ingredient.check()?;

    let now = now();
    let values = IngredientValues::new(ingredient)?;
    match ingredient.id() {
        None => {
            let new_id: IngredientId = diesel::insert_into(ingredients::table)
                .values((
                    &values,
                    ingredients::created_at.eq(now),
                    ingredients::updated_at.eq(now),
                ))
                .returning(ingredients::id)
                .get_result(conn)?;
            log::debug!("inserted ingredient {new_id} {:?}", ingredient.name());
            ingredient.set_id(new_id);
            ingredient.set_created_at(now);
        }
        Some(existing) => {
            let count = diesel::update(ingredients::table.find(existing))
                .set((&values, ingredients::updated_at.eq(now)))
                .execute(conn)?;
            if count == 0 {
                return Err(Error::NotFound {
                    entity: "ingredient",
                    id: existing.get(),
                });
            }
        }
    }
    ingredient.set_updated_at(now);
    Ok(())
}

/// The ingredient along with every recipe that uses it.
pub fn load_ingredient(conn: &mut Connection, ingredient_id: IngredientId) -> Result<Ingredient> {
    let row = ingredients::table
        .find(ingredient_id)
        .select(IngredientRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound {
            entity: "ingredient",
            id: ingredient_id.get(),
        })?;

    let usages: Vec<(RecipeIngredientRow, (RecipeId, String))> =
        RecipeIngredientRow::belonging_to(&row)
            .inner_join(recipes::table)
            .select((
                RecipeIngredientRow::as_select(),
                (recipes::id, recipes::name),
            ))
            .order(recipe_ingredients::id.asc())
            .load(conn)?;

    let mut ingredient = row.into_ingredient()?;
    for (usage, (recipe_id, recipe_name)) in usages {
        let mut usage = usage.into_recipe_ingredient()?;
        usage.set_recipe(Some(RecipeHandle::new(recipe_id, recipe_name)));
        ingredient.add_recipe_ingredient(usage);
    }
    Ok(ingredient)
}

/// Looks an ingredient up by its normalized name, falling back to a case-insensitive match on
/// its display name. Recipe usages are not loaded.
pub fn find_ingredient_by_name(conn: &mut Connection, name: &str) -> Result<Option<Ingredient>> {
    let normalized = Ingredient::normalize_name(name);
    if normalized.is_empty() {
        return Ok(None);
    }

    let mut row = ingredients::table
        .filter(ingredients::normalized_name.eq(&normalized))
        .select(IngredientRow::as_select())
        .order(ingredients::id.asc())
        .first(conn)
        .optional()?;

    if row.is_none() {
        // sqlite's LIKE ignores ASCII case
        row = ingredients::table
            .filter(ingredients::name.like(escape_like(name.trim())).escape('\\'))
            .select(IngredientRow::as_select())
            .order(ingredients::id.asc())
            .first(conn)
            .optional()?;
    }

    row.map(IngredientRow::into_ingredient).transpose()
}

/// Every ingredient, by name. Recipe usages are not loaded.
pub fn list_ingredients(conn: &mut Connection) -> Result<Vec<Ingredient>> {
    ingredients::table
        .select(IngredientRow::as_select())
        .order((ingredients::name.asc(), ingredients::id.asc()))
        .load(conn)?
        .into_iter()
        .map(IngredientRow::into_ingredient)
        .collect()
}

/// Deletes the ingredient, every recipe's use of it, and its common-ingredient entry.
pub fn delete_ingredient(conn: &mut Connection, ingredient_id: IngredientId) -> Result<()> {
    conn.transaction(|conn| {
        let usages = diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::ingredient_id.eq(ingredient_id)),
        )
        .execute(conn)?;
        diesel::delete(
            common_ingredients::table.filter(common_ingredients::ingredient_id.eq(ingredient_id)),
        )
        .execute(conn)?;

        let count = diesel::delete(ingredients::table.find(ingredient_id)).execute(conn)?;
        if count == 0 {
            return Err(Error::NotFound {
                entity: "ingredient",
                id: ingredient_id.get(),
            });
        }
        log::info!("deleted ingredient {ingredient_id} and {usages} recipe usages");
        Ok(())
    })
}

fn write_recipe(conn: &mut Connection, recipe: &Recipe, now: NaiveDateTime) -> Result<RecipeId> {
    let values = RecipeValues::new(recipe)?;
    match recipe.id() {
        None => Ok(diesel::insert_into(recipes::table)
            .values((
                &values,
                recipes::created_at.eq(now),
                recipes::updated_at.eq(now),
            ))
            .returning(recipes::id)
            .get_result(conn)?),
        Some(existing) => {
            let count = diesel::update(recipes::table.find(existing))
                .set((&values, recipes::updated_at.eq(now)))
                .execute(conn)?;
            if count == 0 {
                return Err(Error::NotFound {
                    entity: "recipe",
                    id: existing.get(),
                });
            }
            Ok(existing)
        }
    }
}

fn write_instructions(
    conn: &mut Connection,
    recipe_id: RecipeId,
    instructions: &[RecipeInstruction],
) -> Result<Vec<RecipeInstructionId>> {
    let mut ids = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        let values = RecipeInstructionValues::new(recipe_id, instruction);
        let id = match instruction.id() {
            None => diesel::insert_into(recipe_instructions::table)
                .values(&values)
                .returning(recipe_instructions::id)
                .get_result(conn)?,
            Some(existing) => {
                let count = diesel::update(recipe_instructions::table.find(existing))
                    .set(&values)
                    .execute(conn)?;
                if count == 0 {
                    return Err(Error::NotFound {
                        entity: "recipe instruction",
                        id: existing.get(),
                    });
                }
                existing
            }
        };
        ids.push(id);
    }

    let orphans = diesel::delete(
        recipe_instructions::table
            .filter(recipe_instructions::recipe_id.eq(recipe_id))
            .filter(recipe_instructions::id.ne_all(ids.clone())),
    )
    .execute(conn)?;
    if orphans > 0 {
        log::debug!("removed {orphans} instructions from recipe {recipe_id}");
    }
    Ok(ids)
}

fn write_recipe_ingredients(
    conn: &mut Connection,
    recipe_id: RecipeId,
    usages: &[RecipeIngredient],
) -> Result<Vec<RecipeIngredientId>> {
    let mut ids = Vec::with_capacity(usages.len());
    for usage in usages {
        let values = RecipeIngredientValues::new(recipe_id, usage)?;
        let id = match usage.id() {
            None => diesel::insert_into(recipe_ingredients::table)
                .values(&values)
                .returning(recipe_ingredients::id)
                .get_result(conn)?,
            Some(existing) => {
                let count = diesel::update(recipe_ingredients::table.find(existing))
                    .set(&values)
                    .execute(conn)?;
                if count == 0 {
                    return Err(Error::NotFound {
                        entity: "recipe ingredient",
                        id: existing.get(),
                    });
                }
                existing
            }
        };
        ids.push(id);
    }

    let orphans = diesel::delete(
        recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .filter(recipe_ingredients::id.ne_all(ids.clone())),
    )
    .execute(conn)?;
    if orphans > 0 {
        log::debug!("removed {orphans} ingredients from recipe {recipe_id}");
    }
    Ok(ids)
}

/// Writes the recipe and all of its children in one transaction.
///
/// Children without an id are inserted, the rest are updated, and any stored child that is no
/// longer in the recipe is deleted. Every ingredient the recipe uses must already be saved. On
/// success the recipe and its children have their ids and timestamps filled in; on failure
/// nothing is written and the recipe is left untouched.
pub fn save_recipe(conn: &mut Connection, recipe: &mut Recipe) -> Result<()> {
    recipe.check_all()?;

    let now = now();
    let (recipe_id, instruction_ids, ingredient_ids) = conn.transaction(|conn| {
        let recipe_id = write_recipe(conn, recipe, now)?;
        let instruction_ids = write_instructions(conn, recipe_id, recipe.instructions())?;
        let ingredient_ids = write_recipe_ingredients(conn, recipe_id, recipe.ingredients())?;
        Ok::<_, Error>((recipe_id, instruction_ids, ingredient_ids))
    })?;

    if recipe.id().is_none() {
        recipe.set_created_at(now);
        log::info!("created recipe {recipe_id} {:?}", recipe.name());
    }
    recipe.set_updated_at(now);
    recipe.set_id(recipe_id);
    for (instruction, id) in recipe.instructions_mut().iter_mut().zip(instruction_ids) {
        instruction.set_id(id);
    }
    for (usage, id) in recipe.ingredients_mut().iter_mut().zip(ingredient_ids) {
        usage.set_id(id);
    }
    Ok(())
}

/// The recipe with its instructions in step order (unordered steps last) and its ingredients in
/// the order they were added.
pub fn load_recipe(conn: &mut Connection, recipe_id: RecipeId) -> Result<Recipe> {
    let row = recipes::table
        .find(recipe_id)
        .select(RecipeRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound {
            entity: "recipe",
            id: recipe_id.get(),
        })?;

    let instructions: Vec<RecipeInstructionRow> = RecipeInstructionRow::belonging_to(&row)
        .select(RecipeInstructionRow::as_select())
        .order((
            recipe_instructions::step_order.is_null(),
            recipe_instructions::step_order.asc(),
            recipe_instructions::id.asc(),
        ))
        .load(conn)?;

    let usages: Vec<(RecipeIngredientRow, (IngredientId, String))> =
        RecipeIngredientRow::belonging_to(&row)
            .inner_join(ingredients::table)
            .select((
                RecipeIngredientRow::as_select(),
                (ingredients::id, ingredients::name),
            ))
            .order(recipe_ingredients::id.asc())
            .load(conn)?;

    let mut recipe = row.into_recipe()?;
    for instruction in instructions {
        recipe.add_instruction(instruction.into_instruction());
    }
    for (usage, (ingredient_id, ingredient_name)) in usages {
        let mut usage = usage.into_recipe_ingredient()?;
        usage.set_ingredient(Some(IngredientHandle::new(ingredient_id, ingredient_name)));
        recipe.add_ingredient(usage);
    }
    Ok(recipe)
}

/// Recipes by name, optionally only those for one kind of meal.
pub fn list_recipes(
    conn: &mut Connection,
    meal_type: Option<MealType>,
) -> Result<Vec<RecipeHandle>> {
    let mut query = recipes::table
        .select((recipes::id, recipes::name))
        .order((recipes::name.asc(), recipes::id.asc()))
        .into_boxed();
    if let Some(meal_type) = meal_type {
        query = query.filter(recipes::meal_type.eq(meal_type));
    }

    let rows: Vec<(RecipeId, String)> = query.load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, name)| RecipeHandle::new(id, name))
        .collect())
}

/// Deletes the recipe along with its instructions and ingredient usages.
pub fn delete_recipe(conn: &mut Connection, recipe_id: RecipeId) -> Result<()> {
    conn.transaction(|conn| {
        diesel::delete(
            recipe_instructions::table.filter(recipe_instructions::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?;
        diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?;

        let count = diesel::delete(recipes::table.find(recipe_id)).execute(conn)?;
        if count == 0 {
            return Err(Error::NotFound {
                entity: "recipe",
                id: recipe_id.get(),
            });
        }
        log::info!("deleted recipe {recipe_id}");
        Ok(())
    })
}

fn mark_common(conn: &mut Connection, ingredient_id: IngredientId) -> Result<()> {
    diesel::update(ingredients::table.find(ingredient_id))
        .set(ingredients::is_common.eq(true))
        .execute(conn)?;
    Ok(())
}

/// Inserts or updates the entry. Its ingredient is marked common either way.
pub fn save_common_ingredient(conn: &mut Connection, common: &mut CommonIngredient) -> Result<()> {
    common.check()?;

    let values = CommonIngredientValues::new(common)?;
    let now = now();
    let new_id = conn.transaction(|conn| {
        let new_id = match common.id() {
            None => Some(
                diesel::insert_into(common_ingredients::table)
                    .values((&values, common_ingredients::created_at.eq(now)))
                    .returning(common_ingredients::id)
                    .get_result::<CommonIngredientId>(conn)?,
            ),
            Some(existing) => {
                let count = diesel::update(common_ingredients::table.find(existing))
                    .set(&values)
                    .execute(conn)?;
                if count == 0 {
                    return Err(Error::NotFound {
                        entity: "common ingredient",
                        id: existing.get(),
                    });
                }
                None
            }
        };
        mark_common(conn, values.ingredient_id)?;
        Ok(new_id)
    })?;

    if let Some(new_id) = new_id {
        common.set_id(new_id);
        common.set_created_at(now);
    }
    Ok(())
}

/// Common ingredients, most popular first.
pub fn list_common_ingredients(conn: &mut Connection) -> Result<Vec<CommonIngredient>> {
    let rows: Vec<(CommonIngredientRow, (IngredientId, String))> = common_ingredients::table
        .inner_join(ingredients::table)
        .select((
            CommonIngredientRow::as_select(),
            (ingredients::id, ingredients::name),
        ))
        .order((
            common_ingredients::popularity_score.desc(),
            ingredients::name.asc(),
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(row, (id, name))| row.into_common_ingredient(IngredientHandle::new(id, name)))
        .collect())
}

/// Bumps the ingredient's popularity by one and returns the new score. An ingredient used for
/// the first time becomes common.
pub fn increment_popularity(conn: &mut Connection, ingredient_id: IngredientId) -> Result<i32> {
    conn.transaction(|conn| {
        let count = diesel::update(
            common_ingredients::table.filter(common_ingredients::ingredient_id.eq(ingredient_id)),
        )
        .set(common_ingredients::popularity_score.eq(common_ingredients::popularity_score + 1))
        .execute(conn)?;

        if count == 0 {
            let exists: i64 = ingredients::table
                .find(ingredient_id)
                .count()
                .get_result(conn)?;
            if exists == 0 {
                return Err(Error::NotFound {
                    entity: "ingredient",
                    id: ingredient_id.get(),
                });
            }

            diesel::insert_into(common_ingredients::table)
                .values((
                    common_ingredients::ingredient_id.eq(ingredient_id),
                    common_ingredients::popularity_score.eq(1),
                    common_ingredients::created_at.eq(now()),
                ))
                .execute(conn)?;
            mark_common(conn, ingredient_id)?;
            log::debug!("ingredient {ingredient_id} is now common");
        }

        Ok(common_ingredients::table
            .filter(common_ingredients::ingredient_id.eq(ingredient_id))
            .select(common_ingredients::popularity_score)
            .first::<i32>(conn)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::establish_connection;
    use crate::enums::{Difficulty, IngredientCategory};
    use crate::models::NutritionalInfo;
    use diesel::QueryDsl as _;
    use diesel::RunQueryDsl as _;
    use maplit::btreeset;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn connection() -> Connection {
        establish_connection(":memory:").unwrap()
    }

    fn saved_ingredient(conn: &mut Connection, name: &str) -> Ingredient {
        let mut ingredient = Ingredient::builder()
            .name(name)
            .normalized_name(Ingredient::normalize_name(name))
            .build();
        save_ingredient(conn, &mut ingredient).unwrap();
        ingredient
    }

    fn pancakes(flour: &Ingredient, milk: &Ingredient) -> Recipe {
        let mut recipe = Recipe::builder()
            .name("Pancakes")
            .description("Fluffy")
            .meal_type(MealType::Breakfast)
            .difficulty(Difficulty::Easy)
            .cooking_time_minutes(20)
            .servings(4)
            .nutritional_info(NutritionalInfo::builder().calories(350).protein(9).build())
            .tags(["sweet", "quick"])
            .build();
        recipe.add_instruction(
            RecipeInstruction::builder()
                .step_number(2)
                .step_order(2)
                .description("Fry")
                .build(),
        );
        recipe.add_instruction(
            RecipeInstruction::builder()
                .description("Serve warm")
                .build(),
        );
        recipe.add_instruction(
            RecipeInstruction::builder()
                .step_number(1)
                .step_order(1)
                .description("Whisk")
                .build(),
        );
        recipe.add_ingredient(
            RecipeIngredient::builder()
                .ingredient(flour)
                .quantity(dec!(1.5))
                .unit("cup")
                .step_order(1)
                .build(),
        );
        recipe.add_ingredient(
            RecipeIngredient::builder()
                .ingredient(milk)
                .quantity(dec!(0.333))
                .unit("liter")
                .required(false)
                .build(),
        );
        recipe
    }

    fn descriptions(recipe: &Recipe) -> Vec<&str> {
        recipe
            .instructions()
            .iter()
            .map(RecipeInstruction::description)
            .collect()
    }

    fn ingredient_names(recipe: &Recipe) -> BTreeSet<String> {
        recipe
            .ingredients()
            .iter()
            .filter_map(|i| i.ingredient().map(|h| h.name.clone()))
            .collect()
    }

    #[test]
    fn ingredient_round_trip() {
        let mut conn = connection();
        let mut ingredient = Ingredient::builder()
            .name("Flour")
            .normalized_name("flour")
            .category(IngredientCategory::Grain)
            .common_units(["cup", "gram"])
            .build();
        save_ingredient(&mut conn, &mut ingredient).unwrap();

        let id = ingredient.id().unwrap();
        let created_at = ingredient.created_at().unwrap();
        assert_eq!(ingredient.updated_at(), Some(created_at));

        let loaded = load_ingredient(&mut conn, id).unwrap();
        assert_eq!(loaded, ingredient);
        assert_eq!(loaded.name(), "Flour");
        assert_eq!(loaded.normalized_name(), Some("flour"));
        assert_eq!(loaded.category(), Some(IngredientCategory::Grain));
        assert_eq!(
            loaded.common_units(),
            Some(&["cup".to_owned(), "gram".to_owned()][..])
        );
        assert!(!loaded.is_common());
        assert!(loaded.recipe_ingredients().is_empty());

        ingredient.set_category(None);
        ingredient.set_common_units(None);
        save_ingredient(&mut conn, &mut ingredient).unwrap();
        assert_eq!(ingredient.id(), Some(id));
        assert!(ingredient.updated_at().unwrap() >= created_at);

        let loaded = load_ingredient(&mut conn, id).unwrap();
        assert_eq!(loaded.category(), None);
        assert_eq!(loaded.common_units(), None);
        assert_eq!(loaded.created_at(), Some(created_at));
    }

    #[test]
    fn invalid_ingredient_is_not_saved() {
        let mut conn = connection();
        let mut ingredient = Ingredient::builder().name("  ").build();
        match save_ingredient(&mut conn, &mut ingredient) {
            Err(Error::Validation(e)) => assert!(e.has_violation_for("name")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ingredient.id(), None);
        assert!(list_ingredients(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn missing_rows() {
        let mut conn = connection();
        assert!(matches!(
            load_recipe(&mut conn, RecipeId::new(7)),
            Err(Error::NotFound { entity: "recipe", id: 7 })
        ));
        assert!(matches!(
            load_ingredient(&mut conn, IngredientId::new(3)),
            Err(Error::NotFound { entity: "ingredient", id: 3 })
        ));
        assert!(matches!(
            delete_recipe(&mut conn, RecipeId::new(7)),
            Err(Error::NotFound { .. })
        ));

        let mut ingredient = Ingredient::builder()
            .id(IngredientId::new(3))
            .name("Ghost")
            .build();
        assert!(matches!(
            save_ingredient(&mut conn, &mut ingredient),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn recipe_round_trip() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");

        let mut recipe = pancakes(&flour, &milk);
        save_recipe(&mut conn, &mut recipe).unwrap();

        let id = recipe.id().unwrap();
        assert!(recipe.created_at().is_some());
        assert_eq!(recipe.updated_at(), recipe.created_at());
        assert!(recipe.instructions().iter().all(|i| i.id().is_some()));
        assert!(recipe.ingredients().iter().all(|i| i.id().is_some()));
        assert!(recipe
            .instructions()
            .iter()
            .all(|i| i.recipe().and_then(|r| r.id) == Some(id)));
        assert!(recipe
            .ingredients()
            .iter()
            .all(|i| i.recipe().and_then(|r| r.id) == Some(id)));

        let loaded = load_recipe(&mut conn, id).unwrap();
        assert_eq!(loaded, recipe);
        assert_eq!(loaded.name(), "Pancakes");
        assert_eq!(loaded.description(), Some("Fluffy"));
        assert_eq!(loaded.meal_type(), Some(MealType::Breakfast));
        assert_eq!(loaded.difficulty(), Some(Difficulty::Easy));
        assert_eq!(loaded.cooking_time_minutes(), Some(20));
        assert_eq!(loaded.servings(), Some(4));
        assert_eq!(
            loaded.nutritional_info(),
            Some(&NutritionalInfo::builder().calories(350).protein(9).build())
        );
        assert_eq!(
            loaded.tags(),
            Some(&["sweet".to_owned(), "quick".to_owned()][..])
        );
        assert_eq!(loaded.created_at(), recipe.created_at());

        assert_eq!(descriptions(&loaded), ["Whisk", "Fry", "Serve warm"]);
        assert_eq!(
            ingredient_names(&loaded),
            btreeset! {"Flour".to_owned(), "Milk".to_owned()}
        );

        let milk_usage = loaded
            .ingredients()
            .iter()
            .find(|i| i.ingredient().and_then(|h| h.id) == milk.id())
            .unwrap();
        assert_eq!(milk_usage.quantity(), Some(dec!(0.33)));
        assert_eq!(milk_usage.unit(), Some("liter"));
        assert!(!milk_usage.is_required());
        assert_eq!(milk_usage.step_order(), None);
    }

    #[test]
    fn recipe_without_nutrition_or_tags() {
        let mut conn = connection();
        let mut recipe = Recipe::builder()
            .name("Toast")
            .meal_type(MealType::Snack)
            .build();
        save_recipe(&mut conn, &mut recipe).unwrap();

        let loaded = load_recipe(&mut conn, recipe.id().unwrap()).unwrap();
        assert_eq!(loaded.nutritional_info(), None);
        assert_eq!(loaded.tags(), None);
        assert_eq!(loaded.difficulty(), None);
        assert!(loaded.instructions().is_empty());
        assert!(loaded.ingredients().is_empty());
    }

    #[test]
    fn resave_updates_and_removes_orphans() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");

        let mut recipe = pancakes(&flour, &milk);
        save_recipe(&mut conn, &mut recipe).unwrap();
        let id = recipe.id().unwrap();
        let created_at = recipe.created_at();

        let fry = recipe.instructions()[0].clone();
        assert!(recipe.remove_instruction(&fry).is_some());
        let milk_usage = recipe.ingredients()[1].clone();
        let removed = recipe.remove_ingredient(&milk_usage).unwrap();
        assert_eq!(removed.recipe(), None);

        recipe.set_name("Crepes");
        recipe.add_instruction(
            RecipeInstruction::builder()
                .step_number(3)
                .step_order(3)
                .description("Fold")
                .build(),
        );
        save_recipe(&mut conn, &mut recipe).unwrap();
        assert_eq!(recipe.id(), Some(id));
        assert_eq!(recipe.created_at(), created_at);

        let loaded = load_recipe(&mut conn, id).unwrap();
        assert_eq!(loaded.name(), "Crepes");
        assert_eq!(descriptions(&loaded), ["Whisk", "Fold", "Serve warm"]);
        assert_eq!(ingredient_names(&loaded), btreeset! {"Flour".to_owned()});
        assert!(loaded
            .instructions()
            .iter()
            .all(|i| i.recipe().map(|r| r.name.as_str()) == Some("Crepes")));

        let stored_instructions: i64 = recipe_instructions::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_instructions, 3);
        let stored_usages: i64 = recipe_ingredients::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_usages, 1);
    }

    #[test]
    fn removing_every_child_clears_stored_rows() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");

        let mut recipe = pancakes(&flour, &milk);
        save_recipe(&mut conn, &mut recipe).unwrap();
        let id = recipe.id().unwrap();

        for instruction in recipe.instructions().to_vec() {
            assert!(recipe.remove_instruction(&instruction).is_some());
        }
        for usage in recipe.ingredients().to_vec() {
            assert!(recipe.remove_ingredient(&usage).is_some());
        }
        save_recipe(&mut conn, &mut recipe).unwrap();

        let loaded = load_recipe(&mut conn, id).unwrap();
        assert!(loaded.instructions().is_empty());
        assert!(loaded.ingredients().is_empty());

        let stored_instructions: i64 = recipe_instructions::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_instructions, 0);
        let stored_usages: i64 = recipe_ingredients::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_usages, 0);
    }

    #[test]
    fn quantities_round_half_away_from_zero_and_reload_valid() {
        let mut conn = connection();
        let salt = saved_ingredient(&mut conn, "Salt");

        let mut recipe = Recipe::builder()
            .name("Brine")
            .meal_type(MealType::Snack)
            .build();
        recipe.add_ingredient(
            RecipeIngredient::builder()
                .ingredient(&salt)
                .quantity(dec!(0.125))
                .unit("cup")
                .build(),
        );
        save_recipe(&mut conn, &mut recipe).unwrap();

        let mut loaded = load_recipe(&mut conn, recipe.id().unwrap()).unwrap();
        assert_eq!(loaded.ingredients()[0].quantity(), Some(dec!(0.13)));
        save_recipe(&mut conn, &mut loaded).unwrap();
        let reloaded = load_recipe(&mut conn, recipe.id().unwrap()).unwrap();
        assert_eq!(reloaded.ingredients()[0].quantity(), Some(dec!(0.13)));
    }

    #[test]
    fn sub_cent_quantity_is_rejected() {
        let mut conn = connection();
        let salt = saved_ingredient(&mut conn, "Salt");

        let mut recipe = Recipe::builder()
            .name("Pinch")
            .meal_type(MealType::Snack)
            .build();
        recipe.add_ingredient(
            RecipeIngredient::builder()
                .ingredient(&salt)
                .quantity(dec!(0.004))
                .build(),
        );
        match save_recipe(&mut conn, &mut recipe) {
            Err(Error::Validation(e)) => {
                assert_eq!(e.entity(), "recipe ingredient");
                assert!(e.has_violation_for("quantity"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(list_recipes(&mut conn, None).unwrap().is_empty());
    }

    #[test]
    fn enums_are_stored_by_name() {
        let mut conn = connection();
        let mut recipe = Recipe::builder()
            .name("Porridge")
            .meal_type(MealType::Breakfast)
            .difficulty(Difficulty::Medium)
            .build();
        save_recipe(&mut conn, &mut recipe).unwrap();
        let mut oil = Ingredient::builder()
            .name("Olive Oil")
            .category(IngredientCategory::CookingOil)
            .build();
        save_ingredient(&mut conn, &mut oil).unwrap();

        let stored: (String, Option<String>) = recipes::table
            .select((
                diesel::dsl::sql::<diesel::sql_types::Text>("meal_type"),
                diesel::dsl::sql::<diesel::sql_types::Nullable<diesel::sql_types::Text>>(
                    "difficulty",
                ),
            ))
            .first(&mut conn)
            .unwrap();
        assert_eq!(stored, ("BREAKFAST".to_owned(), Some("MEDIUM".to_owned())));

        let category: Option<String> = ingredients::table
            .select(diesel::dsl::sql::<diesel::sql_types::Nullable<diesel::sql_types::Text>>(
                "category",
            ))
            .first(&mut conn)
            .unwrap();
        assert_eq!(category.as_deref(), Some("COOKING_OIL"));
    }

    #[test]
    fn invalid_recipe_writes_nothing() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");

        let mut recipe = pancakes(&flour, &milk);
        recipe.add_instruction(RecipeInstruction::builder().step_number(-1).build());
        match save_recipe(&mut conn, &mut recipe) {
            Err(Error::Validation(e)) => {
                assert_eq!(e.entity(), "recipe instruction");
                assert!(e.has_violation_for("stepNumber"));
                assert!(e.has_violation_for("description"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(recipe.id(), None);
        assert!(list_recipes(&mut conn, None).unwrap().is_empty());

        let mut recipe = Recipe::builder().name("Nameless meal").build();
        match save_recipe(&mut conn, &mut recipe) {
            Err(Error::Validation(e)) => assert!(e.has_violation_for("mealType")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(list_recipes(&mut conn, None).unwrap().is_empty());
    }

    #[test]
    fn unsaved_ingredient_rolls_back() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let butter = Ingredient::builder().name("Butter").build();

        let mut recipe = pancakes(&flour, &butter);
        assert!(matches!(
            save_recipe(&mut conn, &mut recipe),
            Err(Error::UnsavedIngredient { name }) if name == "Butter"
        ));
        assert_eq!(recipe.id(), None);
        assert!(recipe.instructions().iter().all(|i| i.id().is_none()));
        assert!(list_recipes(&mut conn, None).unwrap().is_empty());

        let stored_instructions: i64 = recipe_instructions::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_instructions, 0);
    }

    #[test]
    fn load_ingredient_with_usages() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");
        let mut recipe = pancakes(&flour, &milk);
        save_recipe(&mut conn, &mut recipe).unwrap();

        let loaded = load_ingredient(&mut conn, flour.id().unwrap()).unwrap();
        let usages = loaded.recipe_ingredients();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].recipe(), Some(&recipe.handle()));
        assert_eq!(usages[0].ingredient(), Some(&flour.handle()));
        assert_eq!(usages[0].quantity(), Some(dec!(1.5)));
    }

    #[test]
    fn delete_recipe_cascades() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");
        let mut recipe = pancakes(&flour, &milk);
        save_recipe(&mut conn, &mut recipe).unwrap();
        let id = recipe.id().unwrap();

        delete_recipe(&mut conn, id).unwrap();
        assert!(matches!(
            load_recipe(&mut conn, id),
            Err(Error::NotFound { .. })
        ));

        let stored_instructions: i64 = recipe_instructions::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_instructions, 0);
        let stored_usages: i64 = recipe_ingredients::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(stored_usages, 0);

        assert_eq!(list_ingredients(&mut conn).unwrap().len(), 2);
    }

    #[test]
    fn delete_ingredient_cascades() {
        let mut conn = connection();
        let flour = saved_ingredient(&mut conn, "Flour");
        let milk = saved_ingredient(&mut conn, "Milk");
        let mut recipe = pancakes(&flour, &milk);
        save_recipe(&mut conn, &mut recipe).unwrap();
        increment_popularity(&mut conn, milk.id().unwrap()).unwrap();

        delete_ingredient(&mut conn, milk.id().unwrap()).unwrap();

        let loaded = load_recipe(&mut conn, recipe.id().unwrap()).unwrap();
        assert_eq!(ingredient_names(&loaded), btreeset! {"Flour".to_owned()});
        assert!(list_common_ingredients(&mut conn).unwrap().is_empty());
        assert!(matches!(
            delete_ingredient(&mut conn, milk.id().unwrap()),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn find_by_name() {
        let mut conn = connection();
        let sugar = saved_ingredient(&mut conn, "Brown Sugar");
        let mut oil = Ingredient::builder().name("Olive Oil").build();
        save_ingredient(&mut conn, &mut oil).unwrap();

        let found = find_ingredient_by_name(&mut conn, "  brown   SUGAR ").unwrap();
        assert_eq!(found, Some(sugar));

        let found = find_ingredient_by_name(&mut conn, "olive oil").unwrap();
        assert_eq!(found.as_ref().map(Ingredient::name), Some("Olive Oil"));

        assert_eq!(find_ingredient_by_name(&mut conn, "olive%").unwrap(), None);
        assert_eq!(find_ingredient_by_name(&mut conn, "Salt").unwrap(), None);
        assert_eq!(find_ingredient_by_name(&mut conn, "   ").unwrap(), None);
    }

    #[test]
    fn list_recipes_by_meal_type() {
        let mut conn = connection();
        for (name, meal_type) in [
            ("Waffles", MealType::Breakfast),
            ("Stew", MealType::Dinner),
            ("Omelette", MealType::Breakfast),
        ] {
            let mut recipe = Recipe::builder().name(name).meal_type(meal_type).build();
            save_recipe(&mut conn, &mut recipe).unwrap();
        }

        let names = |recipes: Vec<RecipeHandle>| -> Vec<String> {
            recipes.into_iter().map(|r| r.name).collect()
        };
        assert_eq!(
            names(list_recipes(&mut conn, None).unwrap()),
            ["Omelette", "Stew", "Waffles"]
        );
        assert_eq!(
            names(list_recipes(&mut conn, Some(MealType::Breakfast)).unwrap()),
            ["Omelette", "Waffles"]
        );
        assert!(list_recipes(&mut conn, Some(MealType::Dessert))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn ingredients_are_listed_by_name() {
        let mut conn = connection();
        saved_ingredient(&mut conn, "Salt");
        saved_ingredient(&mut conn, "Butter");
        saved_ingredient(&mut conn, "Milk");

        let names: Vec<String> = list_ingredients(&mut conn)
            .unwrap()
            .iter()
            .map(|i| i.name().to_owned())
            .collect();
        assert_eq!(names, ["Butter", "Milk", "Salt"]);
    }

    #[test]
    fn popularity() {
        let mut conn = connection();
        let salt = saved_ingredient(&mut conn, "Salt");
        let pepper = saved_ingredient(&mut conn, "Pepper");
        let salt_id = salt.id().unwrap();
        let pepper_id = pepper.id().unwrap();

        assert_eq!(increment_popularity(&mut conn, salt_id).unwrap(), 1);
        assert!(load_ingredient(&mut conn, salt_id).unwrap().is_common());
        assert_eq!(increment_popularity(&mut conn, pepper_id).unwrap(), 1);
        assert_eq!(increment_popularity(&mut conn, pepper_id).unwrap(), 2);

        let common = list_common_ingredients(&mut conn).unwrap();
        let ranking: Vec<(&str, i32)> = common
            .iter()
            .map(|c| (c.ingredient().unwrap().name.as_str(), c.popularity_score()))
            .collect();
        assert_eq!(ranking, [("Pepper", 2), ("Salt", 1)]);

        assert!(matches!(
            increment_popularity(&mut conn, IngredientId::new(99)),
            Err(Error::NotFound { entity: "ingredient", id: 99 })
        ));
    }

    #[test]
    fn common_ingredient_save() {
        let mut conn = connection();
        let basil = saved_ingredient(&mut conn, "Basil");

        let mut common = CommonIngredient::builder()
            .ingredient(&basil)
            .popularity_score(5)
            .build();
        save_common_ingredient(&mut conn, &mut common).unwrap();
        assert!(common.id().is_some());
        assert!(common.created_at().is_some());
        assert!(load_ingredient(&mut conn, basil.id().unwrap())
            .unwrap()
            .is_common());

        common.set_popularity_score(8);
        save_common_ingredient(&mut conn, &mut common).unwrap();
        let listed = list_common_ingredients(&mut conn).unwrap();
        assert_eq!(listed, [common.clone()]);
        assert_eq!(listed[0].popularity_score(), 8);

        let mut unsaved = CommonIngredient::builder()
            .ingredient(&Ingredient::builder().name("Thyme").build())
            .build();
        assert!(matches!(
            save_common_ingredient(&mut conn, &mut unsaved),
            Err(Error::UnsavedIngredient { .. })
        ));

        let mut negative = CommonIngredient::builder()
            .ingredient(&basil)
            .popularity_score(-1)
            .build();
        assert!(matches!(
            save_common_ingredient(&mut conn, &mut negative),
            Err(Error::Validation(_))
        ));
    }
}
