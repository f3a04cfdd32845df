// Copyright 2023 Remi Bernotavicius

//! Row types for the tables in `schema`, and conversions to and from the entities in
//! `crate::models`.

use super::{Error, Result};
use crate::enums::{Difficulty, IngredientCategory, MealType};
use crate::models::{
    CommonIngredient, CommonIngredientId, Ingredient, IngredientHandle, IngredientId,
    NutritionalInfo, Recipe, RecipeId, RecipeIngredient, RecipeIngredientId, RecipeInstruction,
    RecipeInstructionId,
};
use crate::models::round_quantity;
use chrono::NaiveDateTime;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::{AsChangeset, Insertable};
use rust_decimal::Decimal;
use std::str::FromStr as _;

fn encode_list(list: Option<&[String]>) -> Result<Option<String>> {
    list.map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Malformed {
            column: "list",
            value: format!("{list:?}"),
            reason: e.to_string(),
        })
}

fn decode_list(column: &'static str, value: Option<String>) -> Result<Option<Vec<String>>> {
    value
        .map(|v| {
            serde_json::from_str(&v).map_err(|e| Error::Malformed {
                column,
                reason: e.to_string(),
                value: v,
            })
        })
        .transpose()
}

fn encode_quantity(quantity: Option<Decimal>) -> Option<String> {
    quantity.map(|q| round_quantity(q).to_string())
}

fn decode_quantity(value: Option<String>) -> Result<Option<Decimal>> {
    value
        .map(|v| {
            Decimal::from_str(&v).map_err(|e| Error::Malformed {
                column: "recipe_ingredients.quantity",
                reason: e.to_string(),
                value: v,
            })
        })
        .transpose()
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeRow {
    pub id: RecipeId,
    pub name: String,
    pub description: Option<String>,
    pub meal_type: MealType,
    pub cooking_time_minutes: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub servings: Option<i32>,
    pub nutritional_calories: Option<i32>,
    pub nutritional_protein: Option<i32>,
    pub nutritional_carbs: Option<i32>,
    pub nutritional_fat: Option<i32>,
    pub nutritional_fiber: Option<i32>,
    pub nutritional_sugar: Option<i32>,
    pub nutritional_sodium: Option<i32>,
    pub tags: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RecipeRow {
    /// The recipe without its ingredients or instructions.
    pub fn into_recipe(self) -> Result<Recipe> {
        let nutritional_info = NutritionalInfo::new(
            self.nutritional_calories,
            self.nutritional_protein,
            self.nutritional_carbs,
            self.nutritional_fat,
            self.nutritional_fiber,
            self.nutritional_sugar,
            self.nutritional_sodium,
        );

        let mut recipe = Recipe::builder()
            .id(self.id)
            .name(self.name)
            .meal_type(self.meal_type)
            .build();
        recipe.set_description(self.description);
        recipe.set_cooking_time_minutes(self.cooking_time_minutes);
        recipe.set_difficulty(self.difficulty);
        recipe.set_servings(self.servings);
        recipe.set_nutritional_info(nutritional_info.non_empty());
        recipe.set_tags(decode_list("recipes.tags", self.tags)?);
        recipe.set_created_at(self.created_at);
        recipe.set_updated_at(self.updated_at);
        Ok(recipe)
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeValues<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub meal_type: MealType,
    pub cooking_time_minutes: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub servings: Option<i32>,
    pub nutritional_calories: Option<i32>,
    pub nutritional_protein: Option<i32>,
    pub nutritional_carbs: Option<i32>,
    pub nutritional_fat: Option<i32>,
    pub nutritional_fiber: Option<i32>,
    pub nutritional_sugar: Option<i32>,
    pub nutritional_sodium: Option<i32>,
    pub tags: Option<String>,
}

impl<'a> RecipeValues<'a> {
    pub fn new(recipe: &'a Recipe) -> Result<Self> {
        let meal_type = recipe.meal_type().ok_or(Error::MissingField {
            entity: "recipe",
            field: "mealType",
        })?;
        let nutrition = recipe.nutritional_info().copied().unwrap_or_default();
        Ok(Self {
            name: recipe.name(),
            description: recipe.description(),
            meal_type,
            cooking_time_minutes: recipe.cooking_time_minutes(),
            difficulty: recipe.difficulty(),
            servings: recipe.servings(),
            nutritional_calories: nutrition.calories,
            nutritional_protein: nutrition.protein,
            nutritional_carbs: nutrition.carbs,
            nutritional_fat: nutrition.fat,
            nutritional_fiber: nutrition.fiber,
            nutritional_sugar: nutrition.sugar,
            nutritional_sodium: nutrition.sodium,
            tags: encode_list(recipe.tags())?,
        })
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IngredientRow {
    pub id: IngredientId,
    pub name: String,
    pub normalized_name: Option<String>,
    pub category: Option<IngredientCategory>,
    pub common_units: Option<String>,
    pub is_common: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl IngredientRow {
    /// The ingredient without its recipe usages.
    pub fn into_ingredient(self) -> Result<Ingredient> {
        let mut ingredient = Ingredient::builder()
            .id(self.id)
            .name(self.name)
            .common(self.is_common)
            .build();
        ingredient.set_normalized_name(self.normalized_name);
        ingredient.set_category(self.category);
        ingredient.set_common_units(decode_list("ingredients.common_units", self.common_units)?);
        ingredient.set_created_at(self.created_at);
        ingredient.set_updated_at(self.updated_at);
        Ok(ingredient)
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[diesel(treat_none_as_null = true)]
pub struct IngredientValues<'a> {
    pub name: &'a str,
    pub normalized_name: Option<&'a str>,
    pub category: Option<IngredientCategory>,
    pub common_units: Option<String>,
    pub is_common: bool,
}

impl<'a> IngredientValues<'a> {
    pub fn new(ingredient: &'a Ingredient) -> Result<Self> {
        Ok(Self {
            name: ingredient.name(),
            normalized_name: ingredient.normalized_name(),
            category: ingredient.category(),
            common_units: encode_list(ingredient.common_units())?,
            is_common: ingredient.is_common(),
        })
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(RecipeRow, foreign_key = recipe_id))]
#[diesel(table_name = crate::database::schema::recipe_instructions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeInstructionRow {
    pub id: RecipeInstructionId,
    pub recipe_id: RecipeId,
    pub step_number: Option<i32>,
    pub description: String,
    pub step_order: Option<i32>,
}

impl RecipeInstructionRow {
    pub fn into_instruction(self) -> RecipeInstruction {
        let mut instruction = RecipeInstruction::builder()
            .id(self.id)
            .description(self.description)
            .build();
        instruction.set_step_number(self.step_number);
        instruction.set_step_order(self.step_order);
        instruction
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::recipe_instructions)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeInstructionValues<'a> {
    pub recipe_id: RecipeId,
    pub step_number: Option<i32>,
    pub description: &'a str,
    pub step_order: Option<i32>,
}

impl<'a> RecipeInstructionValues<'a> {
    pub fn new(recipe_id: RecipeId, instruction: &'a RecipeInstruction) -> Self {
        Self {
            recipe_id,
            step_number: instruction.step_number(),
            description: instruction.description(),
            step_order: instruction.step_order(),
        }
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(RecipeRow, foreign_key = recipe_id))]
#[diesel(belongs_to(IngredientRow, foreign_key = ingredient_id))]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeIngredientRow {
    pub id: RecipeIngredientId,
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub is_required: bool,
    pub step_order: Option<i32>,
}

impl RecipeIngredientRow {
    /// The usage with neither of its back-references set.
    pub fn into_recipe_ingredient(self) -> Result<RecipeIngredient> {
        let mut usage = RecipeIngredient::builder()
            .id(self.id)
            .required(self.is_required)
            .build();
        usage.set_quantity(decode_quantity(self.quantity)?);
        usage.set_unit(self.unit);
        usage.set_step_order(self.step_order);
        Ok(usage)
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeIngredientValues<'a> {
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub quantity: Option<String>,
    pub unit: Option<&'a str>,
    pub is_required: bool,
    pub step_order: Option<i32>,
}

impl<'a> RecipeIngredientValues<'a> {
    pub fn new(recipe_id: RecipeId, usage: &'a RecipeIngredient) -> Result<Self> {
        Ok(Self {
            recipe_id,
            ingredient_id: saved_ingredient_id(usage.ingredient())?,
            quantity: encode_quantity(usage.quantity()),
            unit: usage.unit(),
            is_required: usage.is_required(),
            step_order: usage.step_order(),
        })
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Clone)]
#[diesel(belongs_to(IngredientRow, foreign_key = ingredient_id))]
#[diesel(table_name = crate::database::schema::common_ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CommonIngredientRow {
    pub id: CommonIngredientId,
    pub ingredient_id: IngredientId,
    pub popularity_score: i32,
    pub created_at: NaiveDateTime,
}

impl CommonIngredientRow {
    pub fn into_common_ingredient(self, ingredient: IngredientHandle) -> CommonIngredient {
        let mut common = CommonIngredient::builder()
            .id(self.id)
            .popularity_score(self.popularity_score)
            .build();
        common.set_ingredient(Some(ingredient));
        common.set_created_at(self.created_at);
        common
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::database::schema::common_ingredients)]
pub struct CommonIngredientValues {
    pub ingredient_id: IngredientId,
    pub popularity_score: i32,
}

impl CommonIngredientValues {
    pub fn new(common: &CommonIngredient) -> Result<Self> {
        Ok(Self {
            ingredient_id: saved_ingredient_id(common.ingredient())?,
            popularity_score: common.popularity_score(),
        })
    }
}

fn saved_ingredient_id(handle: Option<&IngredientHandle>) -> Result<IngredientId> {
    match handle {
        Some(IngredientHandle { id: Some(id), .. }) => Ok(*id),
        Some(IngredientHandle { id: None, name }) => Err(Error::UnsavedIngredient {
            name: name.clone(),
        }),
        None => Err(Error::MissingField {
            entity: "recipe ingredient",
            field: "ingredient",
        }),
    }
}
