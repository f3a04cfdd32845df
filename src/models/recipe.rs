// Copyright 2023 Remi Bernotavicius

use super::{NutritionalInfo, RecipeHandle, RecipeId, RecipeIngredient, RecipeInstruction};
use crate::enums::{Difficulty, MealType};
use crate::validation::{ConstraintViolation, Constraints, Validate, ValidationError};
use chrono::NaiveDateTime;
use std::hash::{Hash, Hasher};

pub const MAX_NAME_LEN: usize = 255;

/// A dish, along with everything needed to cook it.
///
/// The recipe owns its ingredient usages and instructions. Removing one from the recipe and
/// saving deletes it.
#[derive(Debug, Default, Clone)]
pub struct Recipe {
    id: Option<RecipeId>,
    name: String,
    description: Option<String>,
    meal_type: Option<MealType>,
    cooking_time_minutes: Option<i32>,
    difficulty: Option<Difficulty>,
    servings: Option<i32>,
    nutritional_info: Option<NutritionalInfo>,
    tags: Option<Vec<String>>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
    ingredients: Vec<RecipeIngredient>,
    instructions: Vec<RecipeInstruction>,
}

impl Recipe {
    pub fn builder() -> RecipeBuilder {
        RecipeBuilder::default()
    }

    pub fn handle(&self) -> RecipeHandle {
        RecipeHandle::new(self.id, self.name.clone())
    }

    pub fn id(&self) -> Option<RecipeId> {
        self.id
    }

    pub fn set_id(&mut self, id: impl Into<Option<RecipeId>>) {
        self.id = id.into();
        self.relink();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.relink();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn meal_type(&self) -> Option<MealType> {
        self.meal_type
    }

    pub fn set_meal_type(&mut self, meal_type: impl Into<Option<MealType>>) {
        self.meal_type = meal_type.into();
    }

    pub fn cooking_time_minutes(&self) -> Option<i32> {
        self.cooking_time_minutes
    }

    pub fn set_cooking_time_minutes(&mut self, minutes: impl Into<Option<i32>>) {
        self.cooking_time_minutes = minutes.into();
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: impl Into<Option<Difficulty>>) {
        self.difficulty = difficulty.into();
    }

    pub fn servings(&self) -> Option<i32> {
        self.servings
    }

    pub fn set_servings(&mut self, servings: impl Into<Option<i32>>) {
        self.servings = servings.into();
    }

    pub fn nutritional_info(&self) -> Option<&NutritionalInfo> {
        self.nutritional_info.as_ref()
    }

    pub fn set_nutritional_info(&mut self, nutritional_info: impl Into<Option<NutritionalInfo>>) {
        self.nutritional_info = nutritional_info.into();
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn set_tags(&mut self, tags: Option<Vec<String>>) {
        self.tags = tags;
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    pub fn set_created_at(&mut self, created_at: impl Into<Option<NaiveDateTime>>) {
        self.created_at = created_at.into();
    }

    pub fn updated_at(&self) -> Option<NaiveDateTime> {
        self.updated_at
    }

    pub fn set_updated_at(&mut self, updated_at: impl Into<Option<NaiveDateTime>>) {
        self.updated_at = updated_at.into();
    }

    pub fn ingredients(&self) -> &[RecipeIngredient] {
        &self.ingredients
    }

    pub(crate) fn ingredients_mut(&mut self) -> &mut [RecipeIngredient] {
        &mut self.ingredients
    }

    pub fn instructions(&self) -> &[RecipeInstruction] {
        &self.instructions
    }

    pub(crate) fn instructions_mut(&mut self) -> &mut [RecipeInstruction] {
        &mut self.instructions
    }

    pub fn add_ingredient(&mut self, mut recipe_ingredient: RecipeIngredient) {
        recipe_ingredient.set_recipe(Some(self.handle()));
        self.ingredients.push(recipe_ingredient);
    }

    /// Returns the removed usage with its recipe cleared, or `None` if it wasn't in this recipe.
    pub fn remove_ingredient(
        &mut self,
        recipe_ingredient: &RecipeIngredient,
    ) -> Option<RecipeIngredient> {
        let index = self
            .ingredients
            .iter()
            .position(|i| i == recipe_ingredient)?;
        let mut removed = self.ingredients.remove(index);
        removed.set_recipe(None);
        Some(removed)
    }

    pub fn add_instruction(&mut self, mut instruction: RecipeInstruction) {
        instruction.set_recipe(Some(self.handle()));
        self.instructions.push(instruction);
    }

    /// Returns the removed step with its recipe cleared, or `None` if it wasn't in this recipe.
    pub fn remove_instruction(
        &mut self,
        instruction: &RecipeInstruction,
    ) -> Option<RecipeInstruction> {
        let index = self.instructions.iter().position(|i| i == instruction)?;
        let mut removed = self.instructions.remove(index);
        removed.set_recipe(None);
        Some(removed)
    }

    /// Checks the recipe and then each of its children, stopping at the first invalid one.
    pub fn check_all(&self) -> Result<(), ValidationError> {
        self.check()?;
        for instruction in &self.instructions {
            instruction.check()?;
        }
        for ingredient in &self.ingredients {
            ingredient.check()?;
        }
        Ok(())
    }

    fn relink(&mut self) {
        let handle = self.handle();
        for ingredient in &mut self.ingredients {
            ingredient.set_recipe(Some(handle.clone()));
        }
        for instruction in &mut self.instructions {
            instruction.set_recipe(Some(handle.clone()));
        }
    }

    fn same_values(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.meal_type == other.meal_type
            && self.cooking_time_minutes == other.cooking_time_minutes
            && self.difficulty == other.difficulty
            && self.servings == other.servings
            && self.nutritional_info == other.nutritional_info
            && self.tags == other.tags
            && self.ingredients == other.ingredients
            && self.instructions == other.instructions
    }
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.same_values(other),
            _ => false,
        }
    }
}

impl Eq for Recipe {}

impl Hash for Recipe {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        if self.id.is_none() {
            self.name.hash(state);
        }
    }
}

impl Validate for Recipe {
    const ENTITY: &'static str = "recipe";

    fn validate(&self) -> Vec<ConstraintViolation> {
        Constraints::new()
            .not_blank("name", &self.name, "Recipe name is required")
            .max_len(
                "name",
                Some(&self.name[..]),
                MAX_NAME_LEN,
                "Recipe name cannot exceed 255 characters",
            )
            .not_null("mealType", self.meal_type.as_ref(), "Meal type is required")
            .positive(
                "cookingTimeMinutes",
                self.cooking_time_minutes,
                "Cooking time must be positive",
            )
            .positive("servings", self.servings, "Servings must be positive")
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct RecipeBuilder {
    recipe: Recipe,
}

impl RecipeBuilder {
    pub fn id(mut self, id: RecipeId) -> Self {
        self.recipe.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.recipe.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.recipe.description = Some(description.into());
        self
    }

    pub fn meal_type(mut self, meal_type: impl Into<Option<MealType>>) -> Self {
        self.recipe.meal_type = meal_type.into();
        self
    }

    pub fn cooking_time_minutes(mut self, minutes: i32) -> Self {
        self.recipe.cooking_time_minutes = Some(minutes);
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.recipe.difficulty = Some(difficulty);
        self
    }

    pub fn servings(mut self, servings: i32) -> Self {
        self.recipe.servings = Some(servings);
        self
    }

    pub fn nutritional_info(mut self, nutritional_info: NutritionalInfo) -> Self {
        self.recipe.nutritional_info = Some(nutritional_info);
        self
    }

    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.recipe.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Recipe {
        self.recipe
    }
}
