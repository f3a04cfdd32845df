// Copyright 2023 Remi Bernotavicius

use super::{IngredientHandle, IngredientId, RecipeIngredient};
use crate::enums::IngredientCategory;
use crate::validation::{ConstraintViolation, Constraints, Validate};
use chrono::NaiveDateTime;
use std::hash::{Hash, Hasher};

pub const MAX_NAME_LEN: usize = 255;

/// Something that goes into recipes. The same ingredient is shared by every recipe that uses it.
#[derive(Debug, Default, Clone)]
pub struct Ingredient {
    id: Option<IngredientId>,
    name: String,
    normalized_name: Option<String>,
    category: Option<IngredientCategory>,
    common_units: Option<Vec<String>>,
    is_common: bool,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
    recipe_ingredients: Vec<RecipeIngredient>,
}

impl Ingredient {
    pub fn builder() -> IngredientBuilder {
        IngredientBuilder::default()
    }

    /// The form ingredient names are matched on: lower case with runs of whitespace collapsed.
    pub fn normalize_name(name: &str) -> String {
        name.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn handle(&self) -> IngredientHandle {
        IngredientHandle::new(self.id, self.name.clone())
    }

    pub fn id(&self) -> Option<IngredientId> {
        self.id
    }

    pub fn set_id(&mut self, id: impl Into<Option<IngredientId>>) {
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

    pub fn normalized_name(&self) -> Option<&str> {
        self.normalized_name.as_deref()
    }

    pub fn set_normalized_name(&mut self, normalized_name: Option<String>) {
        self.normalized_name = normalized_name;
    }

    pub fn category(&self) -> Option<IngredientCategory> {
        self.category
    }

    pub fn set_category(&mut self, category: impl Into<Option<IngredientCategory>>) {
        self.category = category.into();
    }

    pub fn common_units(&self) -> Option<&[String]> {
        self.common_units.as_deref()
    }

    pub fn set_common_units(&mut self, common_units: Option<Vec<String>>) {
        self.common_units = common_units;
    }

    pub fn is_common(&self) -> bool {
        self.is_common
    }

    pub fn set_common(&mut self, is_common: bool) {
        self.is_common = is_common;
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

    pub fn recipe_ingredients(&self) -> &[RecipeIngredient] {
        &self.recipe_ingredients
    }

    /// Records a usage of this ingredient, pointing the usage back at it.
    pub fn add_recipe_ingredient(&mut self, mut recipe_ingredient: RecipeIngredient) {
        recipe_ingredient.set_ingredient(Some(self.handle()));
        self.recipe_ingredients.push(recipe_ingredient);
    }

    /// Returns the removed usage with its ingredient cleared, or `None` if it wasn't one of ours.
    pub fn remove_recipe_ingredient(
        &mut self,
        recipe_ingredient: &RecipeIngredient,
    ) -> Option<RecipeIngredient> {
        let index = self
            .recipe_ingredients
            .iter()
            .position(|r| r.same_usage(recipe_ingredient))?;
        let mut removed = self.recipe_ingredients.remove(index);
        removed.set_ingredient(None);
        Some(removed)
    }

    fn relink(&mut self) {
        let handle = self.handle();
        for usage in &mut self.recipe_ingredients {
            usage.set_ingredient(Some(handle.clone()));
        }
    }

    fn same_values(&self, other: &Self) -> bool {
        self.name == other.name
            && self.normalized_name == other.normalized_name
            && self.category == other.category
            && self.common_units == other.common_units
            && self.is_common == other.is_common
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.same_values(other),
            _ => false,
        }
    }
}

impl Eq for Ingredient {}

impl Hash for Ingredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        if self.id.is_none() {
            self.name.hash(state);
        }
    }
}

impl Validate for Ingredient {
    const ENTITY: &'static str = "ingredient";

    fn validate(&self) -> Vec<ConstraintViolation> {
        Constraints::new()
            .not_blank("name", &self.name, "Ingredient name is required")
            .max_len(
                "name",
                Some(&self.name[..]),
                MAX_NAME_LEN,
                "Ingredient name cannot exceed 255 characters",
            )
            .max_len(
                "normalizedName",
                self.normalized_name.as_deref(),
                MAX_NAME_LEN,
                "Normalized name cannot exceed 255 characters",
            )
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct IngredientBuilder {
    ingredient: Ingredient,
}

impl IngredientBuilder {
    pub fn id(mut self, id: IngredientId) -> Self {
        self.ingredient.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.ingredient.name = name.into();
        self
    }

    pub fn normalized_name(mut self, normalized_name: impl Into<String>) -> Self {
        self.ingredient.normalized_name = Some(normalized_name.into());
        self
    }

    pub fn category(mut self, category: IngredientCategory) -> Self {
        self.ingredient.category = Some(category);
        self
    }

    pub fn common_units<S: Into<String>>(mut self, units: impl IntoIterator<Item = S>) -> Self {
        self.ingredient.common_units = Some(units.into_iter().map(Into::into).collect());
        self
    }

    pub fn common(mut self, is_common: bool) -> Self {
        self.ingredient.is_common = is_common;
        self
    }

    pub fn build(self) -> Ingredient {
        self.ingredient
    }
}
