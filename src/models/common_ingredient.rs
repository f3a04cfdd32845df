// Copyright 2023 Remi Bernotavicius

use super::{CommonIngredientId, Ingredient, IngredientHandle};
use crate::validation::{ConstraintViolation, Constraints, Validate};
use chrono::NaiveDateTime;
use std::hash::{Hash, Hasher};

/// An ingredient offered as a quick pick, ranked by how often it gets used.
#[derive(Debug, Default, Clone)]
pub struct CommonIngredient {
    id: Option<CommonIngredientId>,
    ingredient: Option<IngredientHandle>,
    popularity_score: i32,
    created_at: Option<NaiveDateTime>,
}

impl CommonIngredient {
    pub fn builder() -> CommonIngredientBuilder {
        CommonIngredientBuilder::default()
    }

    pub fn id(&self) -> Option<CommonIngredientId> {
        self.id
    }

    pub fn set_id(&mut self, id: impl Into<Option<CommonIngredientId>>) {
        self.id = id.into();
    }

    pub fn ingredient(&self) -> Option<&IngredientHandle> {
        self.ingredient.as_ref()
    }

    pub fn set_ingredient(&mut self, ingredient: Option<IngredientHandle>) {
        self.ingredient = ingredient;
    }

    pub fn popularity_score(&self) -> i32 {
        self.popularity_score
    }

    pub fn set_popularity_score(&mut self, popularity_score: i32) {
        self.popularity_score = popularity_score;
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.created_at
    }

    pub fn set_created_at(&mut self, created_at: impl Into<Option<NaiveDateTime>>) {
        self.created_at = created_at.into();
    }
}

impl PartialEq for CommonIngredient {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.ingredient == other.ingredient
                    && self.popularity_score == other.popularity_score
            }
            _ => false,
        }
    }
}

impl Eq for CommonIngredient {}

impl Hash for CommonIngredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        if self.id.is_none() {
            self.ingredient.hash(state);
        }
    }
}

impl Validate for CommonIngredient {
    const ENTITY: &'static str = "common ingredient";

    fn validate(&self) -> Vec<ConstraintViolation> {
        Constraints::new()
            .not_null(
                "ingredient",
                self.ingredient.as_ref(),
                "Ingredient is required",
            )
            .positive_or_zero(
                "popularityScore",
                self.popularity_score,
                "Popularity score must be non-negative",
            )
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct CommonIngredientBuilder {
    common_ingredient: CommonIngredient,
}

impl CommonIngredientBuilder {
    pub fn id(mut self, id: CommonIngredientId) -> Self {
        self.common_ingredient.id = Some(id);
        self
    }

    pub fn ingredient(mut self, ingredient: &Ingredient) -> Self {
        self.common_ingredient.ingredient = Some(ingredient.handle());
        self
    }

    pub fn popularity_score(mut self, popularity_score: i32) -> Self {
        self.common_ingredient.popularity_score = popularity_score;
        self
    }

    pub fn build(self) -> CommonIngredient {
        self.common_ingredient
    }
}
