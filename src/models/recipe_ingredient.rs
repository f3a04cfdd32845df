// Copyright 2023 Remi Bernotavicius

use super::{Ingredient, IngredientHandle, RecipeHandle, RecipeIngredientId};
use crate::validation::{ConstraintViolation, Constraints, Validate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::hash::{Hash, Hasher};

pub const MAX_UNIT_LEN: usize = 50;

/// Decimal places a quantity is stored with.
pub const QUANTITY_SCALE: u32 = 2;

/// Largest quantity that fits in ten digits at `QUANTITY_SCALE`.
pub fn max_quantity() -> Decimal {
    Decimal::new(9_999_999_999, QUANTITY_SCALE)
}

/// The quantity as it will be stored: rounded half away from zero to `QUANTITY_SCALE` places.
pub fn round_quantity(quantity: Decimal) -> Decimal {
    quantity
        .round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// A use of an ingredient in a recipe, along with how much of it is needed.
#[derive(Debug, Clone)]
pub struct RecipeIngredient {
    id: Option<RecipeIngredientId>,
    recipe: Option<RecipeHandle>,
    ingredient: Option<IngredientHandle>,
    quantity: Option<Decimal>,
    unit: Option<String>,
    is_required: bool,
    step_order: Option<i32>,
}

impl Default for RecipeIngredient {
    fn default() -> Self {
        Self {
            id: None,
            recipe: None,
            ingredient: None,
            quantity: None,
            unit: None,
            is_required: true,
            step_order: None,
        }
    }
}

impl RecipeIngredient {
    pub fn builder() -> RecipeIngredientBuilder {
        RecipeIngredientBuilder::default()
    }

    pub fn id(&self) -> Option<RecipeIngredientId> {
        self.id
    }

    pub fn set_id(&mut self, id: impl Into<Option<RecipeIngredientId>>) {
        self.id = id.into();
    }

    pub fn recipe(&self) -> Option<&RecipeHandle> {
        self.recipe.as_ref()
    }

    pub fn set_recipe(&mut self, recipe: Option<RecipeHandle>) {
        self.recipe = recipe;
    }

    pub fn ingredient(&self) -> Option<&IngredientHandle> {
        self.ingredient.as_ref()
    }

    pub fn set_ingredient(&mut self, ingredient: Option<IngredientHandle>) {
        self.ingredient = ingredient;
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: impl Into<Option<Decimal>>) {
        self.quantity = quantity.into();
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<String>) {
        self.unit = unit;
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn set_required(&mut self, is_required: bool) {
        self.is_required = is_required;
    }

    pub fn step_order(&self) -> Option<i32> {
        self.step_order
    }

    pub fn set_step_order(&mut self, step_order: impl Into<Option<i32>>) {
        self.step_order = step_order.into();
    }

    fn same_amounts(&self, other: &Self) -> bool {
        self.quantity == other.quantity
            && self.unit == other.unit
            && self.is_required == other.is_required
            && self.step_order == other.step_order
    }

    /// Like `==` but compares the recipe instead of the ingredient. This is how an ingredient
    /// finds one of its own usages, whose ingredient handle it may have rewritten.
    pub(crate) fn same_usage(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.recipe == other.recipe && self.same_amounts(other),
            _ => false,
        }
    }
}

/// Saved rows compare by id. Unsaved ones compare by ingredient and amounts; the owning recipe
/// is not part of the comparison.
impl PartialEq for RecipeIngredient {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.ingredient == other.ingredient && self.same_amounts(other),
            _ => false,
        }
    }
}

impl Eq for RecipeIngredient {}

impl Hash for RecipeIngredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        if self.id.is_none() {
            self.quantity.hash(state);
            self.unit.hash(state);
        }
    }
}

impl Validate for RecipeIngredient {
    const ENTITY: &'static str = "recipe ingredient";

    fn validate(&self) -> Vec<ConstraintViolation> {
        Constraints::new()
            .not_null("recipe", self.recipe.as_ref(), "Recipe is required")
            .not_null(
                "ingredient",
                self.ingredient.as_ref(),
                "Ingredient is required",
            )
            .positive_decimal(
                "quantity",
                self.quantity.map(round_quantity),
                "Quantity must be positive",
            )
            .at_most_decimal(
                "quantity",
                self.quantity.map(round_quantity),
                max_quantity(),
                "Quantity cannot exceed 99999999.99",
            )
            .max_len(
                "unit",
                self.unit.as_deref(),
                MAX_UNIT_LEN,
                "Unit cannot exceed 50 characters",
            )
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct RecipeIngredientBuilder {
    recipe_ingredient: RecipeIngredient,
}

impl RecipeIngredientBuilder {
    pub fn id(mut self, id: RecipeIngredientId) -> Self {
        self.recipe_ingredient.id = Some(id);
        self
    }

    pub fn recipe(mut self, recipe: RecipeHandle) -> Self {
        self.recipe_ingredient.recipe = Some(recipe);
        self
    }

    pub fn ingredient(mut self, ingredient: &Ingredient) -> Self {
        self.recipe_ingredient.ingredient = Some(ingredient.handle());
        self
    }

    pub fn ingredient_handle(mut self, ingredient: IngredientHandle) -> Self {
        self.recipe_ingredient.ingredient = Some(ingredient);
        self
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.recipe_ingredient.quantity = Some(quantity);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.recipe_ingredient.unit = Some(unit.into());
        self
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.recipe_ingredient.is_required = is_required;
        self
    }

    pub fn step_order(mut self, step_order: i32) -> Self {
        self.recipe_ingredient.step_order = Some(step_order);
        self
    }

    pub fn build(self) -> RecipeIngredient {
        self.recipe_ingredient
    }
}
