// Copyright 2023 Remi Bernotavicius

use super::{RecipeHandle, RecipeInstructionId};
use crate::validation::{ConstraintViolation, Constraints, Validate};
use std::hash::{Hash, Hasher};

/// One step of a recipe's method.
#[derive(Debug, Default, Clone)]
pub struct RecipeInstruction {
    id: Option<RecipeInstructionId>,
    recipe: Option<RecipeHandle>,
    step_number: Option<i32>,
    description: String,
    step_order: Option<i32>,
}

impl RecipeInstruction {
    pub fn builder() -> RecipeInstructionBuilder {
        RecipeInstructionBuilder::default()
    }

    pub fn id(&self) -> Option<RecipeInstructionId> {
        self.id
    }

    pub fn set_id(&mut self, id: impl Into<Option<RecipeInstructionId>>) {
        self.id = id.into();
    }

    pub fn recipe(&self) -> Option<&RecipeHandle> {
        self.recipe.as_ref()
    }

    pub fn set_recipe(&mut self, recipe: Option<RecipeHandle>) {
        self.recipe = recipe;
    }

    pub fn step_number(&self) -> Option<i32> {
        self.step_number
    }

    pub fn set_step_number(&mut self, step_number: impl Into<Option<i32>>) {
        self.step_number = step_number.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn step_order(&self) -> Option<i32> {
        self.step_order
    }

    pub fn set_step_order(&mut self, step_order: impl Into<Option<i32>>) {
        self.step_order = step_order.into();
    }

    fn same_values(&self, other: &Self) -> bool {
        self.step_number == other.step_number
            && self.description == other.description
            && self.step_order == other.step_order
    }
}

impl PartialEq for RecipeInstruction {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.same_values(other),
            _ => false,
        }
    }
}

impl Eq for RecipeInstruction {}

impl Hash for RecipeInstruction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        if self.id.is_none() {
            self.description.hash(state);
            self.step_number.hash(state);
        }
    }
}

impl Validate for RecipeInstruction {
    const ENTITY: &'static str = "recipe instruction";

    fn validate(&self) -> Vec<ConstraintViolation> {
        Constraints::new()
            .not_null("recipe", self.recipe.as_ref(), "Recipe is required")
            .positive("stepNumber", self.step_number, "Step number must be positive")
            .not_blank(
                "description",
                &self.description,
                "Instruction description is required",
            )
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct RecipeInstructionBuilder {
    instruction: RecipeInstruction,
}

impl RecipeInstructionBuilder {
    pub fn id(mut self, id: RecipeInstructionId) -> Self {
        self.instruction.id = Some(id);
        self
    }

    pub fn recipe(mut self, recipe: RecipeHandle) -> Self {
        self.instruction.recipe = Some(recipe);
        self
    }

    pub fn step_number(mut self, step_number: i32) -> Self {
        self.instruction.step_number = Some(step_number);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.instruction.description = description.into();
        self
    }

    pub fn step_order(mut self, step_order: i32) -> Self {
        self.instruction.step_order = Some(step_order);
        self
    }

    pub fn build(self) -> RecipeInstruction {
        self.instruction
    }
}
