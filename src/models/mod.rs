// Copyright 2023 Remi Bernotavicius

//! The recipe book's entities.
//!
//! Children hold a handle back to their parent rather than the parent itself. The parent's
//! `add_*` and `remove_*` methods are the only things that set or clear those handles, so list
//! membership and back-references always agree.

use derive_more::Display;
use diesel_derive_newtype::DieselNewType;

mod common_ingredient;
mod ingredient;
mod nutritional_info;
mod recipe;
mod recipe_ingredient;
mod recipe_instruction;

pub use common_ingredient::{CommonIngredient, CommonIngredientBuilder};
pub use ingredient::{Ingredient, IngredientBuilder};
pub use nutritional_info::{NutritionalInfo, NutritionalInfoBuilder};
pub use recipe::{Recipe, RecipeBuilder};
pub use recipe_ingredient::{
    max_quantity, round_quantity, RecipeIngredient, RecipeIngredientBuilder, QUANTITY_SCALE,
};
pub use recipe_instruction::{RecipeInstruction, RecipeInstructionBuilder};

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            DieselNewType, Display, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone,
        )]
        pub struct $name(i32);

        impl $name {
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            pub const fn get(&self) -> i32 {
                self.0
            }
        }
    };
}

entity_id!(RecipeId);
entity_id!(IngredientId);
entity_id!(RecipeIngredientId);
entity_id!(RecipeInstructionId);
entity_id!(CommonIngredientId);

/// Back-reference from a child to the recipe that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipeHandle {
    pub id: Option<RecipeId>,
    pub name: String,
}

impl RecipeHandle {
    pub fn new(id: impl Into<Option<RecipeId>>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Reference to an ingredient, held by the entities that use it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IngredientHandle {
    pub id: Option<IngredientId>,
    pub name: String,
}

impl IngredientHandle {
    pub fn new(id: impl Into<Option<IngredientId>>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
pub(crate) fn hash_of(value: &impl std::hash::Hash) -> u64 {
    use std::hash::Hasher as _;

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
