// Copyright 2023 Remi Bernotavicius

/// Per-serving nutrition facts, embedded in a recipe. Every field is optional since most recipes
/// only know some of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NutritionalInfo {
    pub calories: Option<i32>,
    pub protein: Option<i32>,
    pub carbs: Option<i32>,
    pub fat: Option<i32>,
    pub fiber: Option<i32>,
    pub sugar: Option<i32>,
    pub sodium: Option<i32>,
}

impl NutritionalInfo {
    pub fn new(
        calories: Option<i32>,
        protein: Option<i32>,
        carbs: Option<i32>,
        fat: Option<i32>,
        fiber: Option<i32>,
        sugar: Option<i32>,
        sodium: Option<i32>,
    ) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
            sugar,
            sodium,
        }
    }

    pub fn builder() -> NutritionalInfoBuilder {
        NutritionalInfoBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

#[derive(Debug, Default)]
pub struct NutritionalInfoBuilder {
    info: NutritionalInfo,
}

impl NutritionalInfoBuilder {
    pub fn calories(mut self, calories: impl Into<Option<i32>>) -> Self {
        self.info.calories = calories.into();
        self
    }

    pub fn protein(mut self, protein: impl Into<Option<i32>>) -> Self {
        self.info.protein = protein.into();
        self
    }

    pub fn carbs(mut self, carbs: impl Into<Option<i32>>) -> Self {
        self.info.carbs = carbs.into();
        self
    }

    pub fn fat(mut self, fat: impl Into<Option<i32>>) -> Self {
        self.info.fat = fat.into();
        self
    }

    pub fn fiber(mut self, fiber: impl Into<Option<i32>>) -> Self {
        self.info.fiber = fiber.into();
        self
    }

    pub fn sugar(mut self, sugar: impl Into<Option<i32>>) -> Self {
        self.info.sugar = sugar.into();
        self
    }

    pub fn sodium(mut self, sodium: impl Into<Option<i32>>) -> Self {
        self.info.sodium = sodium.into();
        self
    }

    pub fn build(self) -> NutritionalInfo {
        self.info
    }
}
