// Copyright 2023 Remi Bernotavicius

//! Field constraints checked before an entity is written.
//!
//! Violations are collected rather than returned on the first failure, so a caller can report
//! every problem with an entity at once. Property names use the camel-case spelling the rest of
//! the application reports them with (e.g. `cookingTimeMinutes`).

use derive_more::Display;
use rust_decimal::Decimal;

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{property}: {message}")]
pub struct ConstraintViolation {
    pub property: &'static str,
    pub message: String,
}

impl ConstraintViolation {
    pub fn new(property: &'static str, message: impl Into<String>) -> Self {
        Self {
            property,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {entity}: {}", join_violations(.violations))]
pub struct ValidationError {
    entity: &'static str,
    violations: Vec<ConstraintViolation>,
}

impl ValidationError {
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn has_violation_for(&self, property: &str) -> bool {
        self.violations.iter().any(|v| v.property == property)
    }
}

fn join_violations(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub trait Validate {
    /// Name used when reporting violations for this kind of entity.
    const ENTITY: &'static str;

    /// Every constraint this value currently breaks. Empty means valid.
    ///
    /// Only the value's own fields are checked, child entities are validated separately.
    fn validate(&self) -> Vec<ConstraintViolation>;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    fn check(&self) -> Result<(), ValidationError> {
        let mut violations = self.validate();
        if violations.is_empty() {
            return Ok(());
        }
        violations.sort();
        violations.dedup();
        Err(ValidationError {
            entity: Self::ENTITY,
            violations,
        })
    }
}

/// Accumulates violations for one entity.
#[derive(Default)]
pub struct Constraints {
    violations: Vec<ConstraintViolation>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    fn violation(&mut self, property: &'static str, message: &str) {
        self.violations
            .push(ConstraintViolation::new(property, message));
    }

    /// Fails for empty and whitespace-only strings.
    pub fn not_blank(&mut self, property: &'static str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.violation(property, message);
        }
        self
    }

    pub fn not_null<T>(
        &mut self,
        property: &'static str,
        value: Option<&T>,
        message: &str,
    ) -> &mut Self {
        if value.is_none() {
            self.violation(property, message);
        }
        self
    }

    /// Length is counted in characters. Absent values pass.
    pub fn max_len(
        &mut self,
        property: &'static str,
        value: Option<&str>,
        max: usize,
        message: &str,
    ) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.violation(property, message);
        }
        self
    }

    /// Absent values pass.
    pub fn positive(
        &mut self,
        property: &'static str,
        value: Option<i32>,
        message: &str,
    ) -> &mut Self {
        if value.is_some_and(|v| v <= 0) {
            self.violation(property, message);
        }
        self
    }

    pub fn positive_decimal(
        &mut self,
        property: &'static str,
        value: Option<Decimal>,
        message: &str,
    ) -> &mut Self {
        if value.is_some_and(|v| v <= Decimal::ZERO) {
            self.violation(property, message);
        }
        self
    }

    /// Absent values pass.
    pub fn at_most_decimal(
        &mut self,
        property: &'static str,
        value: Option<Decimal>,
        max: Decimal,
        message: &str,
    ) -> &mut Self {
        if value.is_some_and(|v| v > max) {
            self.violation(property, message);
        }
        self
    }

    pub fn positive_or_zero(
        &mut self,
        property: &'static str,
        value: i32,
        message: &str,
    ) -> &mut Self {
        if value < 0 {
            self.violation(property, message);
        }
        self
    }

    pub fn finish(&mut self) -> Vec<ConstraintViolation> {
        std::mem::take(&mut self.violations)
    }
}
