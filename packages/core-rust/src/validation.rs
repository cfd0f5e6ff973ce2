//! Field-level validation for inbound payloads.
//!
//! Decoding only proves that a payload has the right shape. Constraints such
//! as "must not be blank" are checked afterwards through [`Validate`], which
//! collects every violation instead of stopping at the first one so clients
//! get the full list in a single response.

use std::fmt;

/// A single constraint violation on a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the offending field, with a path for nested values
    /// (e.g. `conditions[0].sensorId`).
    pub field: String,
    /// Human-readable constraint message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Accumulated constraint violations for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.details())
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Records a violation if `value` is empty or whitespace only.
    pub fn not_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be blank");
        }
    }

    /// Records a violation if `value` is shorter than `min` characters.
    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.push(field, format!("size must be at least {min}"));
        }
    }

    /// Records a violation if `items` is empty.
    pub fn not_empty<T>(&mut self, field: &str, items: &[T]) {
        if items.is_empty() {
            self.push(field, "must not be empty");
        }
    }

    /// Records a violation if `value` is negative, NaN or infinite.
    pub fn non_negative_finite(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value < 0.0 {
            self.push(field, "must be greater than or equal to 0");
        }
    }

    /// Returns the collected violations in the order they were recorded.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Joins all violations as `"<field> <message>"` separated by `"; "`.
    #[must_use]
    pub fn details(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Converts the set into `Ok(())` when no violation was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Constraint checking for decoded payloads.
pub trait Validate {
    /// Appends every violation found in `self` to `errors`.
    fn collect_errors(&self, errors: &mut ValidationErrors);

    /// Validates `self`, returning all violations at once.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each violated constraint.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result()
    }
}
