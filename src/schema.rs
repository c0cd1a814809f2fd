// 📐 Shape Layer - Document Validation
// Field presence, enum membership and simple ranges, checked before any write

use crate::error::{StoreError, StoreResult};

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub collection: String,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(collection: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            collection: collection.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.collection, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Implemented by every stored document.
pub trait Validate {
    fn validate(&self) -> ValidationResult;

    /// Run `validate` and lift failures into a store error.
    fn ensure_valid(&self) -> StoreResult<()> {
        self.validate().map_err(StoreError::ValidationFailed)
    }
}

// ============================================================================
// CHECKER
// ============================================================================

/// Collects validation errors for one document.
pub struct Checker {
    collection: &'static str,
    errors: Vec<ValidationError>,
}

impl Checker {
    pub fn new(collection: &'static str) -> Self {
        Checker {
            collection,
            errors: Vec::new(),
        }
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "Required field is empty");
        }
        self
    }

    /// Optional strings may be absent but not blank.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            if v.trim().is_empty() {
                self.fail(field, "Must not be blank when present");
            }
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value <= 0.0 {
            self.fail(field, format!("Must be a positive number, got {}", value));
        }
        self
    }

    pub fn range(&mut self, field: &str, value: i64, min: i64, max: i64) -> &mut Self {
        if value < min || value > max {
            self.fail(
                field,
                format!("Must be between {} and {}, got {}", min, max, value),
            );
        }
        self
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.fail(field, message);
        }
        self
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .push(ValidationError::new(self.collection, field, message));
    }

    pub fn finish(&mut self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}
