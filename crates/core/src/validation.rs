//! Configuration and input validation
//!
//! Provides validation for:
//! - Configuration files
//! - User inputs such as check names
//! - Patterns and formats
//!
//! # Example
//!
//! ```rust,ignore
//! use repokit_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("general.state_file", &schema.general.state_file)
//!     .check_name("check", name)
//!     .validate();
//!
//! if !result.is_valid() {
//!     for error in result.errors() {
//!         eprintln!("Validation error: {}", error);
//!     }
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern accepted for check (hook id) names
pub const CHECK_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]*$";

static CHECK_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(CHECK_NAME_PATTERN).expect("check name pattern is valid"));

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Convert to Result type
    pub fn to_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
            Err(Error::new(
                ErrorCode::ConfigValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: "Field is required".to_string(),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a compiled regex
    pub fn matches(mut self, field: &str, value: &str, re: &Regex, description: &str) -> Self {
        if !re.is_match(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must match {}", description),
                code: "PATTERN".to_string(),
                expected: Some(description.to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate that `value` is a usable check (hook id) name
    pub fn check_name(self, field: &str, value: &str) -> Self {
        self.matches(field, value, &CHECK_NAME, "a hook id (letters, digits, '.', '_', '-')")
    }

    /// Validate that a string is a valid glob pattern
    pub fn glob(mut self, field: &str, value: &str) -> Self {
        if let Err(e) = glob::Pattern::new(value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Invalid glob pattern: {}", e.msg),
                code: "GLOB".to_string(),
                expected: Some("glob pattern".to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Validate a check (hook id) name
pub fn validate_check_name(name: &str) -> ValidationResult {
    Validator::new()
        .required("check", name)
        .check_name("check", name)
        .validate()
}
