//! Structured error handling with context and recovery suggestions
//!
//! This module provides error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports for `--json` output

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Unexpected failure inside repokit
    Internal = 1001,

    // IO errors (2xxx)
    /// Generic filesystem failure
    IoError = 2000,
    /// A required file is missing
    FileNotFound = 2001,
    /// The filesystem refused access
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Configuration could not be loaded
    ConfigError = 3000,
    /// An explicitly named config file does not exist
    ConfigNotFound = 3001,
    /// The config file is not valid TOML for the schema
    ConfigParseError = 3002,
    /// The config parsed but holds invalid values
    ConfigValidationError = 3003,

    // Profile errors (4xxx)
    /// Unknown profile identifier
    InvalidProfile = 4001,
    /// The profile state file cannot be parsed
    MalformedState = 4002,
    /// A template fragment is not a valid pre-commit document
    InvalidFragment = 4003,
    /// The operation needs a profile state file
    NotInitialized = 4004,
    /// A file in the way was not written by repokit
    UnmanagedFile = 4005,

    // Validation errors (6xxx)
    /// Rejected user input
    InvalidInput = 6001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            4 => "Profile",
            6 => "Validation",
            _ => "Unknown",
        }
    }

    /// Process exit code a CLI should use for this error
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            2 => exit_codes::IO_ERROR,
            3 => exit_codes::CONFIG_ERROR,
            4 | 6 => exit_codes::VALIDATION_ERROR,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    /// General configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicitly requested config file does not exist
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .repokit.toml file or drop --config to use defaults")
    }
}

/// Serializable error report for logging and `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable code, e.g. `INVALID_PROFILE`
    pub code: ErrorCode,
    /// Display form of the code, e.g. `E4001`
    pub code_str: String,
    /// Category of the code
    pub category: String,
    /// Human-readable message
    pub message: String,
    /// Additional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Recovery suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Rendered source error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command succeeded
    pub const SUCCESS: i32 = 0;
    /// Unclassified failure
    pub const FAILURE: i32 = 1;
    /// Invalid profile, check name, state or fragment
    pub const VALIDATION_ERROR: i32 = 2;
    /// Missing, unparsable or invalid configuration
    pub const CONFIG_ERROR: i32 = 3;
    /// Filesystem failure
    pub const IO_ERROR: i32 = 4;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::InvalidProfile.to_string(), "E4001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::ConfigParseError.category(), "Configuration");
        assert_eq!(ErrorCode::MalformedState.category(), "Profile");
    }

    #[test]
    fn test_error_code_exit_code() {
        assert_eq!(ErrorCode::InvalidProfile.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::PermissionDenied.exit_code(), exit_codes::IO_ERROR);
        assert_eq!(ErrorCode::Internal.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::config_not_found("/path/to/repokit.toml")
            .with_context("While loading configuration");

        assert_eq!(err.code, ErrorCode::ConfigNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
        assert!(err.to_string().contains("Suggestion: Create a .repokit.toml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert_eq!(err.code.exit_code(), exit_codes::IO_ERROR);
    }

    #[test]
    fn test_result_ext_adds_context() {
        let result: Result<()> = Err(Error::config("bad value"));
        let err = result.context("While reading .repokit.toml").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("While reading .repokit.toml"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::new(ErrorCode::InvalidProfile, "Invalid profile 'rust'")
            .with_suggestion("Use one of: bash, common, go");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E4001"));
        assert!(json.contains("Profile"));
        assert!(json.contains("INVALID_PROFILE"));
    }
}
