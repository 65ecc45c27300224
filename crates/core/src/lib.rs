//! Core utilities for repokit
//!
//! This crate provides shared functionality used by the profile engine and the CLI:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **File scanning**: Directory walking with extension and exclude filters
//! - **Validation**: Fluent validator for configuration values and user input
//!
//! # Example
//!
//! ```rust,no_run
//! use repokit_core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("."), None).expect("invalid configuration");
//! println!("templates: {}", config.templates_dir(Path::new(".")).display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod file_scanner;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
