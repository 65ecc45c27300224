//! Terminal output helpers for repokit
//!
//! Provides shared CLI functionality:
//! - Status lines and headers
//! - Human or JSON rendering of command results and errors

#![warn(missing_docs)]

pub mod output;

pub use output::{Output, Status};
