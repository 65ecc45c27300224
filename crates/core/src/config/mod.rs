//! Configuration loading and schema definitions
//!
//! The optional `.repokit.toml` file controls where templates live, where the
//! profile state and merged hook config are written, and which checks are opt-in.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
