//! Repository profiles for repokit
//!
//! Detects which tool ecosystems a project uses, keeps the chosen profile in
//! a small state file, and merges per-profile pre-commit fragments into one
//! configuration.
//!
//! # Example
//!
//! ```no_run
//! use repokit_core::config::Config;
//! use repokit_profiles::ProfileManager;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = Config::load(root, None)?;
//! let manager = ProfileManager::from_config(root, &config);
//! manager.set_active_profile("python")?;
//! let report = manager.install()?;
//! println!("{} hooks written to {}", report.hooks, report.output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod detect;
pub mod env;
pub mod error;
pub mod fragment;
pub mod manager;
pub mod merge;
pub mod profile;
pub mod state;

pub use detect::{FsProject, ProjectView, StaticProject, detect_profiles};
pub use env::EnvPlan;
pub use error::{ProfileError, Result};
pub use fragment::{ConfigFragment, FRAGMENT_FILE, HookEntry, HookKey, TemplateStore};
pub use manager::{CleanupReport, InstallReport, ProfileManager, ProfileStatus, suggest_profile};
pub use merge::{MergedConfig, SkippedHook, merge_configs, resolve_active_profiles};
pub use profile::{Marker, PROFILES, ProfileId, ProfileSpec};
pub use state::ProfileState;
