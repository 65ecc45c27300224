//! Search-path additions requested by active profiles
//!
//! Nothing here touches the process environment; callers decide whether to
//! print, export, or ignore the plan.

use crate::profile::ProfileId;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvPlan {
    /// Directories to prepend to `PATH`, highest priority first
    pub path_prepend: Vec<PathBuf>,
}

impl EnvPlan {
    /// Collect each profile's search paths under `root`, in profile order
    pub fn for_profiles(root: &Path, profiles: &[ProfileId]) -> Self {
        let mut path_prepend: Vec<PathBuf> = Vec::new();
        for profile in profiles {
            for dir in profile.spec().search_paths {
                let path = root.join(dir);
                if !path_prepend.contains(&path) {
                    path_prepend.push(path);
                }
            }
        }
        Self { path_prepend }
    }

    pub fn is_empty(&self) -> bool {
        self.path_prepend.is_empty()
    }

    /// Shell lines applying the plan
    pub fn exports(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let dirs: Vec<String> = self
            .path_prepend
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        vec![format!("export PATH=\"{}:$PATH\"", dirs.join(":"))]
    }
}
