//! Persisted profile state
//!
//! The state file is line-oriented `KEY=VALUE` text:
//!
//! ```text
//! # Managed by repokit. Change it with `repokit set <profile>`.
//! PROFILE=python
//! ENABLE_CHECKS=mypy
//! DISABLE_CHECKS=bandit,safety
//! GENERATED=.bandit.yml,.pre-commit-config.yaml
//! ```
//!
//! `PROFILE` is required. `GENERATED` lists the files the last install wrote,
//! relative to the project root; only those are ever removed. Blank lines,
//! `#` comments and unknown keys are ignored.

use crate::error::{ProfileError, Result};
use crate::profile::ProfileId;
use repokit_core::validation::validate_check_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

const KEY_PROFILE: &str = "PROFILE";
const KEY_ENABLE: &str = "ENABLE_CHECKS";
const KEY_DISABLE: &str = "DISABLE_CHECKS";
const KEY_GENERATED: &str = "GENERATED";
const HEADER: &str = "# Managed by repokit. Change it with `repokit set <profile>`.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileState {
    pub active_profile: ProfileId,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub enabled_checks: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub disabled_checks: BTreeSet<String>,
    /// Files written by the last install, relative to the project root
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub generated: BTreeSet<String>,
}

impl ProfileState {
    pub fn new(active_profile: ProfileId) -> Self {
        Self {
            active_profile,
            enabled_checks: BTreeSet::new(),
            disabled_checks: BTreeSet::new(),
            generated: BTreeSet::new(),
        }
    }

    /// Same overrides, different profile, nothing generated yet
    pub fn with_profile(&self, active_profile: ProfileId) -> Self {
        Self {
            active_profile,
            generated: BTreeSet::new(),
            ..self.clone()
        }
    }

    /// Absolute paths of the recorded generated files
    pub fn generated_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.generated.iter().map(|entry| root.join(entry)).collect()
    }

    /// Enable a check, removing it from the disabled set
    pub fn enable(&mut self, check: &str) -> Result<()> {
        let check = checked_name(check)?;
        self.disabled_checks.remove(&check);
        self.enabled_checks.insert(check);
        Ok(())
    }

    /// Disable a check, removing it from the enabled set
    pub fn disable(&mut self, check: &str) -> Result<()> {
        let check = checked_name(check)?;
        self.enabled_checks.remove(&check);
        self.disabled_checks.insert(check);
        Ok(())
    }

    /// Whether a hook with this id survives the overrides.
    /// Explicit enables win over disables and over opt-in defaults.
    pub fn allows(&self, hook_id: &str, opt_in: &[String]) -> bool {
        if self.enabled_checks.contains(hook_id) {
            return true;
        }
        !(self.disabled_checks.contains(hook_id) || opt_in.iter().any(|c| c == hook_id))
    }

    /// Parse the state file format. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let malformed = |reason: String| ProfileError::MalformedState {
            path: origin.to_path_buf(),
            reason,
        };

        let mut profile = None;
        let mut enabled = BTreeSet::new();
        let mut disabled = BTreeSet::new();
        let mut generated = BTreeSet::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(malformed(format!("line {} is not KEY=VALUE", index + 1)));
            };
            let value = unquote(value.trim());

            match key.trim() {
                KEY_PROFILE => {
                    let id = value
                        .parse::<ProfileId>()
                        .map_err(|e| malformed(e.to_string()))?;
                    profile = Some(id);
                }
                KEY_ENABLE => enabled = parse_checks(value).map_err(|e| malformed(e.to_string()))?,
                KEY_DISABLE => disabled = parse_checks(value).map_err(|e| malformed(e.to_string()))?,
                KEY_GENERATED => generated = parse_generated(value).map_err(malformed)?,
                other => {
                    tracing::debug!(key = other, line = index + 1, "Ignoring unknown state key");
                }
            }
        }

        let active_profile = profile.ok_or_else(|| malformed(format!("missing {}", KEY_PROFILE)))?;

        Ok(Self {
            active_profile,
            enabled_checks: enabled,
            disabled_checks: disabled,
            generated,
        })
    }

    /// Serialize to the state file format
    pub fn render(&self) -> String {
        let mut out = format!("{}\n{}={}\n", HEADER, KEY_PROFILE, self.active_profile);
        let sets = [
            (KEY_ENABLE, &self.enabled_checks),
            (KEY_DISABLE, &self.disabled_checks),
            (KEY_GENERATED, &self.generated),
        ];
        for (key, set) in sets {
            if !set.is_empty() {
                let joined: Vec<&str> = set.iter().map(String::as_str).collect();
                out.push_str(&format!("{}={}\n", key, joined.join(",")));
            }
        }
        out
    }

    /// Read the state file; `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProfileError::filesystem("read", path)(e)),
        }
    }

    /// Overwrite the state file
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(ProfileError::filesystem("write", path))
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn parse_checks(value: &str) -> Result<BTreeSet<String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(checked_name)
        .collect()
}

/// Entries may be absolute, but a relative entry must stay inside the root
fn parse_generated(value: &str) -> std::result::Result<BTreeSet<String>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if Path::new(entry).components().any(|c| c == Component::ParentDir) {
                Err(format!("generated path '{}' leaves the project", entry))
            } else {
                Ok(entry.to_string())
            }
        })
        .collect()
}

fn checked_name(check: &str) -> Result<String> {
    let check = check.trim();
    if validate_check_name(check).is_valid() {
        Ok(check.to_string())
    } else {
        Err(ProfileError::InvalidCheckName(check.to_string()))
    }
}
