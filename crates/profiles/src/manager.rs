//! Per-project profile lifecycle: activation, install, cleanup
//!
//! Every mutating operation validates and computes everything it needs before
//! the first write, so a failed `set` or `install` leaves the project as it was.
//!
//! Install records the files it wrote in the state file. Switching profiles
//! and cleanup remove exactly those, so files the user created are never
//! touched, whatever the project looks like today.

use crate::detect::{FsProject, detect_profiles};
use crate::env::EnvPlan;
use crate::error::{ProfileError, Result};
use crate::fragment::{HookKey, TemplateStore};
use crate::merge::{MergedConfig, SkippedHook, is_generated, merge_configs, resolve_active_profiles};
use crate::profile::ProfileId;
use crate::state::ProfileState;
use repokit_core::config::Config;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot reported by `show`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileStatus {
    pub initialized: bool,
    pub state: ProfileState,
    pub detected: BTreeSet<ProfileId>,
    pub active: Vec<ProfileId>,
    pub env: EnvPlan,
}

/// What `install`/`update` produced
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub profiles: Vec<ProfileId>,
    pub output: PathBuf,
    pub hooks: usize,
    pub skipped: Vec<SkippedHook>,
    pub filtered: Vec<HookKey>,
    pub copied: Vec<PathBuf>,
    /// Template files left alone because the user already has their own
    pub kept: Vec<PathBuf>,
    /// Files from the previous install that no active profile produces now
    pub removed: Vec<PathBuf>,
    pub env: EnvPlan,
}

/// What `cleanup` removed
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub was_initialized: bool,
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ProfileManager {
    root: PathBuf,
    templates: TemplateStore,
    state_path: PathBuf,
    output_path: PathBuf,
    opt_in: Vec<String>,
    detect_exclude: Vec<String>,
}

impl ProfileManager {
    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self {
            root: root.to_path_buf(),
            templates: TemplateStore::new(config.templates_dir(root)),
            state_path: config.state_path(root),
            output_path: config.output_path(root),
            opt_in: config.schema.checks.opt_in.clone(),
            detect_exclude: config.schema.detect.exclude.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Profiles whose markers are present in the project
    pub fn detect(&self) -> BTreeSet<ProfileId> {
        let view = FsProject::scan(&self.root).with_exclude(&self.detect_exclude);
        let detected = detect_profiles(&view);
        tracing::debug!(root = %self.root.display(), ?detected, "Detected profiles");
        detected
    }

    /// Stored state, `None` while uninitialized
    pub fn load_state(&self) -> Result<Option<ProfileState>> {
        ProfileState::load(&self.state_path)
    }

    /// Stored state, or `common` with no overrides while uninitialized
    pub fn status(&self) -> Result<ProfileStatus> {
        let stored = self.load_state()?;
        let initialized = stored.is_some();
        let state = stored.unwrap_or_else(|| ProfileState::new(ProfileId::Common));
        let detected = self.detect();
        let active = resolve_active_profiles(state.active_profile, &detected);
        let env = EnvPlan::for_profiles(&self.root, &active);
        Ok(ProfileStatus {
            initialized,
            state,
            detected,
            active,
            env,
        })
    }

    pub fn env_plan(&self) -> Result<EnvPlan> {
        Ok(self.status()?.env)
    }

    /// Load, merge and filter fragments for `state`. Writes nothing.
    pub fn build(&self, state: &ProfileState) -> Result<MergedConfig> {
        let detected = self.detect();
        let profiles = resolve_active_profiles(state.active_profile, &detected);
        tracing::info!(?profiles, "Resolved active profiles");

        if !self.templates.root().is_dir() {
            tracing::warn!(
                templates = %self.templates.root().display(),
                "Templates directory not found; only an empty config can be produced"
            );
        }

        let mut fragments = BTreeMap::new();
        for &profile in &profiles {
            if let Some(fragment) = self.templates.load(profile)? {
                fragments.insert(profile, fragment);
            }
        }

        let mut merged = merge_configs(&profiles, |p| fragments.get(&p));
        merged.apply_overrides(state, &self.opt_in);
        Ok(merged)
    }

    /// Recompute and rewrite the merged config and the auxiliary files.
    ///
    /// Existing files that the previous install did not write are kept, except
    /// the merged config itself, which is refused unless it carries the
    /// generated header. Files the previous install wrote and this one does
    /// not are removed.
    pub fn install(&self) -> Result<InstallReport> {
        let mut state = self
            .load_state()?
            .ok_or_else(|| ProfileError::NotInitialized(self.state_path.clone()))?;
        let merged = self.build(&state)?;
        let rendered = merged.render()?;
        let copies = self.plan_copies(&merged.profiles)?;
        let previous: BTreeSet<PathBuf> = state.generated_paths(&self.root).into_iter().collect();
        self.ensure_output_managed(&previous)?;

        let mut copied = Vec::with_capacity(copies.len());
        let mut kept = Vec::new();
        for (source, target) in copies {
            if target.exists() && !previous.contains(&target) {
                tracing::info!(file = %target.display(), "Keeping existing file");
                kept.push(target);
                continue;
            }
            fs::copy(&source, &target).map_err(ProfileError::filesystem("copy", &target))?;
            tracing::debug!(from = %source.display(), to = %target.display(), "Copied template file");
            copied.push(target);
        }

        fs::write(&self.output_path, rendered)
            .map_err(ProfileError::filesystem("write", &self.output_path))?;
        tracing::info!(
            output = %self.output_path.display(),
            hooks = merged.hooks.len(),
            skipped = merged.skipped.len(),
            "Wrote merged config"
        );

        let mut written: BTreeSet<PathBuf> = copied.iter().cloned().collect();
        written.insert(self.output_path.clone());
        let stale: Vec<PathBuf> = previous.difference(&written).cloned().collect();
        let removed = remove_existing(&stale)?;
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "Removed files no profile produces");
        }

        state.generated = written.iter().filter_map(|path| self.record(path)).collect();
        state.save(&self.state_path)?;

        Ok(InstallReport {
            env: EnvPlan::for_profiles(&self.root, &merged.profiles),
            profiles: merged.profiles,
            output: self.output_path.clone(),
            hooks: merged.hooks.len(),
            skipped: merged.skipped,
            filtered: merged.filtered,
            copied,
            kept,
            removed,
        })
    }

    /// Switch to `candidate`, removing the files the last install wrote
    /// before the new state is written. Overrides are carried over.
    pub fn set_active_profile(&self, candidate: &str) -> Result<ProfileState> {
        let profile: ProfileId = candidate.parse()?;

        let previous = self.load_state_lenient()?;
        let stale = previous
            .as_ref()
            .map(|state| state.generated_paths(&self.root))
            .unwrap_or_default();
        let next = match &previous {
            Some(state) => state.with_profile(profile),
            None => ProfileState::new(profile),
        };

        let removed = remove_existing(&stale)?;
        if let Some(previous) = &previous {
            tracing::info!(count = removed.len(), from = %previous.active_profile, "Removed generated files");
        }

        next.save(&self.state_path)?;
        tracing::info!(%profile, state = %self.state_path.display(), "Profile set");
        Ok(next)
    }

    /// Initialize with `candidate`, or with the best detected profile
    pub fn init(&self, candidate: Option<&str>) -> Result<ProfileState> {
        match candidate {
            Some(candidate) => self.set_active_profile(candidate),
            None => {
                let suggested = suggest_profile(&self.detect());
                tracing::info!(%suggested, "No profile given, using detection");
                self.set_active_profile(suggested.as_str())
            }
        }
    }

    /// Remove the state file and every file the last install wrote
    pub fn cleanup(&self) -> Result<CleanupReport> {
        let previous = self.load_state_lenient()?;
        let was_initialized = previous.is_some() || self.state_path.exists();

        let mut targets = previous
            .map(|state| state.generated_paths(&self.root))
            .unwrap_or_default();
        targets.push(self.state_path.clone());

        let removed = remove_existing(&targets)?;
        tracing::info!(count = removed.len(), "Cleanup finished");
        Ok(CleanupReport {
            was_initialized,
            removed,
        })
    }

    pub fn enable_check(&self, check: &str) -> Result<ProfileState> {
        self.update_overrides(|state| state.enable(check))
    }

    pub fn disable_check(&self, check: &str) -> Result<ProfileState> {
        self.update_overrides(|state| state.disable(check))
    }

    fn update_overrides<F>(&self, edit: F) -> Result<ProfileState>
    where
        F: FnOnce(&mut ProfileState) -> Result<()>,
    {
        let mut state = self
            .load_state()?
            .ok_or_else(|| ProfileError::NotInitialized(self.state_path.clone()))?;
        edit(&mut state)?;
        state.save(&self.state_path)?;
        Ok(state)
    }

    /// A malformed state file should not block replacing or removing it
    fn load_state_lenient(&self) -> Result<Option<ProfileState>> {
        match self.load_state() {
            Err(err @ ProfileError::MalformedState { .. }) => {
                tracing::warn!(error = %err, "Ignoring malformed state file");
                Ok(None)
            }
            other => other,
        }
    }

    /// The merged config may be replaced only if we wrote it
    fn ensure_output_managed(&self, previous: &BTreeSet<PathBuf>) -> Result<()> {
        if previous.contains(&self.output_path) {
            return Ok(());
        }
        match fs::read_to_string(&self.output_path) {
            Ok(content) if is_generated(&content) => Ok(()),
            Ok(_) => Err(ProfileError::UnmanagedFile(self.output_path.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Err(ProfileError::UnmanagedFile(self.output_path.clone()))
            }
            Err(e) => Err(ProfileError::filesystem("read", &self.output_path)(e)),
        }
    }

    /// State-file entry for a written file: root-relative where possible
    fn record(&self, path: &Path) -> Option<String> {
        let entry = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();
        if entry.contains(',') {
            tracing::warn!(file = %path.display(), "Cannot record a file name containing ','");
            return None;
        }
        Some(entry)
    }

    /// Auxiliary files to copy for `profiles`; earlier profiles win name clashes
    fn plan_copies(&self, profiles: &[ProfileId]) -> Result<Vec<(PathBuf, PathBuf)>> {
        let mut planned: Vec<(PathBuf, PathBuf)> = Vec::new();
        for &profile in profiles {
            for source in self.templates.auxiliary_files(profile)? {
                let Some(name) = source.file_name() else {
                    continue;
                };
                let target = self.root.join(name);
                if target == self.state_path || target == self.output_path {
                    continue;
                }
                if planned.iter().any(|(_, t)| *t == target) {
                    tracing::debug!(%profile, file = %target.display(), "Template file already provided");
                    continue;
                }
                planned.push((source, target));
            }
        }
        Ok(planned)
    }
}

/// Preferred profile for a bare `init`: a language or infrastructure profile
/// when one is detected, `bash` when it is the only match, else `common`
pub fn suggest_profile(detected: &BTreeSet<ProfileId>) -> ProfileId {
    detected
        .iter()
        .copied()
        .find(|p| !matches!(p, ProfileId::Common | ProfileId::Bash))
        .or_else(|| detected.contains(&ProfileId::Bash).then_some(ProfileId::Bash))
        .unwrap_or(ProfileId::Common)
}

fn remove_existing(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => removed.push(path.clone()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ProfileError::filesystem("remove", path)(e)),
        }
    }
    Ok(removed)
}
