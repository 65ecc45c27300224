//! Active-profile resolution and first-wins fragment merging
//!
//! Resolution always yields `common` first, then the stored profile, then any
//! other detected profiles in identifier order. Merging walks that list and
//! keeps the first hook seen for every identity key, so earlier profiles take
//! precedence over later ones.

use crate::error::{ProfileError, Result};
use crate::fragment::{ConfigFragment, HookEntry, HookKey, RepoBlock};
use crate::profile::ProfileId;
use crate::state::ProfileState;
use serde::Serialize;
use serde_yaml_ng::{Mapping, Value};
use std::collections::{BTreeSet, HashSet};

/// First line prefix of every rendered config
pub const GENERATED_MARKER: &str = "# Generated by repokit";

/// Whether `content` was produced by [`MergedConfig::render`]
pub fn is_generated(content: &str) -> bool {
    content.starts_with(GENERATED_MARKER)
}

/// Ordered, duplicate-free list of profiles whose fragments are merged
pub fn resolve_active_profiles(stored: ProfileId, detected: &BTreeSet<ProfileId>) -> Vec<ProfileId> {
    let mut profiles = vec![ProfileId::Common];
    if stored != ProfileId::Common {
        profiles.push(stored);
    }
    for id in detected {
        if !profiles.contains(id) {
            profiles.push(*id);
        }
    }
    profiles
}

/// A hook dropped because an earlier profile already provided its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedHook {
    pub profile: ProfileId,
    pub key: HookKey,
}

/// Result of merging fragments
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
    /// Profiles in merge order, including those without a fragment
    pub profiles: Vec<ProfileId>,
    pub settings: Mapping,
    pub hooks: Vec<HookEntry>,
    /// Duplicates discarded during the merge, in encounter order
    pub skipped: Vec<SkippedHook>,
    /// Hooks removed by check overrides, in merge order
    pub filtered: Vec<HookKey>,
}

/// Merge fragments in profile order with first-wins precedence.
/// Profiles without a fragment contribute nothing.
pub fn merge_configs<'a, F>(profiles: &[ProfileId], lookup: F) -> MergedConfig
where
    F: Fn(ProfileId) -> Option<&'a ConfigFragment>,
{
    let mut merged = MergedConfig {
        profiles: profiles.to_vec(),
        ..MergedConfig::default()
    };
    let mut seen: HashSet<HookKey> = HashSet::new();

    for &profile in profiles {
        let Some(fragment) = lookup(profile) else {
            continue;
        };

        for (key, value) in &fragment.settings {
            if !merged.settings.contains_key(key) {
                merged.settings.insert(key.clone(), value.clone());
            }
        }

        for hook in &fragment.hooks {
            let key = hook.identity_key();
            if seen.contains(&key) {
                tracing::debug!(%profile, %key, "Dropping duplicate hook");
                merged.skipped.push(SkippedHook { profile, key });
                continue;
            }
            seen.insert(key);
            merged.hooks.push(hook.clone());
        }
    }

    merged
}

impl MergedConfig {
    /// Drop hooks the state's check overrides or the opt-in list exclude
    pub fn apply_overrides(&mut self, state: &ProfileState, opt_in: &[String]) {
        let mut filtered = Vec::new();
        self.hooks.retain(|hook| {
            let keep = state.allows(hook.id(), opt_in);
            if !keep {
                filtered.push(hook.identity_key());
            }
            keep
        });
        self.filtered.extend(filtered);
    }

    /// Identity keys of the merged hooks, in order
    pub fn keys(&self) -> Vec<HookKey> {
        self.hooks.iter().map(HookEntry::identity_key).collect()
    }

    /// Hooks regrouped into repository blocks in first-appearance order
    pub(crate) fn repo_blocks(&self) -> Vec<RepoBlock> {
        let mut blocks: Vec<RepoBlock> = Vec::new();
        for hook in &self.hooks {
            let existing = blocks
                .iter_mut()
                .find(|b| b.repo == hook.repo && b.rev == hook.rev);
            match existing {
                Some(block) => block.hooks.push(hook.hook.clone()),
                None => blocks.push(RepoBlock {
                    repo: hook.repo.clone(),
                    rev: hook.rev.clone(),
                    hooks: vec![hook.hook.clone()],
                }),
            }
        }
        blocks
    }

    /// Render as a pre-commit document with a generated-file header
    pub fn render(&self) -> Result<String> {
        let mut document = self.settings.clone();
        let repos = serde_yaml_ng::to_value(self.repo_blocks())
            .map_err(|e| ProfileError::Render(e.to_string()))?;
        document.insert(Value::String("repos".to_string()), repos);

        let body = serde_yaml_ng::to_string(&document)
            .map_err(|e| ProfileError::Render(e.to_string()))?;

        let names: Vec<&str> = self.profiles.iter().map(ProfileId::as_str).collect();
        Ok(format!(
            "{} from profiles: {}\n# Do not edit by hand; run `repokit update` to regenerate.\n{}",
            GENERATED_MARKER,
            names.join(", "),
            body
        ))
    }
}
