//! Hook fragments and the template directory they are read from
//!
//! A fragment is a regular pre-commit document. Each hook is kept as an opaque
//! YAML mapping together with the repository block it came from; only `id`
//! and `files` are interpreted, to build the hook's identity key.

use crate::error::{ProfileError, Result};
use crate::profile::ProfileId;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a profile's fragment inside its template directory
pub const FRAGMENT_FILE: &str = ".pre-commit-config.yaml";

/// Target used in identity keys for hooks without a `files` pattern
const ANY_TARGET: &str = "*";

/// `(tool, target)` pair identifying duplicate hooks across fragments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HookKey {
    pub tool: String,
    pub target: String,
}

impl HookKey {
    pub fn new(tool: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for HookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tool, self.target)
    }
}

/// One hook together with the repository it is fetched from
#[derive(Debug, Clone, PartialEq)]
pub struct HookEntry {
    pub repo: String,
    pub rev: Option<String>,
    pub hook: Mapping,
}

impl HookEntry {
    pub fn id(&self) -> &str {
        self.hook.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn identity_key(&self) -> HookKey {
        let target = self
            .hook
            .get("files")
            .and_then(Value::as_str)
            .unwrap_or(ANY_TARGET);
        HookKey::new(self.id(), target)
    }
}

/// Repository block as written in a pre-commit document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RepoBlock {
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub hooks: Vec<Mapping>,
}

/// Hooks and top-level settings contributed by one profile
#[derive(Debug, Clone)]
pub struct ConfigFragment {
    pub profile: ProfileId,
    /// Top-level keys other than `repos` (e.g. `fail_fast`, `exclude`)
    pub settings: Mapping,
    pub hooks: Vec<HookEntry>,
}

impl ConfigFragment {
    pub fn new(profile: ProfileId, hooks: Vec<HookEntry>) -> Self {
        Self {
            profile,
            settings: Mapping::new(),
            hooks,
        }
    }

    /// Parse a pre-commit document. `origin` is only used in error messages.
    pub fn parse(profile: ProfileId, content: &str, origin: &Path) -> Result<Self> {
        let invalid = |reason: String| ProfileError::InvalidFragment {
            path: origin.to_path_buf(),
            reason,
        };

        let document: Value =
            serde_yaml_ng::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let mut settings = match document {
            Value::Null => Mapping::new(),
            Value::Mapping(map) => map,
            _ => return Err(invalid("top level must be a mapping".to_string())),
        };

        let repos: Vec<RepoBlock> = match settings.shift_remove("repos") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_yaml_ng::from_value(value).map_err(|e| invalid(e.to_string()))?,
        };

        let mut hooks = Vec::new();
        for block in repos {
            for hook in block.hooks {
                if hook.get("id").and_then(Value::as_str).is_none() {
                    return Err(invalid(format!("hook without an `id` in repo {}", block.repo)));
                }
                hooks.push(HookEntry {
                    repo: block.repo.clone(),
                    rev: block.rev.clone(),
                    hook,
                });
            }
        }

        Ok(Self {
            profile,
            settings,
            hooks,
        })
    }
}

/// Directory with one sub-directory of templates per profile
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile_dir(&self, profile: ProfileId) -> PathBuf {
        self.root.join(profile.spec().template_dir)
    }

    pub fn fragment_path(&self, profile: ProfileId) -> PathBuf {
        self.profile_dir(profile).join(FRAGMENT_FILE)
    }

    pub fn has_fragment(&self, profile: ProfileId) -> bool {
        self.fragment_path(profile).is_file()
    }

    /// Load a profile's fragment; `Ok(None)` when the profile has none
    pub fn load(&self, profile: ProfileId) -> Result<Option<ConfigFragment>> {
        let path = self.fragment_path(profile);
        match fs::read_to_string(&path) {
            Ok(content) => ConfigFragment::parse(profile, &content, &path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(%profile, "No fragment, skipping");
                Ok(None)
            }
            Err(e) => Err(ProfileError::filesystem("read", path)(e)),
        }
    }

    /// Files copied verbatim into the project root when the profile is active,
    /// sorted by name
    pub fn auxiliary_files(&self, profile: ProfileId) -> Result<Vec<PathBuf>> {
        let dir = self.profile_dir(profile);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ProfileError::filesystem("list", dir)(e)),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.file_name().is_some_and(|n| n != FRAGMENT_FILE))
            .collect();
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PYTHON_FRAGMENT: &str = r#"
default_language_version:
  python: python3
repos:
  - repo: https://github.com/psf/black
    rev: 24.4.2
    hooks:
      - id: black
  - repo: https://github.com/PyCQA/bandit
    rev: 1.7.9
    hooks:
      - id: bandit
        args: ["-c", ".bandit.yml"]
        files: \.py$
"#;

    fn parse(content: &str) -> Result<ConfigFragment> {
        ConfigFragment::parse(ProfileId::Python, content, Path::new("python/.pre-commit-config.yaml"))
    }

    #[test]
    fn test_parse_flattens_hooks() {
        let fragment = parse(PYTHON_FRAGMENT).unwrap();
        assert_eq!(fragment.hooks.len(), 2);
        assert_eq!(fragment.hooks[0].id(), "black");
        assert_eq!(fragment.hooks[1].repo, "https://github.com/PyCQA/bandit");
        assert_eq!(fragment.hooks[1].rev.as_deref(), Some("1.7.9"));
        assert!(fragment.settings.contains_key("default_language_version"));
        assert!(!fragment.settings.contains_key("repos"));
    }

    #[test]
    fn test_identity_key() {
        let fragment = parse(PYTHON_FRAGMENT).unwrap();
        assert_eq!(fragment.hooks[0].identity_key().to_string(), "black:*");
        assert_eq!(fragment.hooks[1].identity_key(), HookKey::new("bandit", r"\.py$"));
    }

    #[test]
    fn test_parse_empty_document() {
        let fragment = parse("").unwrap();
        assert!(fragment.hooks.is_empty());
        assert!(fragment.settings.is_empty());
    }

    #[test]
    fn test_parse_rejects_hook_without_id() {
        let err = parse("repos:\n  - repo: local\n    hooks:\n      - name: nameless\n").unwrap_err();
        assert!(matches!(err, ProfileError::InvalidFragment { .. }));
        assert!(err.to_string().contains("without an `id`"));
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        assert!(parse("- just\n- a list\n").is_err());
        assert!(parse("repos: 3\n").is_err());
    }

    #[test]
    fn test_store_missing_profile_is_none() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path());
        assert!(store.load(ProfileId::Pulumi).unwrap().is_none());
        assert!(store.auxiliary_files(ProfileId::Pulumi).unwrap().is_empty());
        assert!(!store.has_fragment(ProfileId::Pulumi));
    }

    #[test]
    fn test_store_load_and_auxiliary_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("python");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(FRAGMENT_FILE), PYTHON_FRAGMENT).unwrap();
        fs::write(dir.join(".bandit.yml"), "skips: []\n").unwrap();
        fs::write(dir.join(".flake8"), "[flake8]\n").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();

        let store = TemplateStore::new(temp.path());
        let fragment = store.load(ProfileId::Python).unwrap().unwrap();
        assert_eq!(fragment.profile, ProfileId::Python);

        let names: Vec<String> = store
            .auxiliary_files(ProfileId::Python)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![".bandit.yml", ".flake8"]);
    }
}
