//! Profile identifiers and the capability table
//!
//! Every profile is described by one [`ProfileSpec`] row in [`PROFILES`]: the
//! template directory it draws from, the marker files that detect it, the
//! tools its hooks drive, and the directories it wants on `PATH`. Adding a
//! profile means adding a variant and a row.

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tool profile.
///
/// Variants are declared in lexicographic order of their identifiers, so the
/// derived `Ord` is the identifier string order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileId {
    Bash,
    Common,
    Go,
    Js,
    Pulumi,
    Python,
    Terraform,
}

impl ProfileId {
    /// Every profile, in identifier order
    pub const ALL: [ProfileId; 7] = [
        ProfileId::Bash,
        ProfileId::Common,
        ProfileId::Go,
        ProfileId::Js,
        ProfileId::Pulumi,
        ProfileId::Python,
        ProfileId::Terraform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileId::Bash => "bash",
            ProfileId::Common => "common",
            ProfileId::Go => "go",
            ProfileId::Js => "js",
            ProfileId::Pulumi => "pulumi",
            ProfileId::Python => "python",
            ProfileId::Terraform => "terraform",
        }
    }

    /// Capability row for this profile
    pub fn spec(&self) -> &'static ProfileSpec {
        PROFILES
            .iter()
            .find(|spec| spec.id == *self)
            .unwrap_or(&PROFILES[0])
    }

    /// Comma-separated list of valid identifiers, for error messages
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(ProfileId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileId {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self> {
        let candidate = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == candidate)
            .ok_or_else(|| ProfileError::InvalidProfile {
                candidate: candidate.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// A filesystem-presence predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// A file with this exact name in the project root
    File(&'static str),
    /// Any file with this extension in the project root
    Extension(&'static str),
    /// Any file with one of these extensions anywhere under the root
    NestedExtension(&'static [&'static str]),
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::File(name) => f.write_str(name),
            Marker::Extension(ext) => write!(f, "*.{}", ext),
            Marker::NestedExtension(exts) => {
                let globs: Vec<String> = exts.iter().map(|e| format!("**/*.{}", e)).collect();
                f.write_str(&globs.join(", "))
            }
        }
    }
}

/// Capability record for one profile
#[derive(Debug)]
pub struct ProfileSpec {
    pub id: ProfileId,
    /// Sub-directory of the templates root holding this profile's fragment
    pub template_dir: &'static str,
    /// Detection predicates; empty means never auto-detected
    pub markers: &'static [Marker],
    /// External tools wired up by this profile's hooks
    pub tools: &'static [&'static str],
    /// Project-relative directories to prepend to `PATH`
    pub search_paths: &'static [&'static str],
}

pub static PROFILES: [ProfileSpec; 7] = [
    ProfileSpec {
        id: ProfileId::Bash,
        template_dir: "bash",
        markers: &[Marker::NestedExtension(&["sh", "bash"])],
        tools: &["shellcheck", "shfmt"],
        search_paths: &[],
    },
    ProfileSpec {
        id: ProfileId::Common,
        template_dir: "common",
        markers: &[],
        tools: &["gitleaks", "trufflehog", "yamllint", "pre-commit-hooks"],
        search_paths: &[],
    },
    ProfileSpec {
        id: ProfileId::Go,
        template_dir: "go",
        markers: &[Marker::File("go.mod"), Marker::File("go.sum")],
        tools: &["gofmt", "go vet", "golangci-lint", "gosec"],
        search_paths: &["bin"],
    },
    ProfileSpec {
        id: ProfileId::Js,
        template_dir: "js",
        markers: &[
            Marker::File("package.json"),
            Marker::File("yarn.lock"),
            Marker::File("pnpm-lock.yaml"),
        ],
        tools: &["eslint", "prettier", "npm audit"],
        search_paths: &["node_modules/.bin"],
    },
    ProfileSpec {
        id: ProfileId::Pulumi,
        template_dir: "pulumi",
        markers: &[Marker::File("Pulumi.yaml"), Marker::File("Pulumi.yml")],
        tools: &["pulumi"],
        search_paths: &[],
    },
    ProfileSpec {
        id: ProfileId::Python,
        template_dir: "python",
        markers: &[
            Marker::File("requirements.txt"),
            Marker::File("setup.py"),
            Marker::File("pyproject.toml"),
            Marker::File("Pipfile"),
        ],
        tools: &["black", "isort", "flake8", "bandit", "safety"],
        search_paths: &[".venv/bin"],
    },
    ProfileSpec {
        id: ProfileId::Terraform,
        template_dir: "terraform",
        markers: &[Marker::Extension("tf"), Marker::File("terragrunt.hcl")],
        tools: &["terraform fmt", "terraform validate", "tflint", "tfsec"],
        search_paths: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_profile() {
        for id in ProfileId::ALL {
            assert_eq!(id.as_str().parse::<ProfileId>().unwrap(), id);
        }
        assert_eq!(" go\n".parse::<ProfileId>().unwrap(), ProfileId::Go);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "bogus".parse::<ProfileId>().unwrap_err();
        match err {
            ProfileError::InvalidProfile { candidate, valid } => {
                assert_eq!(candidate, "bogus");
                assert_eq!(valid, "bash, common, go, js, pulumi, python, terraform");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!("Python".parse::<ProfileId>().is_err());
        assert!("".parse::<ProfileId>().is_err());
    }

    #[test]
    fn test_order_matches_identifier_order() {
        let mut by_name = ProfileId::ALL.to_vec();
        by_name.sort_by_key(|id| id.as_str());
        assert_eq!(by_name, ProfileId::ALL.to_vec());

        let mut by_ord = ProfileId::ALL.to_vec();
        by_ord.reverse();
        by_ord.sort();
        assert_eq!(by_ord, ProfileId::ALL.to_vec());
    }

    #[test]
    fn test_table_covers_every_profile_once() {
        for id in ProfileId::ALL {
            let rows = PROFILES.iter().filter(|spec| spec.id == id).count();
            assert_eq!(rows, 1, "{id} must have exactly one row");
            assert_eq!(id.spec().id, id);
            assert_eq!(id.spec().template_dir, id.as_str());
        }
    }

    #[test]
    fn test_common_is_never_detected() {
        assert!(ProfileId::Common.spec().markers.is_empty());
    }

    #[test]
    fn test_serde_uses_identifiers() {
        let json = serde_json::to_string(&ProfileId::Terraform).unwrap();
        assert_eq!(json, "\"terraform\"");
    }

    #[test]
    fn test_marker_display() {
        assert_eq!(Marker::File("go.mod").to_string(), "go.mod");
        assert_eq!(Marker::Extension("tf").to_string(), "*.tf");
        assert_eq!(
            Marker::NestedExtension(&["sh", "bash"]).to_string(),
            "**/*.sh, **/*.bash"
        );
    }
}
