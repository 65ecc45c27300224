//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Project-local configuration candidates, relative to the project root
const CANDIDATES: [&str; 3] = [".repokit.toml", "repokit.toml", ".config/repokit.toml"];

/// Configuration wrapper. `Config::default()` carries defaults and no file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, `None` for defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, the project root, or the
    /// user config directory, falling back to defaults
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(p) if !p.is_file() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(root),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        schema
            .validate()
            .context(match &config_path {
                Some(p) => format!("While validating {}", p.display()),
                None => "While validating default configuration".to_string(),
            })?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Replace the configured templates directory
    pub fn with_templates_dir(mut self, dir: impl Into<String>) -> Self {
        self.schema.general.templates_dir = dir.into();
        self
    }

    /// Templates directory with `~` expanded, resolved against the project root
    pub fn templates_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.schema.general.templates_dir)
    }

    /// Absolute location of the profile state file
    pub fn state_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.schema.general.state_file)
    }

    /// Absolute location of the merged pre-commit config
    pub fn output_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.schema.general.output_file)
    }
}

fn resolve(root: &Path, value: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(value).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|p| p.is_file())
        .or_else(|| {
            dirs::config_dir()
                .map(|d| d.join("repokit").join("config.toml"))
                .filter(|p| p.is_file())
        })
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::new(
            ErrorCode::ConfigError,
            format!("Failed to read config file {}", path.display()),
        )
        .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.general.state_file, ".repokit-profile");
    }

    #[test]
    fn test_config_load_project_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".repokit.toml"),
            "[general]\noutput_file = \"hooks.yaml\"\n",
        )
        .unwrap();

        let config = Config::load(temp.path(), None).unwrap();
        assert_eq!(config.path, Some(temp.path().join(".repokit.toml")));
        assert_eq!(config.output_path(temp.path()), temp.path().join("hooks.yaml"));
    }

    #[test]
    fn test_config_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(temp.path(), Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[general\n").unwrap();

        let err = Config::load(temp.path(), Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_config_validation_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repokit.toml");
        std::fs::write(&path, "[general]\nstate_file = \"x\"\noutput_file = \"x\"\n").unwrap();

        let err = Config::load(temp.path(), Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
    }

    #[test]
    fn test_templates_dir_resolution() {
        let root = Path::new("/work/project");
        let config = Config::default();
        assert_eq!(config.templates_dir(root), PathBuf::from("/work/project/templates"));

        let config = config.with_templates_dir("/opt/repokit/templates");
        assert_eq!(config.templates_dir(root), PathBuf::from("/opt/repokit/templates"));
    }
}
