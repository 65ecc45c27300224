//! Configuration schema definitions

use crate::error::Result;
use crate::validation::Validator;
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[general]`
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[checks]`
    #[serde(default)]
    pub checks: ChecksConfig,

    /// `[detect]`
    #[serde(default)]
    pub detect: DetectConfig,

    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Validate values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let mut validator = Validator::new()
            .required("general.templates_dir", &self.general.templates_dir)
            .required("general.state_file", &self.general.state_file)
            .required("general.output_file", &self.general.output_file)
            .custom("general.output_file", || {
                (self.general.state_file == self.general.output_file)
                    .then(|| "must differ from general.state_file".to_string())
            })
            .custom("logging.level", || {
                let known = ["error", "warn", "info", "debug", "trace"];
                (!known.contains(&self.logging.level.as_str()))
                    .then(|| format!("must be one of: {}", known.join(", ")))
            });

        for check in &self.checks.opt_in {
            validator = validator.check_name("checks.opt_in", check);
        }
        for pattern in &self.detect.exclude {
            validator = validator.glob("detect.exclude", pattern);
        }

        validator.validate().to_result()
    }
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding one sub-directory of templates per profile
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Profile state file, relative to the project root
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Merged pre-commit config, relative to the project root
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            state_file: default_state_file(),
            output_file: default_output_file(),
        }
    }
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_state_file() -> String {
    ".repokit-profile".to_string()
}

fn default_output_file() -> String {
    ".pre-commit-config.yaml".to_string()
}

/// Check selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChecksConfig {
    /// Hook ids left out of the merged config unless explicitly enabled
    #[serde(default)]
    pub opt_in: Vec<String>,
}

/// Profile detection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetectConfig {
    /// Directory globs skipped by recursive marker searches
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level used when `REPOKIT_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConfigSchema::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [checks]
            opt_in = ["hadolint"]
            "#,
        )
        .unwrap();

        assert_eq!(schema.general.output_file, ".pre-commit-config.yaml");
        assert_eq!(schema.checks.opt_in, vec!["hadolint"]);
        assert_eq!(schema.logging.level, "warn");
    }

    #[test]
    fn test_same_state_and_output_rejected() {
        let mut schema = ConfigSchema::default();
        schema.general.output_file = schema.general.state_file.clone();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_bad_opt_in_rejected() {
        let mut schema = ConfigSchema::default();
        schema.checks.opt_in.push("two words".to_string());
        let err = schema.validate().unwrap_err();
        assert!(err.message.contains("checks.opt_in"));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut schema = ConfigSchema::default();
        schema.logging.level = "loud".to_string();
        assert!(schema.validate().is_err());
    }
}
