//! Logging setup and timing for repokit
//!
//! Diagnostics go to stderr so that command output on stdout (including
//! `--json` documents and `env` exports) stays machine-readable.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "REPOKIT_LOG";

/// Initialize with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), &config.log_level);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", directive, e))?;

    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_target(config.show_target)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!config.json).then(|| {
        fmt::layer()
            .with_target(config.show_target)
            .with_writer(std::io::stderr)
            .compact()
    });

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        filter = %directive,
        "Logging initialized"
    );

    Ok(())
}

/// `REPOKIT_LOG` wins over the configured level when set and non-empty
fn filter_directive(env: Option<String>, level: &str) -> String {
    match env {
        Some(value) if !value.trim().is_empty() => value,
        _ => level.to_string(),
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
            show_target: false,
        }
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Time since the timer started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and log the duration
    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.name,
            duration_ms = duration.as_millis(),
            "Timer completed"
        );
        duration
    }
}

/// Enter an info span named after the operation for the rest of the scope
#[macro_export]
macro_rules! timed_span {
    ($name:expr) => {
        let _span = tracing::info_span!($name).entered();
    };
    ($name:expr, $($field:tt)*) => {
        let _span = tracing::info_span!($name, $($field)*).entered();
    };
}
