//! Service settings, loadable from TOML with environment overrides.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding [`ServiceConfig::watchdog_secs`].
pub const WATCHDOG_VAR: &str = "LADDER_WATCHDOG_SECS";

/// Environment variable overriding [`ServiceConfig::worker_threads`].
pub const WORKERS_VAR: &str = "LADDER_WORKER_THREADS";

/// Why a configuration could not be loaded or used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {detail}")]
    File {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O failure.
        detail: String,
    },

    /// The file contents were not valid TOML for this config.
    #[error("failed to parse service configuration: {0}")]
    Parse(String),

    /// An environment override held a value of the wrong shape.
    #[error("environment override {name} is not usable: {value:?}")]
    Env {
        /// The variable that was set.
        name: String,
        /// The value it held.
        value: String,
    },

    /// The assembled configuration failed validation.
    #[error("invalid service configuration: {}", .problems.join("; "))]
    Invalid {
        /// Every problem found, not just the first.
        problems: Vec<String>,
    },
}

/// Settings for the run manager.
///
/// Loaded from TOML with `watchdog_secs` / `worker_threads` keys, then
/// overridden by the `LADDER_WATCHDOG_SECS` and `LADDER_WORKER_THREADS`
/// environment variables. [`ServiceConfig::load`] applies the whole
/// precedence chain and validates the result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Wall-clock budget for one estimation run, in seconds.
    pub watchdog_secs: u64,
    /// How many fits and searches may occupy worker threads at once.
    pub worker_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            watchdog_secs: 45,
            worker_threads: 2,
        }
    }
}

impl ServiceConfig {
    /// The watchdog budget as a [`Duration`].
    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }

    /// Overrides the watchdog budget in seconds.
    pub fn with_watchdog_secs(mut self, secs: u64) -> Self {
        self.watchdog_secs = secs;
        self
    }

    /// Overrides the worker-thread allowance.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::File {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Loads a configuration from all sources and validates it.
    ///
    /// Precedence, highest first: environment variables, then the file (if
    /// one is given), then the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies the `LADDER_*` environment overrides to this configuration.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.overridden(|name| std::env::var(name).ok())
    }

    fn overridden<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(WATCHDOG_VAR) {
            self.watchdog_secs = parse_var(WATCHDOG_VAR, value)?;
        }
        if let Some(value) = lookup(WORKERS_VAR) {
            self.worker_threads = parse_var(WORKERS_VAR, value)?;
        }
        Ok(self)
    }

    /// Checks every field, collecting all problems rather than stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.watchdog_secs == 0 {
            problems.push("watchdog_secs must be at least 1 second".to_string());
        }
        if self.worker_threads == 0 {
            problems.push("worker_threads must be at least 1".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        name: name.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.watchdog_secs, 45);
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.watchdog(), Duration::from_secs(45));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_toml_round_trip() {
        let config = ServiceConfig::from_toml(
            r#"
            watchdog_secs = 120
            worker_threads = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.watchdog_secs, 120);
        assert_eq!(config.worker_threads, 4);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml("worker_threads = 8").unwrap();
        assert_eq!(config.watchdog_secs, 45);
        assert_eq!(config.worker_threads, 8);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ServiceConfig::from_toml("watchdog_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_beat_the_base() {
        let config = ServiceConfig::default()
            .overridden(|name| match name {
                WATCHDOG_VAR => Some("90".to_string()),
                WORKERS_VAR => Some("6".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.watchdog_secs, 90);
        assert_eq!(config.worker_threads, 6);
    }

    #[test]
    fn a_single_override_leaves_the_rest() {
        let config = ServiceConfig::default()
            .overridden(|name| (name == WATCHDOG_VAR).then(|| "10".to_string()))
            .unwrap();
        assert_eq!(config.watchdog_secs, 10);
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn garbage_override_is_an_env_error() {
        let err = ServiceConfig::default()
            .overridden(|name| (name == WORKERS_VAR).then(|| "many".to_string()))
            .unwrap_err();
        match err {
            ConfigError::Env { name, value } => {
                assert_eq!(name, WORKERS_VAR);
                assert_eq!(value, "many");
            }
            other => panic!("expected Env error, got {other:?}"),
        }
    }

    #[test]
    fn validate_collects_every_problem() {
        let config = ServiceConfig::default()
            .with_watchdog_secs(0)
            .with_worker_threads(0);
        match config.validate().unwrap_err() {
            ConfigError::Invalid { problems } => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("watchdog_secs"));
                assert!(problems[1].contains("worker_threads"));
            }
            other => panic!("expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn error_display_names_the_culprit() {
        let err = ConfigError::Invalid {
            problems: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "invalid service configuration: a; b");

        let err = ConfigError::Env {
            name: WATCHDOG_VAR.to_string(),
            value: "soon".to_string(),
        };
        assert!(err.to_string().contains("LADDER_WATCHDOG_SECS"));
    }
}
