//! Configuration loading for Silently.
//!
//! The config lives at `~/.silently/config.toml`, or wherever
//! `SILENTLY_CONFIG` points. A missing default file means defaults; a missing
//! `SILENTLY_CONFIG` target is an error.
//!
//! ```toml
//! [log]
//! filter = "info"
//!
//! [orphans]
//! policy = "escalate"   # swallow | log | escalate
//!
//! [scenarios]
//! async_failures = false
//! fire_and_forget = false
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use silently_types::{OrphanPolicy, OrphanPolicyParseError};

pub const CONFIG_PATH_ENV: &str = "SILENTLY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid orphan policy in {}: {source}", path.display())]
    Policy {
        path: PathBuf,
        source: OrphanPolicyParseError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Policy { path, .. } => path,
        }
    }
}

// Raw TOML shapes. Resolved into `SilentlyConfig` at the parse boundary.

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    log: Option<RawLogConfig>,
    orphans: Option<RawOrphanConfig>,
    scenarios: Option<RawScenarioConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogConfig {
    filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOrphanConfig {
    policy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenarioConfig {
    #[serde(default)]
    async_failures: bool,
    #[serde(default)]
    fire_and_forget: bool,
}

/// Which optional scenario groups the driver runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioSettings {
    /// Run the completion-failure scenarios that the suppression combinator
    /// cannot cover.
    pub async_failures: bool,
    /// Also drop one failing deferred unobserved, to exercise the orphan policy.
    pub fire_and_forget: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SilentlyConfig {
    /// `tracing` filter directive. `RUST_LOG` still wins when set.
    pub log_filter: Option<String>,
    pub orphan_policy: OrphanPolicy,
    pub scenarios: ScenarioSettings,
}

impl SilentlyConfig {
    /// Load from `SILENTLY_CONFIG` or the default location.
    ///
    /// `Ok(None)` when no `SILENTLY_CONFIG` is set and the default file does
    /// not exist.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_located(override_path(), default_path())
    }

    fn load_located(
        explicit: Option<PathBuf>,
        fallback: Option<PathBuf>,
    ) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(&path).map(Some);
        }
        match fallback {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        Self::parse(&content, path)
    }

    /// Parse config text. `origin` is used only for error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = match toml::from_str(content) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", origin, err);
                return Err(ConfigError::Parse {
                    path: origin.to_path_buf(),
                    source: err,
                });
            }
        };
        Self::resolve(raw, origin)
    }

    fn resolve(raw: RawConfig, origin: &Path) -> Result<Self, ConfigError> {
        let log_filter = raw
            .log
            .and_then(|log| log.filter)
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty());

        let orphan_policy = match raw.orphans.and_then(|orphans| orphans.policy) {
            Some(policy) => policy.parse().map_err(|source| ConfigError::Policy {
                path: origin.to_path_buf(),
                source,
            })?,
            None => OrphanPolicy::default(),
        };

        let scenarios = raw
            .scenarios
            .map(|s| ScenarioSettings {
                async_failures: s.async_failures,
                fire_and_forget: s.fire_and_forget,
            })
            .unwrap_or_default();

        Ok(Self {
            log_filter,
            orphan_policy,
            scenarios,
        })
    }
}

/// `SILENTLY_CONFIG`, if set and non-blank.
fn override_path() -> Option<PathBuf> {
    let raw = env::var(CONFIG_PATH_ENV).ok()?;
    let raw = raw.trim();
    (!raw.is_empty()).then(|| PathBuf::from(raw))
}

fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".silently").join("config.toml"))
}
