// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, read from `snoozed.toml`

use serde::Deserialize;
use snooze_core::{AnnotationKeys, DEFAULT_PREFIX};
use snooze_engine::ReconcilerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "snoozed.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Invalid config {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// The file as written; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    state_dir: Option<PathBuf>,
    manifests_dir: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    poll_interval: Option<Duration>,
    #[serde(with = "humantime_serde")]
    error_backoff: Option<Duration>,
    #[serde(with = "humantime_serde")]
    max_requeue: Option<Duration>,
    annotation_prefix: Option<String>,
}

/// Resolved daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the WAL, lock file, and log
    pub state_dir: PathBuf,
    /// Directory of `*.json` manifests imported at startup
    pub manifests_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the write-ahead log
    pub wal_path: PathBuf,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub max_requeue: Duration,
    pub annotation_prefix: String,
}

impl Config {
    /// Load from `path`, or from `snoozed.toml` in the default state
    /// directory. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_dir = default_state_dir()?;
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_dir.join(CONFIG_FILE),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(ConfigError::Read(path, e)),
        };
        let raw: RawConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.clone(), e))?;
        Self::resolve(raw, default_dir)
    }

    /// Parse a config document, with `default_dir` as the fallback state dir
    pub fn from_toml(content: &str, default_dir: PathBuf) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(PathBuf::from(CONFIG_FILE), e))?;
        Self::resolve(raw, default_dir)
    }

    fn resolve(raw: RawConfig, default_dir: PathBuf) -> Result<Self, ConfigError> {
        let defaults = ReconcilerConfig::default();
        let state_dir = raw.state_dir.unwrap_or(default_dir);
        let manifests_dir = raw
            .manifests_dir
            .unwrap_or_else(|| state_dir.join("manifests"));

        let config = Self {
            lock_path: state_dir.join("snoozed.pid"),
            log_path: state_dir.join("snoozed.log"),
            wal_path: state_dir.join("snooze.wal"),
            state_dir,
            manifests_dir,
            poll_interval: raw.poll_interval.unwrap_or(defaults.interval),
            error_backoff: raw.error_backoff.unwrap_or(defaults.error_backoff),
            max_requeue: raw.max_requeue.unwrap_or(defaults.max_requeue),
            annotation_prefix: raw
                .annotation_prefix
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
        };

        for (name, value) in [
            ("poll_interval", config.poll_interval),
            ("error_backoff", config.error_backoff),
            ("max_requeue", config.max_requeue),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }
        Ok(config)
    }

    pub fn reconciler(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            keys: AnnotationKeys::with_prefix(&self.annotation_prefix),
            interval: self.poll_interval,
            error_backoff: self.error_backoff,
            max_requeue: self.max_requeue,
        }
    }
}

/// Get the state directory for snoozed
fn default_state_dir() -> Result<PathBuf, ConfigError> {
    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("snooze"));
    }

    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/snooze"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
