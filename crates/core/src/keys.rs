// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata keys the engine reads and writes on managed resources
//!
//! Keys are carried as a value rather than constants so that each window,
//! daemon, or test can use its own prefix.

/// Default annotation prefix
pub const DEFAULT_PREFIX: &str = "kube-snooze";

/// Annotation keys used for opt-in and backup records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationKeys {
    /// Opt-in marker; only `"true"` makes a resource eligible
    pub enabled: String,
    /// Pre-snooze replica count, string-encoded integer
    pub backup_replicas: String,
    /// Pre-snooze suspend flag, `"true"` or `"false"`
    pub backup_suspend: String,
    /// Serialized pre-snooze `spec`
    pub backup_state: String,
    /// Per-resource marker requesting a full-state backup
    pub full_state: String,
}

impl AnnotationKeys {
    /// Build the key set under `prefix`, e.g. `kube-snooze/enabled`
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self {
            enabled: format!("{}/enabled", prefix),
            backup_replicas: format!("{}/backup-replicas", prefix),
            backup_suspend: format!("{}/backup-suspend", prefix),
            backup_state: format!("{}/backup-state", prefix),
            full_state: format!("{}/backup-full-state", prefix),
        }
    }

    /// Every key that belongs to a backup record
    pub fn backup_keys(&self) -> [&str; 3] {
        [
            self.backup_replicas.as_str(),
            self.backup_suspend.as_str(),
            self.backup_state.as_str(),
        ]
    }
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}
