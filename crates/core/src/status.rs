// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observed status of a snooze window

use crate::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condition type reporting whether the last tick succeeded
pub const READY: &str = "Ready";
/// Condition type mirroring the phase
pub const SNOOZED: &str = "Snoozed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default)]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeWindowStatus {
    #[serde(default)]
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snooze_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_wake_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_check_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub managed_resources: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl SnoozeWindowStatus {
    pub fn condition(&self, kind: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.kind == kind)
    }

    /// Insert or update a condition.
    ///
    /// `last_transition_time` moves only when the status value changes.
    pub fn set_condition(
        &mut self,
        kind: &str,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        let reason = reason.into();
        let message = message.into();
        if let Some(existing) = self.conditions.iter_mut().find(|c| c.kind == kind) {
            if existing.status != status {
                existing.last_transition_time = now;
            }
            existing.status = status;
            existing.reason = reason;
            existing.message = message;
            return;
        }
        self.conditions.push(Condition {
            kind: kind.to_string(),
            status,
            reason,
            message,
            last_transition_time: now,
        });
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
