// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! High-level phase of a snooze window

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the resources governed by a window are currently awake or snoozed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Awake,
    Snoozed,
}

impl Phase {
    pub fn is_snoozed(self) -> bool {
        self == Phase::Snoozed
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Awake => write!(f, "awake"),
            Phase::Snoozed => write!(f, "snoozed"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awake" => Ok(Phase::Awake),
            "snoozed" => Ok(Phase::Snoozed),
            _ => Err(format!("unknown phase: {}", s)),
        }
    }
}
