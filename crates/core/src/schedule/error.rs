// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from validating or evaluating a schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

impl ScheduleError {
    /// Short machine-readable reason, used for status conditions
    pub fn reason(&self) -> &'static str {
        match self {
            ScheduleError::InvalidSchedule(_) => "InvalidSchedule",
            ScheduleError::InvalidTimezone(_) => "InvalidTimezone",
        }
    }
}
