// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative schedule shapes

use super::ScheduleError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A pair of cron expressions: one that snoozes, one that wakes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronSchedule {
    /// Five-field cron expression for the snooze firing
    pub snooze_at: String,
    /// Five-field cron expression for the wake firing
    pub wake_at: String,
}

/// A one-off window anchored on a calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSchedule {
    /// Start time of day, `HH:MM`
    pub start: String,
    /// End time of day, `HH:MM`; at or before `start` means the next day
    pub end: String,
    /// Anchor date, `YYYY-MM-DD`
    pub date: String,
}

/// When a window snoozes. Exactly one of `cron` or `window` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<CronSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowSchedule>,
    /// IANA timezone name; UTC when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// The validated shape of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleShape<'a> {
    Cron(&'a CronSchedule),
    Window(&'a WindowSchedule),
}

impl ScheduleSpec {
    pub fn cron(snooze_at: impl Into<String>, wake_at: impl Into<String>) -> Self {
        Self {
            cron: Some(CronSchedule {
                snooze_at: snooze_at.into(),
                wake_at: wake_at.into(),
            }),
            ..Self::default()
        }
    }

    pub fn window(
        start: impl Into<String>,
        end: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            window: Some(WindowSchedule {
                start: start.into(),
                end: end.into(),
                date: date.into(),
            }),
            ..Self::default()
        }
    }

    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Exactly one shape must be populated
    pub fn shape(&self) -> Result<ScheduleShape<'_>, ScheduleError> {
        match (&self.cron, &self.window) {
            (Some(cron), None) => Ok(ScheduleShape::Cron(cron)),
            (None, Some(window)) => Ok(ScheduleShape::Window(window)),
            (None, None) => Err(ScheduleError::InvalidSchedule(
                "neither cron nor window schedule is set".to_string(),
            )),
            (Some(_), Some(_)) => Err(ScheduleError::InvalidSchedule(
                "cron and window schedules are mutually exclusive".to_string(),
            )),
        }
    }

    pub fn resolve_timezone(&self) -> Result<Tz, ScheduleError> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(Tz::UTC),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ScheduleError::InvalidTimezone(name.to_string())),
        }
    }
}
