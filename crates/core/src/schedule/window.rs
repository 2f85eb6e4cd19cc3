// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-off windows anchored on a calendar date

use super::{ScheduleError, WindowSchedule};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A window schedule pinned to absolute instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ResolvedWindow {
    /// Combine the anchor date with the start and end times in `tz`.
    ///
    /// An end at or before the start falls on the following day.
    pub fn resolve(window: &WindowSchedule, tz: Tz) -> Result<Self, ScheduleError> {
        let date = NaiveDate::parse_from_str(window.date.trim(), "%Y-%m-%d").map_err(|e| {
            ScheduleError::InvalidSchedule(format!("invalid date '{}': {}", window.date, e))
        })?;
        let start_time = parse_time_of_day(&window.start)?;
        let end_time = parse_time_of_day(&window.end)?;

        let end_date = if end_time <= start_time {
            date.succ_opt().ok_or_else(|| {
                ScheduleError::InvalidSchedule(format!("date '{}' has no next day", window.date))
            })?
        } else {
            date
        };

        let start = localize(tz, date.and_time(start_time))?;
        let end = localize(tz, end_date.and_time(end_time))?;
        Ok(Self { start, end })
    }

    /// Active iff `now` is in `[start, end)`
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| ScheduleError::InvalidSchedule(format!("invalid time '{}': {}", s, e)))
}

/// Pin a local wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant; times
/// skipped by clocks going forward move one hour later.
fn localize(tz: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, ScheduleError> {
    let resolved = match tz.from_local_datetime(&local) {
        LocalResult::Single(at) => Some(at),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => local
            .checked_add_signed(Duration::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest()),
    };
    resolved
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| {
            ScheduleError::InvalidSchedule(format!("local time {} does not exist in {}", local, tz))
        })
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
