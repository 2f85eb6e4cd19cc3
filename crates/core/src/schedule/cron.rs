// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Five-field cron expressions
//!
//! The `cron` crate expects a leading seconds field and numbers weekdays
//! 1 (Sunday) through 7. Expressions are written in classic five-field form
//! with 0 or 7 meaning Sunday, so numeric weekdays are rewritten to names
//! before parsing.

use super::ScheduleError;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use std::collections::BTreeSet;
use std::str::FromStr;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Progressively wider lookback windows, in hours, used to find the most
/// recent firing. The last one covers a leap-year cycle.
const LOOKBACK_HOURS: [i64; 6] = [1, 24, 24 * 8, 24 * 32, 24 * 367, 24 * 1462];

/// A parsed five-field cron expression
#[derive(Debug, Clone)]
pub struct CronExpr {
    source: String,
    schedule: cron::Schedule,
}

impl CronExpr {
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, day_of_month, month, day_of_week] = fields.as_slice() else {
            return Err(ScheduleError::InvalidSchedule(format!(
                "cron expression must have 5 fields, got {}: '{}'",
                fields.len(),
                expr
            )));
        };

        let day_of_week = normalize_day_of_week(day_of_week)
            .map_err(|reason| invalid_cron(expr, &reason))?;
        let six_field = format!(
            "0 {} {} {} {} {}",
            minute, hour, day_of_month, month, day_of_week
        );
        let schedule =
            cron::Schedule::from_str(&six_field).map_err(|e| invalid_cron(expr, &e.to_string()))?;

        Ok(Self {
            source: expr.to_string(),
            schedule,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Most recent firing at or before `now`
    pub fn last_firing(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        for hours in LOOKBACK_HOURS {
            let Some(from) = now.checked_sub_signed(Duration::hours(hours)) else {
                break;
            };
            let last = self
                .schedule
                .after(&from)
                .take_while(|firing| firing <= now)
                .last();
            if last.is_some() {
                return last;
            }
        }
        None
    }

    /// First firing strictly after `now`
    pub fn next_firing(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(now).next()
    }

    /// Whether the schedule fired in `(now - interval, now]`
    pub fn fired_within(&self, now: &DateTime<Tz>, interval: Duration) -> bool {
        let Some(from) = now.checked_sub_signed(interval) else {
            return false;
        };
        self.schedule
            .after(&from)
            .next()
            .is_some_and(|firing| firing <= *now)
    }
}

fn invalid_cron(expr: &str, reason: &str) -> ScheduleError {
    ScheduleError::InvalidSchedule(format!("invalid cron expression '{}': {}", expr, reason))
}

/// Rewrite numeric weekdays (0-7, Sunday = 0 or 7) into day names.
///
/// Items already using names, `?`, or a bare `*` are passed through.
fn normalize_day_of_week(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" {
        return Ok(field.to_string());
    }

    let mut days = BTreeSet::new();
    let mut named = Vec::new();

    for item in field.split(',') {
        let (base, step) = match item.split_once('/') {
            Some((base, step)) => {
                let step: usize = step
                    .parse()
                    .map_err(|_| format!("step '{}' is not a number", step))?;
                if step == 0 {
                    return Err("step must be greater than zero".to_string());
                }
                (base, step)
            }
            None => (item, 1),
        };

        if base == "?" || base.chars().any(|c| c.is_ascii_alphabetic()) {
            named.push(item.to_string());
            continue;
        }

        let (lo, hi) = if base == "*" {
            (0, 6)
        } else if let Some((lo, hi)) = base.split_once('-') {
            (parse_day(lo)?, parse_day(hi)?)
        } else {
            let day = parse_day(base)?;
            (day, if item.contains('/') { 6 } else { day })
        };
        if lo > hi {
            return Err(format!("day range {}-{} is reversed", lo, hi));
        }

        days.extend((lo..=hi).step_by(step).map(|d| d % 7));
    }

    let mut names: Vec<String> = days
        .into_iter()
        .filter_map(|d| DAY_NAMES.get(d).map(|name| name.to_string()))
        .collect();
    names.extend(named);
    Ok(names.join(","))
}

fn parse_day(s: &str) -> Result<usize, String> {
    let day: usize = s
        .parse()
        .map_err(|_| format!("day of week '{}' is not a number", s))?;
    if day > 7 {
        return Err(format!("day of week {} out of range 0-7", day));
    }
    Ok(day)
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
