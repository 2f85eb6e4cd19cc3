// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{
    CronExpr, CronSchedule, ResolvedWindow, ScheduleError, ScheduleShape, ScheduleSpec,
    WindowSchedule,
};
use crate::Phase;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;

/// Tick granularity used to detect boundary crossings
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

const MIN_NEXT_CHECK: Duration = Duration::from_secs(1);

/// The outcome of evaluating a schedule at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Phase the schedule asks for right now
    pub phase: Phase,
    /// A snooze or wake boundary passed within the last interval
    pub boundary_crossed: bool,
    /// How long to wait before evaluating again
    pub next_check: Duration,
}

/// Evaluates schedules against wall-clock time.
///
/// Stateless: every call recomputes the phase from `now`, so there is no
/// "already snoozed" memory to get out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    interval: Duration,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Evaluator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_NEXT_CHECK),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn evaluate(
        &self,
        spec: &ScheduleSpec,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, ScheduleError> {
        let tz = spec.resolve_timezone()?;
        match spec.shape()? {
            ScheduleShape::Cron(cron) => self.evaluate_cron(cron, tz, now),
            ScheduleShape::Window(window) => self.evaluate_window(window, tz, now),
        }
    }

    fn chrono_interval(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.interval).unwrap_or(chrono::Duration::minutes(1))
    }

    fn evaluate_cron(
        &self,
        cron: &CronSchedule,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, ScheduleError> {
        let snooze = CronExpr::parse(&cron.snooze_at)?;
        let wake = CronExpr::parse(&cron.wake_at)?;
        let local_now = now.with_timezone(&tz);

        // None orders before Some, so a schedule that never fired loses
        let phase = if snooze.last_firing(&local_now) > wake.last_firing(&local_now) {
            Phase::Snoozed
        } else {
            Phase::Awake
        };

        let interval = self.chrono_interval();
        let boundary_crossed =
            snooze.fired_within(&local_now, interval) || wake.fired_within(&local_now, interval);

        let next_firing = [snooze.next_firing(&local_now), wake.next_firing(&local_now)]
            .into_iter()
            .flatten()
            .min();
        let next_check = match next_firing {
            Some(at) => until(now, at.with_timezone(&Utc)).unwrap_or(self.interval),
            None => self.interval,
        };

        Ok(Evaluation {
            phase,
            boundary_crossed,
            next_check,
        })
    }

    fn evaluate_window(
        &self,
        window: &WindowSchedule,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, ScheduleError> {
        let resolved = ResolvedWindow::resolve(window, tz)?;
        let interval = self.chrono_interval();

        let boundary_crossed = resolved.end <= now && now < resolved.end + interval;

        let (phase, next_check) = if resolved.contains(now) {
            let remaining = until(now, resolved.end).unwrap_or(self.interval);
            (Phase::Snoozed, remaining)
        } else if now < resolved.start {
            let to_start = until(now, resolved.start).unwrap_or(self.interval);
            (Phase::Awake, to_start.min(self.interval))
        } else {
            (Phase::Awake, self.interval)
        };

        Ok(Evaluation {
            phase,
            boundary_crossed,
            next_check,
        })
    }
}

/// Time from `now` until `at`, at least one second
fn until(now: DateTime<Utc>, at: DateTime<Utc>) -> Option<Duration> {
    (at - now).to_std().ok().map(|d| d.max(MIN_NEXT_CHECK))
}

/// Evaluate with the default one-minute interval
pub fn evaluate(spec: &ScheduleSpec, now: DateTime<Utc>) -> Result<Evaluation, ScheduleError> {
    Evaluator::default().evaluate(spec, now)
}

#[cfg(test)]
#[path = "evaluate_tests.rs"]
mod tests;
