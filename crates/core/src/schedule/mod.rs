// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule evaluation
//!
//! Turns a declarative [`ScheduleSpec`] and the current wall-clock time into
//! the phase a window should be in and how long to wait before looking again.

mod cron;
mod error;
mod evaluate;
mod spec;
mod window;

pub use cron::CronExpr;
pub use error::ScheduleError;
pub use evaluate::{evaluate, Evaluation, Evaluator, DEFAULT_INTERVAL};
pub use spec::{CronSchedule, ScheduleShape, ScheduleSpec, WindowSchedule};
pub use window::ResolvedWindow;
