// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! snooze-core: data model and schedule evaluation for the snooze controller
//!
//! This crate provides:
//! - The window control object, its status, and managed resources
//! - Annotation keys used for opt-in and backup records
//! - A pure schedule evaluator (cron and one-off windows, timezone aware)
//! - A clock abstraction for deterministic tests

pub mod clock;
pub mod keys;
pub mod phase;
pub mod resource;
pub mod schedule;
pub mod status;
pub mod window;

pub use clock::{Clock, FakeClock, SystemClock};
pub use keys::{AnnotationKeys, DEFAULT_PREFIX};
pub use phase::Phase;
pub use resource::{LabelSelector, ManagedResource, ObjectMeta, ResourceRef};
pub use schedule::{evaluate, Evaluation, Evaluator, ScheduleError, ScheduleSpec};
pub use status::{Condition, ConditionStatus, SnoozeWindowStatus};
pub use window::{
    BackupConfig, Manifest, PatchKind, ResourceKindSpec, SnoozeAction, SnoozeWindow,
    SnoozeWindowSpec, WindowMeta, WindowRef,
};
