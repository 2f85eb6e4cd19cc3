// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Snooze engine: resource adapters, batch dispatch, and reconciliation

mod dispatch;
mod error;
mod reconciler;
mod requeue;
pub mod resource;

pub use dispatch::{BatchReport, Dispatcher};
pub use error::{AdapterError, BatchOp, EngineError};
pub use reconciler::{Reconciler, ReconcilerConfig, TickOutcome};
pub use requeue::RequeueQueue;
pub use resource::{KindClass, ResourceAdapter, SnoozeTarget};
