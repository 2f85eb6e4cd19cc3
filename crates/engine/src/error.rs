// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the snooze engine

use snooze_adapters::StoreError;
use snooze_core::{ResourceRef, ScheduleError};
use std::fmt;
use thiserror::Error;

/// Errors from snoozing or waking a single resource
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("corrupt backup record {key} on {resource}: {reason}")]
    BackupCorrupt {
        resource: ResourceRef,
        key: String,
        reason: String,
    },
    #[error("kind {kind} does not support action {action}")]
    UnsupportedKind { kind: String, action: &'static str },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which batch operation was running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    Snooze,
    Wake,
}

impl fmt::Display for BatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOp::Snooze => write!(f, "snooze"),
            BatchOp::Wake => write!(f, "wake"),
        }
    }
}

/// Errors from a reconciliation tick
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{operation} failed on {resource}: {source}")]
    PartialBatchFailure {
        operation: BatchOp,
        resource: ResourceRef,
        source: AdapterError,
    },
}

impl EngineError {
    /// Condition reason recorded on the window when a tick fails
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::Schedule(e) => e.reason(),
            EngineError::Store(_) => "StoreError",
            EngineError::PartialBatchFailure {
                operation: BatchOp::Snooze,
                ..
            } => "SnoozeFailed",
            EngineError::PartialBatchFailure {
                operation: BatchOp::Wake,
                ..
            } => "WakeFailed",
        }
    }
}
