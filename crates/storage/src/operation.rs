// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use serde::{Deserialize, Serialize};
use snooze_core::{ManagedResource, ResourceRef, SnoozeWindow, SnoozeWindowStatus, WindowRef};

/// Operations that can be persisted to the WAL
///
/// Each operation carries the full object as written, including its new
/// `resourceVersion`, so replay needs no extra bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Create or replace a managed resource
    ResourceUpsert { resource: ManagedResource },

    /// Delete a managed resource
    ResourceDelete { id: ResourceRef },

    /// Create or replace a window, spec and status
    WindowUpsert { window: SnoozeWindow },

    /// Replace only the status of a window
    WindowStatus {
        id: WindowRef,
        status: SnoozeWindowStatus,
        resource_version: u64,
    },
}
