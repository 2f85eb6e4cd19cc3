// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::Operation;
use snooze_core::{ManagedResource, ResourceRef, SnoozeWindow, WindowRef};
use std::collections::BTreeMap;

/// Materialized state built from WAL operations
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub resources: BTreeMap<ResourceRef, ManagedResource>,
    pub windows: BTreeMap<WindowRef, SnoozeWindow>,
}

impl MaterializedState {
    /// Rebuild state by applying every operation in order
    pub fn replay<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Self {
        let mut state = Self::default();
        for op in ops {
            state.apply(op);
        }
        state
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::ResourceUpsert { resource } => {
                self.resources.insert(resource.id(), resource.clone());
            }

            Operation::ResourceDelete { id } => {
                self.resources.remove(id);
            }

            Operation::WindowUpsert { window } => {
                self.windows.insert(window.id(), window.clone());
            }

            Operation::WindowStatus {
                id,
                status,
                resource_version,
            } => {
                // Status for a window that was never created is dropped
                if let Some(window) = self.windows.get_mut(id) {
                    window.status = status.clone();
                    window.metadata.resource_version = *resource_version;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
