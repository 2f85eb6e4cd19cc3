// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource and window store contracts
//!
//! Every write is guarded by optimistic concurrency: the caller hands back
//! the object it read, and the store refuses the write if the stored
//! `resourceVersion` has moved since. Successful writes return the stored
//! object with its new version.

mod patch;

pub use patch::apply_patch;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeResourceStore, StoreCall};

use async_trait::async_trait;
use snooze_core::{LabelSelector, ManagedResource, PatchKind, ResourceRef, SnoozeWindow, WindowRef};
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("conflict on {object}: expected version {expected}, found {actual}")]
    Conflict {
        object: String,
        expected: u64,
        actual: u64,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported patch type: {0}")]
    UnsupportedPatch(PatchKind),
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Refuse a write whose version does not match the stored one
    pub fn check_version(object: impl ToString, stored: u64, incoming: u64) -> Result<(), Self> {
        if stored == incoming {
            Ok(())
        } else {
            Err(StoreError::Conflict {
                object: object.to_string(),
                expected: incoming,
                actual: stored,
            })
        }
    }
}

/// Access to the managed resources of the cluster
#[async_trait]
pub trait ResourceStore: Clone + Send + Sync + 'static {
    /// Resources of `kind` in `namespace` whose labels match `selector`
    async fn list(
        &self,
        kind: &str,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<ManagedResource>, StoreError>;

    async fn get(&self, id: &ResourceRef) -> Result<ManagedResource, StoreError>;

    /// Replace a resource; fails with `Conflict` if it changed since it was read
    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource, StoreError>;

    async fn delete(&self, id: &ResourceRef) -> Result<(), StoreError>;

    /// Apply a raw patch document to the stored copy of `resource`
    async fn patch(
        &self,
        resource: &ManagedResource,
        kind: PatchKind,
        data: &[u8],
    ) -> Result<ManagedResource, StoreError>;
}

/// Access to snooze window objects
#[async_trait]
pub trait WindowStore: Clone + Send + Sync + 'static {
    async fn get_window(&self, id: &WindowRef) -> Result<SnoozeWindow, StoreError>;

    async fn list_windows(&self) -> Result<Vec<SnoozeWindow>, StoreError>;

    /// Persist `window.status`; the spec is left untouched
    async fn update_window_status(&self, window: &SnoozeWindow)
        -> Result<SnoozeWindow, StoreError>;
}
