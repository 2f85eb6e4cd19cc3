// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed implementation of the store contracts

use crate::{MaterializedState, Operation, Wal, WalError};
use async_trait::async_trait;
use snooze_adapters::{apply_patch, ResourceStore, StoreError, WindowStore};
use snooze_core::{
    LabelSelector, ManagedResource, Manifest, PatchKind, ResourceRef, SnoozeWindow, WindowRef,
};
use std::path::Path;
use std::sync::{Arc, Mutex};

struct Inner {
    wal: Wal,
    state: MaterializedState,
}

impl Inner {
    /// Log first, then apply, so state never runs ahead of the log
    fn commit(&mut self, op: Operation) -> Result<(), StoreError> {
        self.wal.append(&op).map_err(backend)?;
        self.state.apply(&op);
        Ok(())
    }
}

fn backend(err: WalError) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Store whose every write is an fsync'd WAL append
#[derive(Clone)]
pub struct WalStore {
    inner: Arc<Mutex<Inner>>,
}

impl WalStore {
    /// Replay the log at `path` and open it for appending
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let ops = Wal::replay(path)?;
        let state = MaterializedState::replay(&ops);
        let wal = Wal::open(path)?;
        tracing::debug!(
            path = %path.display(),
            operations = ops.len(),
            resources = state.resources.len(),
            windows = state.windows.len(),
            "replayed wal"
        );
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { wal, state })),
        })
    }

    /// Import a manifest.
    ///
    /// A re-imported window keeps its observed status, and a re-imported
    /// resource keeps any annotations the engine wrote, so restarting the
    /// daemon never forgets a backup record.
    pub fn import(&self, manifest: Manifest) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match manifest {
            Manifest::Window(window) => {
                let mut window = *window;
                if let Some(existing) = inner.state.windows.get(&window.id()) {
                    if existing.spec == window.spec {
                        return Ok(());
                    }
                    window.status = existing.status.clone();
                    window.metadata.resource_version = existing.metadata.resource_version + 1;
                }
                inner.commit(Operation::WindowUpsert { window })
            }
            Manifest::Resource(resource) => {
                let resource = *resource;
                if inner.state.resources.contains_key(&resource.id()) {
                    return Ok(());
                }
                inner.commit(Operation::ResourceUpsert { resource })
            }
        }
    }

    pub fn resource(&self, id: &ResourceRef) -> Option<ManagedResource> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.state.resources.get(id).cloned()
    }

    pub fn window(&self, id: &WindowRef) -> Option<SnoozeWindow> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.state.windows.get(id).cloned()
    }
}

#[async_trait]
impl ResourceStore for WalStore {
    async fn list(
        &self,
        kind: &str,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<ManagedResource>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .state
            .resources
            .values()
            .filter(|r| r.kind == kind && r.namespace() == namespace)
            .filter(|r| selector.matches(&r.metadata.labels))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &ResourceRef) -> Result<ManagedResource, StoreError> {
        self.resource(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource, StoreError> {
        let id = resource.id();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let stored_version = inner
            .state
            .resources
            .get(&id)
            .map(|r| r.metadata.resource_version)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        StoreError::check_version(&id, stored_version, resource.metadata.resource_version)?;

        let mut updated = resource.clone();
        updated.metadata.resource_version = stored_version + 1;
        inner.commit(Operation::ResourceUpsert {
            resource: updated.clone(),
        })?;
        Ok(updated)
    }

    async fn delete(&self, id: &ResourceRef) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !inner.state.resources.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        inner.commit(Operation::ResourceDelete { id: id.clone() })
    }

    async fn patch(
        &self,
        resource: &ManagedResource,
        kind: PatchKind,
        data: &[u8],
    ) -> Result<ManagedResource, StoreError> {
        let id = resource.id();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let stored = inner
            .state
            .resources
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut patched = apply_patch(stored, kind, data)?;
        patched.metadata.resource_version = stored.metadata.resource_version + 1;
        inner.commit(Operation::ResourceUpsert {
            resource: patched.clone(),
        })?;
        Ok(patched)
    }
}

#[async_trait]
impl WindowStore for WalStore {
    async fn get_window(&self, id: &WindowRef) -> Result<SnoozeWindow, StoreError> {
        self.window(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_windows(&self) -> Result<Vec<SnoozeWindow>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.state.windows.values().cloned().collect())
    }

    async fn update_window_status(
        &self,
        window: &SnoozeWindow,
    ) -> Result<SnoozeWindow, StoreError> {
        let id = window.id();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let stored_version = inner
            .state
            .windows
            .get(&id)
            .map(|w| w.metadata.resource_version)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        StoreError::check_version(&id, stored_version, window.metadata.resource_version)?;

        inner.commit(Operation::WindowStatus {
            id: id.clone(),
            status: window.status.clone(),
            resource_version: stored_version + 1,
        })?;
        inner
            .state
            .windows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
