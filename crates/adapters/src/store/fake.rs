// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake in-memory store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{apply_patch, ResourceStore, StoreError, WindowStore};
use async_trait::async_trait;
use snooze_core::{
    LabelSelector, ManagedResource, PatchKind, ResourceRef, SnoozeWindow, WindowRef,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List { kind: String, namespace: String },
    Get { id: ResourceRef },
    Update { id: ResourceRef },
    Delete { id: ResourceRef },
    Patch { id: ResourceRef, kind: PatchKind },
    GetWindow { id: WindowRef },
    ListWindows,
    UpdateWindowStatus { id: WindowRef },
}

impl StoreCall {
    /// The resource a write call targeted, if this call was a resource write
    pub fn written_resource(&self) -> Option<&ResourceRef> {
        match self {
            StoreCall::Update { id } | StoreCall::Delete { id } | StoreCall::Patch { id, .. } => {
                Some(id)
            }
            _ => None,
        }
    }
}

/// Fake store holding resources and windows in memory.
///
/// Enforces the same optimistic concurrency as a real store and can be told
/// to fail writes to specific resources.
#[derive(Clone, Default)]
pub struct FakeResourceStore {
    resources: Arc<Mutex<BTreeMap<ResourceRef, ManagedResource>>>,
    windows: Arc<Mutex<BTreeMap<WindowRef, SnoozeWindow>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    write_failures: Arc<Mutex<HashMap<ResourceRef, StoreError>>>,
    list_failure: Arc<Mutex<Option<StoreError>>>,
    write_count: Arc<AtomicUsize>,
    nth_write_failure: Arc<Mutex<Option<(usize, StoreError)>>>,
}

impl FakeResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource, keeping whatever version it carries
    pub fn insert(&self, resource: ManagedResource) {
        self.resources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(resource.id(), resource);
    }

    /// Seed a window, keeping whatever version it carries
    pub fn insert_window(&self, window: SnoozeWindow) {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(window.id(), window);
    }

    pub fn remove_window(&self, id: &WindowRef) {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
    }

    pub fn resource(&self, id: &ResourceRef) -> Option<ManagedResource> {
        self.resources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn resources(&self) -> Vec<ManagedResource> {
        self.resources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    pub fn window(&self, id: &WindowRef) -> Option<SnoozeWindow> {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Resources that received a write, in call order
    pub fn written(&self) -> Vec<ResourceRef> {
        self.calls()
            .iter()
            .filter_map(StoreCall::written_resource)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Fail every write to `id` with `error` until cleared
    pub fn fail_writes(&self, id: ResourceRef, error: StoreError) {
        self.write_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, error);
    }

    /// Fail only the `n`th resource write from now on (1-based), whatever it targets
    pub fn fail_nth_write(&self, n: usize, error: StoreError) {
        let pending = self.write_count.load(Ordering::SeqCst) + n;
        *self
            .nth_write_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some((pending, error));
    }

    /// Fail every list call with `error` until cleared
    pub fn fail_lists(&self, error: StoreError) {
        *self.list_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    pub fn clear_failures(&self) {
        self.write_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        *self.list_failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self
            .nth_write_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn record(&self, call: StoreCall) {
        if call.written_resource().is_some() {
            self.write_count.fetch_add(1, Ordering::SeqCst);
        }
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    /// Must run after the write was recorded
    fn injected_failure(&self, id: &ResourceRef) -> Result<(), StoreError> {
        let writes = self.write_count.load(Ordering::SeqCst);
        {
            let mut nth = self
                .nth_write_failure
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if matches!(*nth, Some((at, _)) if at == writes) {
                if let Some((_, err)) = nth.take() {
                    return Err(err);
                }
            }
        }
        match self
            .write_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceStore for FakeResourceStore {
    async fn list(
        &self,
        kind: &str,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<ManagedResource>, StoreError> {
        self.record(StoreCall::List {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
        });

        if let Some(err) = self
            .list_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(err);
        }

        let resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        Ok(resources
            .values()
            .filter(|r| r.kind == kind && r.namespace() == namespace)
            .filter(|r| selector.matches(&r.metadata.labels))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &ResourceRef) -> Result<ManagedResource, StoreError> {
        self.record(StoreCall::Get { id: id.clone() });
        self.resource(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource, StoreError> {
        let id = resource.id();
        self.record(StoreCall::Update { id: id.clone() });
        self.injected_failure(&id)?;

        let mut resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        let stored = resources
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        StoreError::check_version(
            &id,
            stored.metadata.resource_version,
            resource.metadata.resource_version,
        )?;

        let mut updated = resource.clone();
        updated.metadata.resource_version = stored.metadata.resource_version + 1;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &ResourceRef) -> Result<(), StoreError> {
        self.record(StoreCall::Delete { id: id.clone() });
        self.injected_failure(id)?;

        self.resources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn patch(
        &self,
        resource: &ManagedResource,
        kind: PatchKind,
        data: &[u8],
    ) -> Result<ManagedResource, StoreError> {
        let id = resource.id();
        self.record(StoreCall::Patch {
            id: id.clone(),
            kind,
        });
        self.injected_failure(&id)?;

        let mut resources = self.resources.lock().unwrap_or_else(|e| e.into_inner());
        let stored = resources
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut patched = apply_patch(stored, kind, data)?;
        patched.metadata.resource_version = stored.metadata.resource_version + 1;
        *stored = patched.clone();
        Ok(patched)
    }
}

#[async_trait]
impl WindowStore for FakeResourceStore {
    async fn get_window(&self, id: &WindowRef) -> Result<SnoozeWindow, StoreError> {
        self.record(StoreCall::GetWindow { id: id.clone() });
        self.window(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_windows(&self) -> Result<Vec<SnoozeWindow>, StoreError> {
        self.record(StoreCall::ListWindows);
        Ok(self
            .windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect())
    }

    async fn update_window_status(
        &self,
        window: &SnoozeWindow,
    ) -> Result<SnoozeWindow, StoreError> {
        let id = window.id();
        self.record(StoreCall::UpdateWindowStatus { id: id.clone() });

        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let stored = windows
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        StoreError::check_version(
            &id,
            stored.metadata.resource_version,
            window.metadata.resource_version,
        )?;

        stored.status = window.status.clone();
        stored.metadata.resource_version += 1;
        Ok(stored.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
