// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::store::{ResourceStore, StoreError, WindowStore};
use async_trait::async_trait;
use snooze_core::{
    LabelSelector, ManagedResource, PatchKind, ResourceRef, SnoozeWindow, WindowRef,
};
use tracing::Instrument;

/// Wrapper that adds tracing to any ResourceStore or WindowStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn log_write<T>(result: &Result<T, StoreError>, start: std::time::Instant, done: &str) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::info!(elapsed_ms, "{}", done),
        // Conflicts are routine under optimistic concurrency
        Err(e) if e.is_conflict() => tracing::warn!(elapsed_ms, error = %e, "conflict"),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
    }
}

#[async_trait]
impl<S: ResourceStore> ResourceStore for TracedStore<S> {
    async fn list(
        &self,
        kind: &str,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<ManagedResource>, StoreError> {
        let span = tracing::info_span!("store.list", kind, namespace, selector = %selector);
        async move {
            let result = self.inner.list(kind, namespace, selector).await;
            match &result {
                Ok(resources) => tracing::debug!(count = resources.len(), "listed"),
                Err(e) => tracing::error!(error = %e, "list failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get(&self, id: &ResourceRef) -> Result<ManagedResource, StoreError> {
        let result = self.inner.get(id).await;
        tracing::trace!(resource = %id, found = result.is_ok(), "get");
        result
    }

    async fn update(&self, resource: &ManagedResource) -> Result<ManagedResource, StoreError> {
        let span = tracing::info_span!(
            "store.update",
            resource = %resource.id(),
            version = resource.metadata.resource_version
        );
        async move {
            tracing::debug!("updating");
            let start = std::time::Instant::now();
            let result = self.inner.update(resource).await;
            log_write(&result, start, "updated");
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, id: &ResourceRef) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.delete", resource = %id);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.delete(id).await;
            log_write(&result, start, "deleted");
            result
        }
        .instrument(span)
        .await
    }

    async fn patch(
        &self,
        resource: &ManagedResource,
        kind: PatchKind,
        data: &[u8],
    ) -> Result<ManagedResource, StoreError> {
        let span = tracing::info_span!(
            "store.patch",
            resource = %resource.id(),
            patch_type = %kind,
            patch_len = data.len()
        );
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.patch(resource, kind, data).await;
            log_write(&result, start, "patched");
            result
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl<S: WindowStore> WindowStore for TracedStore<S> {
    async fn get_window(&self, id: &WindowRef) -> Result<SnoozeWindow, StoreError> {
        let result = self.inner.get_window(id).await;
        tracing::trace!(window = %id, found = result.is_ok(), "get window");
        result
    }

    async fn list_windows(&self) -> Result<Vec<SnoozeWindow>, StoreError> {
        let result = self.inner.list_windows().await;
        tracing::trace!(count = result.as_ref().map(|w| w.len()).ok(), "listed windows");
        result
    }

    async fn update_window_status(
        &self,
        window: &SnoozeWindow,
    ) -> Result<SnoozeWindow, StoreError> {
        let span = tracing::info_span!(
            "store.update_window_status",
            window = %window.id(),
            phase = %window.status.phase
        );
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.update_window_status(window).await;
            log_write(&result, start, "status updated");
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
