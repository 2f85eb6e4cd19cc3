// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kinds with no native sleep: deleted outright or patched

use super::{backup, ResourceAdapter};
use crate::error::AdapterError;
use async_trait::async_trait;
use serde_json::Value;
use snooze_adapters::ResourceStore;
use snooze_core::resource::merge_patch;
use snooze_core::{AnnotationKeys, ManagedResource, PatchKind, ResourceRef};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum OtherStrategy {
    /// Delete the resource. One-way: nothing is left to carry a backup.
    Delete,
    /// Save the spec, apply `data`, restore the spec on wake
    Patch { kind: PatchKind, data: Value },
}

#[derive(Debug, Clone)]
pub struct OtherResource {
    resource: ManagedResource,
    keys: Arc<AnnotationKeys>,
    strategy: OtherStrategy,
    deleted: bool,
}

impl OtherResource {
    pub fn new(resource: ManagedResource, keys: Arc<AnnotationKeys>, strategy: OtherStrategy) -> Self {
        Self {
            resource,
            keys,
            strategy,
            deleted: false,
        }
    }

    pub fn resource(&self) -> &ManagedResource {
        &self.resource
    }

    pub fn strategy(&self) -> &OtherStrategy {
        &self.strategy
    }
}

#[async_trait]
impl ResourceAdapter for OtherResource {
    fn identity(&self) -> ResourceRef {
        self.resource.id()
    }

    /// `Delete` leaves no object to carry a backup record, so only the
    /// in-memory flag tracks it. A deleted resource is never listed again.
    fn is_already_snoozed(&self) -> bool {
        match self.strategy {
            OtherStrategy::Delete => self.deleted,
            OtherStrategy::Patch { .. } => self.resource.has_annotation(&self.keys.backup_state),
        }
    }

    async fn snooze<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        if self.is_already_snoozed() {
            return Ok(());
        }

        match &self.strategy {
            OtherStrategy::Delete => {
                store.delete(&self.resource.id()).await?;
                self.deleted = true;
                tracing::info!(resource = %self.identity(), "deleted");
            }
            OtherStrategy::Patch { kind, data } => {
                let kind = *kind;
                // The saved spec rides in the same patch as the change
                let mut doc = data.clone();
                if doc.is_object() {
                    let record = backup::spec_record_patch(&self.resource, &self.keys)?;
                    merge_patch(&mut doc, &record);
                }
                let patch = serde_json::to_vec(&doc)?;

                self.resource = store.patch(&self.resource, kind, &patch).await?;
                tracing::info!(resource = %self.identity(), patch_type = %kind, "patched");
            }
        }
        Ok(())
    }

    async fn wake<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        if self.strategy == OtherStrategy::Delete {
            return Ok(());
        }

        match backup::restore_spec(&mut self.resource, &self.keys) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(err) => {
                return backup::discard_corrupt(&mut self.resource, &self.keys, store, err).await;
            }
        }
        backup::clear(&mut self.resource, &self.keys);
        self.resource = store.update(&self.resource).await?;

        tracing::info!(resource = %self.identity(), "restored spec");
        Ok(())
    }
}

#[cfg(test)]
#[path = "other_tests.rs"]
mod tests;
