// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tasks snoozed through their suspend flag

use super::{backup, ResourceAdapter};
use crate::error::AdapterError;
use async_trait::async_trait;
use snooze_adapters::ResourceStore;
use snooze_core::{AnnotationKeys, ManagedResource, ResourceRef};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SuspendableTask {
    resource: ManagedResource,
    keys: Arc<AnnotationKeys>,
    full_state: bool,
}

impl SuspendableTask {
    pub fn new(resource: ManagedResource, keys: Arc<AnnotationKeys>, full_state: bool) -> Self {
        let full_state = backup::wants_full_state(&resource, &keys, full_state);
        Self {
            resource,
            keys,
            full_state,
        }
    }

    pub fn resource(&self) -> &ManagedResource {
        &self.resource
    }
}

#[async_trait]
impl ResourceAdapter for SuspendableTask {
    fn identity(&self) -> ResourceRef {
        self.resource.id()
    }

    fn is_already_snoozed(&self) -> bool {
        self.resource.has_annotation(&self.keys.backup_suspend)
    }

    async fn snooze<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        if self.is_already_snoozed() {
            return Ok(());
        }

        let mut snoozed = self.resource.clone();
        let suspended = snoozed.suspend().unwrap_or(false);
        snoozed.set_annotation(&self.keys.backup_suspend, suspended.to_string());
        if self.full_state {
            backup::record_spec(&mut snoozed, &self.keys)?;
        }
        snoozed.set_suspend(true);
        self.resource = store.update(&snoozed).await?;

        tracing::info!(resource = %self.identity(), was_suspended = suspended, "suspended");
        Ok(())
    }

    async fn wake<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        let Some(raw) = self.resource.annotation(&self.keys.backup_suspend) else {
            return Ok(());
        };
        let previous = match raw.trim().parse::<bool>() {
            Ok(previous) => previous,
            Err(e) => {
                let err = backup::corrupt(&self.resource, &self.keys.backup_suspend, e);
                return backup::discard_corrupt(&mut self.resource, &self.keys, store, err).await;
            }
        };
        if let Err(err) = backup::restore_spec(&mut self.resource, &self.keys) {
            return backup::discard_corrupt(&mut self.resource, &self.keys, store, err).await;
        }

        self.resource.set_suspend(previous);
        backup::clear(&mut self.resource, &self.keys);
        self.resource = store.update(&self.resource).await?;

        tracing::info!(resource = %self.identity(), suspend = previous, "restored suspend flag");
        Ok(())
    }
}

#[cfg(test)]
#[path = "suspendable_tests.rs"]
mod tests;
