// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workloads snoozed by scaling replicas to zero

use super::{backup, ResourceAdapter};
use crate::error::AdapterError;
use async_trait::async_trait;
use snooze_adapters::ResourceStore;
use snooze_core::{AnnotationKeys, ManagedResource, ResourceRef};
use std::sync::Arc;

/// Replica count assumed when `spec.replicas` is unset
const DEFAULT_REPLICAS: i64 = 1;

#[derive(Debug, Clone)]
pub struct ScalableWorkload {
    resource: ManagedResource,
    keys: Arc<AnnotationKeys>,
    full_state: bool,
}

impl ScalableWorkload {
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

fn parse_replicas(raw: &str) -> Result<i64, String> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        Ok(n) => Err(format!("negative replica count {}", n)),
        Err(e) => Err(format!("'{}' is not a replica count: {}", raw, e)),
    }
}

#[async_trait]
impl ResourceAdapter for ScalableWorkload {
    fn identity(&self) -> ResourceRef {
        self.resource.id()
    }

    fn is_already_snoozed(&self) -> bool {
        self.resource.has_annotation(&self.keys.backup_replicas)
    }

    async fn snooze<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        if self.is_already_snoozed() {
            return Ok(());
        }

        // Record and mutation land in one write; a failed write leaves neither
        let mut snoozed = self.resource.clone();
        let replicas = snoozed.replicas().unwrap_or(DEFAULT_REPLICAS);
        snoozed.set_annotation(&self.keys.backup_replicas, replicas.to_string());
        if self.full_state {
            backup::record_spec(&mut snoozed, &self.keys)?;
        }
        snoozed.set_replicas(0);
        self.resource = store.update(&snoozed).await?;

        tracing::info!(resource = %self.identity(), replicas, "scaled to zero");
        Ok(())
    }

    async fn wake<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        let Some(raw) = self.resource.annotation(&self.keys.backup_replicas) else {
            return Ok(());
        };
        let recorded = match parse_replicas(raw) {
            Ok(n) => n,
            Err(reason) => {
                let err = backup::corrupt(&self.resource, &self.keys.backup_replicas, reason);
                return backup::discard_corrupt(&mut self.resource, &self.keys, store, err).await;
            }
        };
        if let Err(err) = backup::restore_spec(&mut self.resource, &self.keys) {
            return backup::discard_corrupt(&mut self.resource, &self.keys, store, err).await;
        }

        // Zero means it was already idle; nothing to restore
        if recorded > 0 {
            self.resource.set_replicas(recorded);
        }
        backup::clear(&mut self.resource, &self.keys);
        self.resource = store.update(&self.resource).await?;

        tracing::info!(resource = %self.identity(), replicas = recorded, "restored replicas");
        Ok(())
    }
}

#[cfg(test)]
#[path = "scalable_tests.rs"]
mod tests;
