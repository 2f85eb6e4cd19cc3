// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource adapters
//!
//! Every managed kind is snoozed and woken through [`ResourceAdapter`]. The
//! set of variants is closed: adding a kind means adding a variant to
//! [`SnoozeTarget`] and a rule to [`KindClass::of`].
//!
//! All variants share one contract. A resource carrying its backup record is
//! already snoozed, whatever the window's phase says. Snoozing sets the
//! backup record and the sleep mutation in a single write, so a failed or
//! interrupted snooze leaves the resource exactly as it was found.

mod backup;
mod other;
mod scalable;
mod suspendable;

pub use other::{OtherResource, OtherStrategy};
pub use scalable::ScalableWorkload;
pub use suspendable::SuspendableTask;

use crate::error::AdapterError;
use async_trait::async_trait;
use snooze_adapters::ResourceStore;
use snooze_core::{AnnotationKeys, ManagedResource, ResourceRef, SnoozeAction};
use std::sync::Arc;

/// Uniform snooze/wake contract over one managed resource
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    fn identity(&self) -> ResourceRef;

    /// True iff the resource carries its backup record
    fn is_already_snoozed(&self) -> bool;

    /// Record a backup and put the resource to sleep in one write. No-op if already snoozed.
    async fn snooze<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError>;

    /// Restore from the backup record and drop it. No-op if not snoozed.
    async fn wake<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError>;
}

/// How a kind goes to sleep natively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindClass {
    /// Has a replica count that can drop to zero
    Scalable,
    /// Has a suspend flag
    Suspendable,
    Other,
}

impl KindClass {
    pub fn of(resource: &ManagedResource) -> Self {
        match resource.kind.as_str() {
            "Deployment" | "StatefulSet" | "ReplicaSet" => KindClass::Scalable,
            "Job" | "CronJob" => KindClass::Suspendable,
            _ if resource.replicas().is_some() => KindClass::Scalable,
            _ => KindClass::Other,
        }
    }
}

/// A resource wrapped in the adapter its action calls for
#[derive(Debug, Clone)]
pub enum SnoozeTarget {
    Scalable(ScalableWorkload),
    Suspendable(SuspendableTask),
    Other(OtherResource),
}

impl SnoozeTarget {
    /// Pick the adapter for `resource`.
    ///
    /// `delete` and `patch` work on any kind. `scaleToZero` and `suspend`
    /// use the kind's native mechanism and fail on kinds that have none.
    pub fn build(
        resource: ManagedResource,
        action: &SnoozeAction,
        keys: &Arc<AnnotationKeys>,
        full_state: bool,
    ) -> Result<Self, AdapterError> {
        let keys = Arc::clone(keys);
        match action {
            SnoozeAction::Delete => Ok(SnoozeTarget::Other(OtherResource::new(
                resource,
                keys,
                OtherStrategy::Delete,
            ))),
            SnoozeAction::Patch { patch_type, data } => Ok(SnoozeTarget::Other(
                OtherResource::new(
                    resource,
                    keys,
                    OtherStrategy::Patch {
                        kind: *patch_type,
                        data: data.clone(),
                    },
                ),
            )),
            SnoozeAction::ScaleToZero | SnoozeAction::Suspend => match KindClass::of(&resource) {
                KindClass::Scalable => Ok(SnoozeTarget::Scalable(ScalableWorkload::new(
                    resource, keys, full_state,
                ))),
                KindClass::Suspendable => Ok(SnoozeTarget::Suspendable(SuspendableTask::new(
                    resource, keys, full_state,
                ))),
                KindClass::Other => Err(AdapterError::UnsupportedKind {
                    kind: resource.kind,
                    action: action.name(),
                }),
            },
        }
    }

    pub fn resource(&self) -> &ManagedResource {
        match self {
            SnoozeTarget::Scalable(a) => a.resource(),
            SnoozeTarget::Suspendable(a) => a.resource(),
            SnoozeTarget::Other(a) => a.resource(),
        }
    }
}

#[async_trait]
impl ResourceAdapter for SnoozeTarget {
    fn identity(&self) -> ResourceRef {
        self.resource().id()
    }

    fn is_already_snoozed(&self) -> bool {
        match self {
            SnoozeTarget::Scalable(a) => a.is_already_snoozed(),
            SnoozeTarget::Suspendable(a) => a.is_already_snoozed(),
            SnoozeTarget::Other(a) => a.is_already_snoozed(),
        }
    }

    async fn snooze<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        match self {
            SnoozeTarget::Scalable(a) => a.snooze(store).await,
            SnoozeTarget::Suspendable(a) => a.snooze(store).await,
            SnoozeTarget::Other(a) => a.snooze(store).await,
        }
    }

    async fn wake<S: ResourceStore>(&mut self, store: &S) -> Result<(), AdapterError> {
        match self {
            SnoozeTarget::Scalable(a) => a.wake(store).await,
            SnoozeTarget::Suspendable(a) => a.wake(store).await,
            SnoozeTarget::Other(a) => a.wake(store).await,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
