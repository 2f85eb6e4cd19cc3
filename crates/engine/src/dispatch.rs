// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch application of snooze and wake across adapters

use crate::error::{BatchOp, EngineError};
use crate::resource::ResourceAdapter;
use snooze_adapters::ResourceStore;
use snooze_core::ResourceRef;

/// What a successful batch did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub mutated: Vec<ResourceRef>,
    pub skipped: Vec<ResourceRef>,
}

/// Applies one operation to every adapter in discovery order.
///
/// Fail-fast: the first adapter error stops the batch and is returned as
/// [`EngineError::PartialBatchFailure`]. Adapters already handled stay
/// handled; their backup records make the retry skip them.
pub struct Dispatcher<'a, S> {
    store: &'a S,
}

impl<'a, S: ResourceStore> Dispatcher<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn snooze_all<A: ResourceAdapter>(
        &self,
        adapters: &mut [A],
    ) -> Result<BatchReport, EngineError> {
        let mut report = BatchReport::default();
        for adapter in adapters.iter_mut() {
            let id = adapter.identity();
            if adapter.is_already_snoozed() {
                tracing::debug!(resource = %id, "already snoozed, skipping");
                report.skipped.push(id);
                continue;
            }
            if let Err(source) = adapter.snooze(self.store).await {
                return Err(EngineError::PartialBatchFailure {
                    operation: BatchOp::Snooze,
                    resource: id,
                    source,
                });
            }
            report.mutated.push(id);
        }
        Ok(report)
    }

    pub async fn wake_all<A: ResourceAdapter>(
        &self,
        adapters: &mut [A],
    ) -> Result<BatchReport, EngineError> {
        let mut report = BatchReport::default();
        for adapter in adapters.iter_mut() {
            let id = adapter.identity();
            if !adapter.is_already_snoozed() {
                tracing::debug!(resource = %id, "not snoozed, skipping");
                report.skipped.push(id);
                continue;
            }
            if let Err(source) = adapter.wake(self.store).await {
                return Err(EngineError::PartialBatchFailure {
                    operation: BatchOp::Wake,
                    resource: id,
                    source,
                });
            }
            report.mutated.push(id);
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
