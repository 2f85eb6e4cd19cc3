// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One reconciliation tick per window
//!
//! A tick loads the window, evaluates its schedule against the clock,
//! discovers the opted-in resources, dispatches snooze or wake, and records
//! what it saw. It keeps no memory between ticks: the schedule says what
//! the phase should be and each resource's backup record says what has
//! already been done, so repeating a tick is always safe.

use crate::dispatch::Dispatcher;
use crate::error::EngineError;
use crate::resource::SnoozeTarget;
use snooze_adapters::{ResourceStore, WindowStore};
use snooze_core::status::{READY, SNOOZED};
use snooze_core::{
    AnnotationKeys, Clock, ConditionStatus, Evaluator, Phase, SnoozeWindow, WindowRef,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Tuning for the reconciliation loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    pub keys: AnnotationKeys,
    /// Tick granularity for boundary detection and polling
    pub interval: Duration,
    /// Delay before retrying a failed tick
    pub error_backoff: Duration,
    /// Upper bound on any requeue delay
    pub max_requeue: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            keys: AnnotationKeys::default(),
            interval: Duration::from_secs(60),
            error_backoff: Duration::from_secs(30),
            max_requeue: Duration::from_secs(600),
        }
    }
}

/// What the caller should do with a window after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Run the next tick after this delay
    Requeue(Duration),
    /// The window is gone; stop ticking it
    Forget,
}

pub struct Reconciler<S, C> {
    store: S,
    clock: C,
    evaluator: Evaluator,
    keys: Arc<AnnotationKeys>,
    error_backoff: Duration,
    max_requeue: Duration,
}

impl<S, C> Reconciler<S, C>
where
    S: ResourceStore + WindowStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, config: ReconcilerConfig) -> Self {
        Self {
            store,
            clock,
            evaluator: Evaluator::new(config.interval),
            keys: Arc::new(config.keys),
            error_backoff: config.error_backoff,
            max_requeue: config.max_requeue,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one tick, turning any failure into a requeue after the backoff
    pub async fn tick(&self, id: &WindowRef) -> TickOutcome {
        match self.reconcile(id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(window = %id, reason = e.reason(), error = %e, "reconcile failed");
                TickOutcome::Requeue(self.error_backoff.min(self.max_requeue))
            }
        }
    }

    /// Run one tick.
    ///
    /// Failures are recorded on the window's `Ready` condition before being
    /// returned, and leave the recorded phase where it was.
    pub async fn reconcile(&self, id: &WindowRef) -> Result<TickOutcome, EngineError> {
        let span = tracing::info_span!("reconcile", window = %id);
        self.reconcile_inner(id).instrument(span).await
    }

    async fn reconcile_inner(&self, id: &WindowRef) -> Result<TickOutcome, EngineError> {
        let mut window = match self.store.get_window(id).await {
            Ok(window) => window,
            Err(e) if e.is_not_found() => {
                tracing::info!("window no longer exists");
                return Ok(TickOutcome::Forget);
            }
            Err(e) => return Err(e.into()),
        };
        let now = self.clock.now();

        let evaluation = match self.evaluator.evaluate(&window.spec.schedule, now) {
            Ok(evaluation) => evaluation,
            Err(e) => return Err(self.report_failure(&mut window, e.into()).await),
        };

        let mut targets = match self.discover(&window).await {
            Ok(targets) => targets,
            Err(e) => return Err(self.report_failure(&mut window, e).await),
        };

        let recorded = window.status.phase;
        let dispatcher = Dispatcher::new(&self.store);
        let batch = match evaluation.phase {
            Phase::Snoozed => Some(dispatcher.snooze_all(&mut targets).await),
            Phase::Awake if recorded.is_snoozed() || evaluation.boundary_crossed => {
                Some(dispatcher.wake_all(&mut targets).await)
            }
            Phase::Awake => None,
        };
        match batch {
            Some(Ok(report)) => tracing::info!(
                phase = %evaluation.phase,
                mutated = report.mutated.len(),
                skipped = report.skipped.len(),
                "batch applied"
            ),
            Some(Err(e)) => return Err(self.report_failure(&mut window, e).await),
            None => {}
        }

        let delay = evaluation.next_check.min(self.max_requeue);
        let status = &mut window.status;
        if recorded != evaluation.phase {
            tracing::info!(from = %recorded, to = %evaluation.phase, "phase transition");
            match evaluation.phase {
                Phase::Snoozed => status.last_snooze_time = Some(now),
                Phase::Awake => status.last_wake_time = Some(now),
            }
        }
        status.phase = evaluation.phase;
        status.managed_resources = targets.len();
        status.next_check_time = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d));
        status.set_condition(READY, ConditionStatus::True, "Reconciled", "", now);
        let (snoozed_reason, snoozed_message) = if evaluation.phase.is_snoozed() {
            ("WindowActive", "resources are snoozed")
        } else {
            ("WindowInactive", "resources are awake")
        };
        status.set_condition(
            SNOOZED,
            evaluation.phase.is_snoozed().into(),
            snoozed_reason,
            snoozed_message,
            now,
        );
        self.store.update_window_status(&window).await?;

        tracing::debug!(delay_secs = delay.as_secs(), "requeue");
        Ok(TickOutcome::Requeue(delay))
    }

    /// Opted-in resources of every listed kind, wrapped in their adapters
    async fn discover(&self, window: &SnoozeWindow) -> Result<Vec<SnoozeTarget>, EngineError> {
        let namespace = window.target_namespace();
        let selector = &window.spec.label_selector;
        let mut seen = HashSet::new();
        let mut targets = Vec::new();

        for kind in &window.spec.resource_kinds {
            let action = window.action_for(kind);
            for resource in self.store.list(&kind.kind, namespace, selector).await? {
                if !kind.api_version.is_empty() && resource.api_version != kind.api_version {
                    continue;
                }
                if resource.annotation(&self.keys.enabled) != Some("true") {
                    tracing::trace!(resource = %resource.id(), "not opted in");
                    continue;
                }
                let id = resource.id();
                if !seen.insert(id.clone()) {
                    continue;
                }
                match SnoozeTarget::build(resource, action, &self.keys, window.spec.backup.full_state)
                {
                    Ok(target) => targets.push(target),
                    Err(e) => tracing::warn!(resource = %id, error = %e, "skipping resource"),
                }
            }
        }

        Ok(targets)
    }

    /// Mark the window not ready and hand the error back
    async fn report_failure(&self, window: &mut SnoozeWindow, error: EngineError) -> EngineError {
        let now = self.clock.now();
        window.status.set_condition(
            READY,
            ConditionStatus::False,
            error.reason(),
            error.to_string(),
            now,
        );
        if let Err(e) = self.store.update_window_status(window).await {
            tracing::warn!(error = %e, "failed to record failure on window status");
        }
        error
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
