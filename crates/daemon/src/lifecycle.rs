// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, rescans, shutdown.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use snooze_adapters::{StoreError, TracedStore, WindowStore};
use snooze_core::{Manifest, SystemClock};
use snooze_engine::{Reconciler, RequeueQueue};
use snooze_storage::{WalError, WalStore};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

/// Store the daemon runs against (wrapped with tracing)
pub type DaemonStore = TracedStore<WalStore>;

pub type DaemonReconciler = Reconciler<DaemonStore, SystemClock>;

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Shared with every in-flight tick
    pub reconciler: Arc<DaemonReconciler>,
    /// When each window ticks next
    pub queue: RequeueQueue,
}

impl DaemonState {
    /// Re-import the manifest directory and queue any window that appeared
    /// since the last scan. Edited windows keep their status and are seen on
    /// their next tick.
    pub async fn rescan(&mut self) -> Result<usize, LifecycleError> {
        let store = self.reconciler.store();
        import_manifests(store.inner(), &self.config.manifests_dir)?;
        let windows = store.list_windows().await?;
        let now = Instant::now();
        let added = windows
            .iter()
            .filter(|w| self.queue.schedule_if_absent(w.id(), now))
            .count();
        if added > 0 {
            info!(added, "queued new windows");
        }
        Ok(added)
    }

    /// Shutdown the daemon gracefully
    pub fn shutdown(&mut self) {
        info!("Shutting down daemon...");

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        // Lock is released when self.lock_file is dropped
        info!("Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Invalid manifest {0}: {1}")]
    Manifest(PathBuf, serde_json::Error),

    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(config, &e);
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents two daemons sharing one WAL
    let mut lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    {
        use std::io::Write;
        writeln!(lock_file, "{}", std::process::id())?;
    }

    // 3. Load state from WAL
    let store = WalStore::open(&config.wal_path)?;

    // 4. Import manifests (fail fast on a bad document)
    let imported = import_manifests(&store, &config.manifests_dir)?;

    // 5. Queue every known window for an immediate tick
    let windows = store.list_windows().await?;
    let mut queue = RequeueQueue::new();
    let now = Instant::now();
    for window in &windows {
        queue.schedule(window.id(), now);
    }

    info!(
        "Loaded state: {} manifests imported, {} windows",
        imported,
        windows.len()
    );

    let reconciler = Reconciler::new(
        TracedStore::new(store),
        SystemClock,
        config.reconciler(),
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        reconciler: Arc::new(reconciler),
        queue,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config, error: &LifecycleError) {
    // Another daemon owns the lock file; leave it alone
    if matches!(error, LifecycleError::LockFailed(_)) {
        return;
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Import every `*.json` manifest in `dir`, in file-name order
pub fn import_manifests(store: &WalStore, dir: &Path) -> Result<usize, LifecycleError> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();

    for path in &paths {
        let content = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&content)
            .and_then(Manifest::from_value)
            .map_err(|e| LifecycleError::Manifest(path.clone(), e))?;
        store.import(manifest)?;
    }

    Ok(paths.len())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
