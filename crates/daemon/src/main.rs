// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snooze Daemon (snoozed)
//!
//! Background process that ticks every snooze window on its own schedule.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod lifecycle;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use snooze_core::WindowRef;
use snooze_engine::TickOutcome;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::lifecycle::LifecycleError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    // Load configuration
    let config = Config::load(config_path.as_deref())?;

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!("Starting snoozed, state in {}", config.state_dir.display());

    // Start daemon
    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready, {} windows queued", daemon.queue.len());

    let mut ticks: JoinSet<TickOutcome> = JoinSet::new();
    let mut running: HashMap<tokio::task::Id, WindowRef> = HashMap::new();
    let mut rescan = tokio::time::interval(config.poll_interval);

    // Main event loop
    loop {
        for id in daemon.queue.poll(Instant::now().into_std()) {
            let reconciler = Arc::clone(&daemon.reconciler);
            let window = id.clone();
            let handle = ticks.spawn(async move { reconciler.tick(&window).await });
            running.insert(handle.id(), id);
        }

        let wake_at = daemon
            .queue
            .next_deadline()
            .map(Instant::from_std)
            .unwrap_or_else(|| Instant::now() + config.poll_interval);

        tokio::select! {
            // Next window is due
            _ = tokio::time::sleep_until(wake_at) => {}

            // A tick finished; requeue its window
            Some(joined) = ticks.join_next_with_id(), if !ticks.is_empty() => {
                let now = Instant::now().into_std();
                match joined {
                    Ok((task, TickOutcome::Requeue(delay))) => {
                        if let Some(id) = running.remove(&task) {
                            daemon.queue.complete(&id, now, delay);
                        }
                    }
                    Ok((task, TickOutcome::Forget)) => {
                        if let Some(id) = running.remove(&task) {
                            info!(window = %id, "window removed, no longer ticking");
                            daemon.queue.forget(&id);
                        }
                    }
                    Err(e) => {
                        if let Some(id) = running.remove(&e.id()) {
                            error!(window = %id, "tick task failed: {}", e);
                            daemon.queue.complete(&id, now, config.error_backoff);
                        }
                    }
                }
            }

            // Pick up manifests added or edited since startup
            _ = rescan.tick() => {
                if let Err(e) = daemon.rescan().await {
                    warn!("Failed to rescan windows: {}", e);
                }
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    // Let in-flight ticks finish their store writes
    if !ticks.is_empty() {
        info!("Waiting for {} in-flight ticks", ticks.len());
        while ticks.join_next().await.is_some() {}
    }

    daemon.shutdown();
    info!("Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = config.log_path.parent().unwrap_or(&config.state_dir);
    let log_file = config
        .log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("snoozed.log"));

    // Create log directory if needed
    std::fs::create_dir_all(log_dir)?;

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
