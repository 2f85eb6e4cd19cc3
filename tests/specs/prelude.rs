//! Shared harness for behavioral specs

pub use chrono::{DateTime, TimeZone, Utc};
pub use serde_json::{json, Value};
pub use snooze_core::{ConditionStatus, ManagedResource, Phase, ResourceRef, SnoozeWindow, WindowRef};
pub use snooze_engine::{EngineError, TickOutcome};

use snooze_core::{FakeClock, Manifest};
use snooze_engine::{Reconciler, ReconcilerConfig};
use snooze_storage::WalStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub const BACKUP_REPLICAS: &str = "kube-snooze/backup-replicas";
pub const BACKUP_SUSPEND: &str = "kube-snooze/backup-suspend";
pub const BACKUP_STATE: &str = "kube-snooze/backup-state";

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// A WAL-backed store plus a reconciler on a fake clock
pub struct Cluster {
    dir: TempDir,
    clock: FakeClock,
    store: WalStore,
    reconciler: Reconciler<WalStore, FakeClock>,
}

impl Cluster {
    pub fn at(now: DateTime<Utc>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let clock = FakeClock::at(now);
        let (store, reconciler) = open(&wal_path(&dir), &clock);
        Self {
            dir,
            clock,
            store,
            reconciler,
        }
    }

    /// Reopen the store from its log, as a daemon restart would
    pub fn restart(self) -> Self {
        let Self { dir, clock, .. } = self;
        let (store, reconciler) = open(&wal_path(&dir), &clock);
        Self {
            dir,
            clock,
            store,
            reconciler,
        }
    }

    /// Import a window or resource document
    pub fn apply(&self, manifest: Value) -> &Self {
        self.store
            .import(Manifest::from_value(manifest).unwrap())
            .unwrap();
        self
    }

    pub fn store(&self) -> &WalStore {
        &self.store
    }

    pub fn set_time(&self, now: DateTime<Utc>) {
        self.clock.set(now);
    }

    pub async fn reconcile(&self, window: &str) -> Result<TickOutcome, EngineError> {
        self.reconciler.reconcile(&WindowRef::new("dev", window)).await
    }

    /// Reconcile `window` at `now`, expecting success
    pub async fn tick_at(&self, window: &str, now: DateTime<Utc>) -> TickOutcome {
        self.set_time(now);
        self.reconcile(window).await.unwrap()
    }

    pub fn resource(&self, kind: &str, name: &str) -> Option<ManagedResource> {
        self.store.resource(&ResourceRef::new(kind, "dev", name))
    }

    pub fn deployment(&self, name: &str) -> ManagedResource {
        self.resource("Deployment", name).unwrap()
    }

    pub fn window(&self, name: &str) -> SnoozeWindow {
        self.store.window(&WindowRef::new("dev", name)).unwrap()
    }
}

fn wal_path(dir: &TempDir) -> PathBuf {
    dir.path().join("snooze.wal")
}

fn open(path: &std::path::Path, clock: &FakeClock) -> (WalStore, Reconciler<WalStore, FakeClock>) {
    let store = WalStore::open(path).unwrap();
    let reconciler = Reconciler::new(store.clone(), clock.clone(), ReconcilerConfig::default());
    (store, reconciler)
}

/// A window in `dev` managing Deployments
pub fn window(name: &str, schedule: Value) -> Value {
    json!({
        "kind": "SnoozeWindow",
        "metadata": { "name": name, "namespace": "dev" },
        "spec": {
            "schedule": schedule,
            "resourceKinds": [{ "apiVersion": "apps/v1", "kind": "Deployment" }]
        }
    })
}

/// 22:00 to 06:00 starting 2025-01-01, UTC
pub fn nightly() -> Value {
    window(
        "nightly",
        json!({ "window": { "start": "22:00", "end": "06:00", "date": "2025-01-01" } }),
    )
}

/// An opted-in Deployment in `dev`
pub fn deployment(name: &str, replicas: i64) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": "dev",
            "labels": { "app": name },
            "annotations": { "kube-snooze/enabled": "true" }
        },
        "spec": { "replicas": replicas, "template": { "image": format!("{}:1", name) } }
    })
}
