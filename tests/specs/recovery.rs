//! Recovery specs
//!
//! Verify that failures never lose a backup and that retries converge.

use crate::prelude::*;
use snooze_adapters::{FakeResourceStore, StoreError};
use snooze_core::FakeClock;
use snooze_engine::{Reconciler, ReconcilerConfig};

#[tokio::test]
async fn restart_mid_window_still_wakes() {
    let cluster = Cluster::at(at(2025, 1, 1, 23, 0));
    cluster.apply(nightly()).apply(deployment("web", 3));
    cluster.tick_at("nightly", at(2025, 1, 1, 23, 0)).await;

    let cluster = cluster.restart();
    assert_eq!(cluster.window("nightly").status.phase, Phase::Snoozed);
    assert_eq!(cluster.deployment("web").replicas(), Some(0));

    cluster.tick_at("nightly", at(2025, 1, 2, 7, 0)).await;
    assert_eq!(cluster.deployment("web").replicas(), Some(3));
}

#[tokio::test]
async fn reimporting_manifests_keeps_backups() {
    let cluster = Cluster::at(at(2025, 1, 1, 23, 0));
    cluster.apply(nightly()).apply(deployment("web", 3));
    cluster.tick_at("nightly", at(2025, 1, 1, 23, 0)).await;

    // a restart imports the same manifests again
    let cluster = cluster.restart();
    cluster.apply(nightly()).apply(deployment("web", 3));

    assert_eq!(cluster.deployment("web").annotation(BACKUP_REPLICAS), Some("3"));
    assert_eq!(cluster.window("nightly").status.phase, Phase::Snoozed);
}

#[tokio::test]
async fn corrupt_backup_is_reported_then_dropped() {
    let cluster = Cluster::at(at(2025, 1, 2, 6, 0));
    let mut damaged = deployment("web", 0);
    damaged["metadata"]["annotations"][BACKUP_REPLICAS] = json!("three");
    cluster.apply(nightly()).apply(damaged);

    // the window just ended, so a wake pass runs
    let err = cluster.reconcile("nightly").await.unwrap_err();
    assert_eq!(err.reason(), "WakeFailed");

    let web = cluster.deployment("web");
    assert!(!web.has_annotation(BACKUP_REPLICAS));
    assert_eq!(web.replicas(), Some(0));

    cluster.reconcile("nightly").await.unwrap();
    let ready = cluster.window("nightly").status.conditions[0].clone();
    assert_eq!(ready.status, ConditionStatus::True);
}

#[tokio::test]
async fn failed_batch_is_contained_and_retried() {
    let store = FakeResourceStore::new();
    let window: SnoozeWindow = serde_json::from_value(nightly()).unwrap();
    store.insert_window(window);
    for (name, replicas) in [("a", 1), ("b", 2), ("c", 3)] {
        store.insert(serde_json::from_value(deployment(name, replicas)).unwrap());
    }
    let c = ResourceRef::new("Deployment", "dev", "c");
    store.fail_writes(c.clone(), StoreError::Backend("disk full".to_string()));

    let clock = FakeClock::at(at(2025, 1, 1, 23, 0));
    let reconciler = Reconciler::new(store.clone(), clock.clone(), ReconcilerConfig::default());
    let id = WindowRef::new("dev", "nightly");

    let outcome = reconciler.tick(&id).await;
    assert_eq!(outcome, TickOutcome::Requeue(std::time::Duration::from_secs(30)));
    assert_eq!(store.window(&id).unwrap().status.phase, Phase::Awake);

    store.clear_failures();
    store.clear_calls();
    clock.advance(chrono::Duration::seconds(30));
    reconciler.reconcile(&id).await.unwrap();

    assert!(store.written().iter().all(|written| *written == c));
    assert_eq!(store.resource(&c).unwrap().replicas(), Some(0));
    assert_eq!(store.window(&id).unwrap().status.phase, Phase::Snoozed);
}

#[tokio::test]
async fn deleted_window_stops_ticking() {
    let cluster = Cluster::at(at(2025, 1, 1, 12, 0));
    let outcome = cluster.reconcile("never-created").await.unwrap();
    assert_eq!(outcome, TickOutcome::Forget);
}

#[tokio::test]
async fn conflict_on_one_write_does_not_strand_a_resource() {
    let store = FakeResourceStore::new();
    let window: SnoozeWindow = serde_json::from_value(nightly()).unwrap();
    store.insert_window(window);
    for (name, replicas) in [("a", 1), ("b", 2)] {
        store.insert(serde_json::from_value(deployment(name, replicas)).unwrap());
    }
    let b = ResourceRef::new("Deployment", "dev", "b");
    store.fail_nth_write(
        2,
        StoreError::Conflict {
            object: b.to_string(),
            expected: 0,
            actual: 1,
        },
    );

    let clock = FakeClock::at(at(2025, 1, 1, 23, 0));
    let reconciler = Reconciler::new(store.clone(), clock.clone(), ReconcilerConfig::default());
    let id = WindowRef::new("dev", "nightly");

    let outcome = reconciler.tick(&id).await;
    assert_eq!(outcome, TickOutcome::Requeue(std::time::Duration::from_secs(30)));
    let untouched = store.resource(&b).unwrap();
    assert_eq!(untouched.replicas(), Some(2));
    assert!(!untouched.has_annotation(BACKUP_REPLICAS));

    clock.advance(chrono::Duration::seconds(30));
    reconciler.reconcile(&id).await.unwrap();

    let snoozed = store.resource(&b).unwrap();
    assert_eq!(snoozed.replicas(), Some(0));
    assert_eq!(snoozed.annotation(BACKUP_REPLICAS), Some("2"));
}
