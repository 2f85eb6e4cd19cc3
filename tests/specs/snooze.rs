//! Snooze and wake specs
//!
//! Verify what each action does to a resource and that waking undoes it.

use crate::prelude::*;
use snooze_adapters::ResourceStore;

fn night() -> DateTime<Utc> {
    at(2025, 1, 1, 23, 0)
}

fn morning() -> DateTime<Utc> {
    at(2025, 1, 2, 7, 0)
}

fn no_backup(resource: &ManagedResource) -> bool {
    [BACKUP_REPLICAS, BACKUP_SUSPEND, BACKUP_STATE]
        .iter()
        .all(|key| !resource.has_annotation(key))
}

#[tokio::test]
async fn round_trip_restores_replicas() {
    let cluster = Cluster::at(night());
    cluster.apply(nightly()).apply(deployment("web", 3));
    let original = cluster.deployment("web");

    cluster.tick_at("nightly", night()).await;
    let snoozed = cluster.deployment("web");
    assert_eq!(snoozed.replicas(), Some(0));
    assert_eq!(snoozed.annotation(BACKUP_REPLICAS), Some("3"));

    cluster.tick_at("nightly", morning()).await;
    let woken = cluster.deployment("web");
    assert!(no_backup(&woken));
    similar_asserts::assert_eq!(woken.spec, original.spec);
    similar_asserts::assert_eq!(woken.metadata.annotations, original.metadata.annotations);
}

#[tokio::test]
async fn zero_replicas_stay_zero() {
    let cluster = Cluster::at(night());
    cluster.apply(nightly()).apply(deployment("idle", 0));

    cluster.tick_at("nightly", night()).await;
    assert_eq!(cluster.deployment("idle").annotation(BACKUP_REPLICAS), Some("0"));

    cluster.tick_at("nightly", morning()).await;
    let woken = cluster.deployment("idle");
    assert_eq!(woken.replicas(), Some(0));
    assert!(no_backup(&woken));
}

#[tokio::test]
async fn repeated_ticks_write_nothing_new() {
    let cluster = Cluster::at(night());
    cluster.apply(nightly()).apply(deployment("web", 3));

    cluster.tick_at("nightly", night()).await;
    let first = cluster.deployment("web");
    let snoozed_at = cluster.window("nightly").status.last_snooze_time;

    cluster.tick_at("nightly", at(2025, 1, 1, 23, 30)).await;
    cluster.tick_at("nightly", at(2025, 1, 2, 1, 0)).await;

    similar_asserts::assert_eq!(cluster.deployment("web"), first);
    assert_eq!(cluster.window("nightly").status.last_snooze_time, snoozed_at);
}

#[tokio::test]
async fn resources_without_opt_in_are_never_mutated() {
    let cluster = Cluster::at(night());
    let mut bystander = deployment("db", 2);
    bystander["metadata"]["annotations"] = json!({});
    cluster
        .apply(nightly())
        .apply(deployment("web", 3))
        .apply(bystander);
    let before = cluster.deployment("db");

    cluster.tick_at("nightly", night()).await;
    similar_asserts::assert_eq!(cluster.deployment("db"), before);

    cluster.tick_at("nightly", morning()).await;
    similar_asserts::assert_eq!(cluster.deployment("db"), before);
    assert_eq!(cluster.window("nightly").status.managed_resources, 1);
}

#[tokio::test]
async fn resources_joining_mid_window_are_snoozed() {
    let cluster = Cluster::at(night());
    cluster.apply(nightly()).apply(deployment("web", 3));
    cluster.tick_at("nightly", night()).await;

    cluster.apply(deployment("late", 2));
    cluster.tick_at("nightly", at(2025, 1, 2, 1, 0)).await;

    assert_eq!(cluster.deployment("late").replicas(), Some(0));
    assert_eq!(cluster.window("nightly").status.managed_resources, 2);

    cluster.tick_at("nightly", morning()).await;
    assert_eq!(cluster.deployment("late").replicas(), Some(2));
}

#[tokio::test]
async fn full_state_backup_restores_the_whole_spec() {
    let cluster = Cluster::at(night());
    let mut window = nightly();
    window["spec"]["backup"] = json!({ "fullState": true });
    cluster.apply(window).apply(deployment("web", 3));
    let original = cluster.deployment("web");

    cluster.tick_at("nightly", night()).await;
    let mut snoozed = cluster.deployment("web");
    assert!(snoozed.has_annotation(BACKUP_STATE));

    // someone edits the template while it sleeps
    snoozed.spec["template"]["image"] = json!("web:2");
    cluster.store().update(&snoozed).await.unwrap();

    cluster.tick_at("nightly", morning()).await;
    let woken = cluster.deployment("web");
    similar_asserts::assert_eq!(woken.spec, original.spec);
    assert!(no_backup(&woken));
}

#[tokio::test]
async fn cronjobs_are_suspended_and_resumed() {
    let cluster = Cluster::at(night());
    let mut window = nightly();
    window["spec"]["resourceKinds"] = json!([{ "apiVersion": "batch/v1", "kind": "CronJob" }]);
    cluster.apply(window).apply(json!({
        "apiVersion": "batch/v1",
        "kind": "CronJob",
        "metadata": {
            "name": "report",
            "namespace": "dev",
            "annotations": { "kube-snooze/enabled": "true" }
        },
        "spec": { "schedule": "*/5 * * * *", "suspend": false }
    }));

    cluster.tick_at("nightly", night()).await;
    let snoozed = cluster.resource("CronJob", "report").unwrap();
    assert_eq!(snoozed.suspend(), Some(true));
    assert_eq!(snoozed.annotation(BACKUP_SUSPEND), Some("false"));

    cluster.tick_at("nightly", morning()).await;
    let woken = cluster.resource("CronJob", "report").unwrap();
    assert_eq!(woken.suspend(), Some(false));
    assert!(no_backup(&woken));
}

fn config_map(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": "dev",
            "annotations": { "kube-snooze/enabled": "true" }
        },
        "spec": { "mode": "on" }
    })
}

fn config_map_window(action: Value) -> Value {
    let mut window = nightly();
    window["spec"]["resourceKinds"] = json!([{ "apiVersion": "v1", "kind": "ConfigMap" }]);
    window["spec"]["action"] = action;
    window
}

#[tokio::test]
async fn patch_action_is_undone_on_wake() {
    let cluster = Cluster::at(night());
    cluster
        .apply(config_map_window(json!({
            "patch": { "patchType": "merge", "data": { "spec": { "mode": "off" } } }
        })))
        .apply(config_map("settings"));

    cluster.tick_at("nightly", night()).await;
    let snoozed = cluster.resource("ConfigMap", "settings").unwrap();
    assert_eq!(snoozed.spec, json!({ "mode": "off" }));
    assert!(snoozed.has_annotation(BACKUP_STATE));

    cluster.tick_at("nightly", morning()).await;
    let woken = cluster.resource("ConfigMap", "settings").unwrap();
    assert_eq!(woken.spec, json!({ "mode": "on" }));
    assert!(no_backup(&woken));
}

#[tokio::test]
async fn delete_action_is_one_way() {
    let cluster = Cluster::at(night());
    cluster
        .apply(config_map_window(json!("delete")))
        .apply(config_map("scratch"));

    cluster.tick_at("nightly", night()).await;
    assert!(cluster.resource("ConfigMap", "scratch").is_none());
    assert_eq!(cluster.window("nightly").status.phase, Phase::Snoozed);

    cluster.tick_at("nightly", morning()).await;
    assert!(cluster.resource("ConfigMap", "scratch").is_none());
    assert_eq!(cluster.window("nightly").status.phase, Phase::Awake);
}
