//! Schedule specs
//!
//! Verify when windows snooze and wake.

use crate::prelude::*;

#[tokio::test]
async fn window_rolls_over_midnight() {
    let cluster = Cluster::at(at(2025, 1, 1, 23, 0));
    cluster.apply(nightly()).apply(deployment("web", 3));

    cluster.tick_at("nightly", at(2025, 1, 1, 23, 0)).await;
    assert_eq!(cluster.window("nightly").status.phase, Phase::Snoozed);

    cluster.tick_at("nightly", at(2025, 1, 2, 5, 0)).await;
    assert_eq!(cluster.window("nightly").status.phase, Phase::Snoozed);
    assert_eq!(cluster.deployment("web").replicas(), Some(0));

    cluster.tick_at("nightly", at(2025, 1, 2, 7, 0)).await;
    assert_eq!(cluster.window("nightly").status.phase, Phase::Awake);
    assert_eq!(cluster.deployment("web").replicas(), Some(3));
}

#[tokio::test]
async fn weekday_cron_follows_latest_firing() {
    let cluster = Cluster::at(at(2025, 1, 7, 22, 5));
    cluster
        .apply(window(
            "weeknights",
            json!({ "cron": { "snoozeAt": "0 22 * * 1-5", "wakeAt": "0 6 * * 1-5" } }),
        ))
        .apply(deployment("web", 2));

    // Tuesday 22:05
    cluster.tick_at("weeknights", at(2025, 1, 7, 22, 5)).await;
    assert_eq!(cluster.window("weeknights").status.phase, Phase::Snoozed);

    // Wednesday 06:05
    cluster.tick_at("weeknights", at(2025, 1, 8, 6, 5)).await;
    assert_eq!(cluster.window("weeknights").status.phase, Phase::Awake);
    assert_eq!(cluster.deployment("web").replicas(), Some(2));
}

#[tokio::test]
async fn cron_requeue_is_capped() {
    let cluster = Cluster::at(at(2025, 1, 10, 23, 0));
    cluster.apply(window(
        "weeknights",
        json!({ "cron": { "snoozeAt": "0 22 * * 1-5", "wakeAt": "0 6 * * 1-5" } }),
    ));

    // Friday night: the next firing is Monday morning
    let outcome = cluster.tick_at("weeknights", at(2025, 1, 10, 23, 0)).await;
    assert_eq!(
        outcome,
        TickOutcome::Requeue(std::time::Duration::from_secs(600))
    );
}

#[tokio::test]
async fn timezone_shifts_the_window() {
    let cluster = Cluster::at(at(2025, 1, 1, 14, 0));
    cluster
        .apply(window(
            "tokyo",
            json!({
                "window": { "start": "22:00", "end": "06:00", "date": "2025-01-01" },
                "timezone": "Asia/Tokyo"
            }),
        ))
        .apply(deployment("web", 3));

    // 14:00 UTC is 23:00 in Tokyo
    cluster.tick_at("tokyo", at(2025, 1, 1, 14, 0)).await;
    assert_eq!(cluster.deployment("web").replicas(), Some(0));

    // 22:00 UTC is 07:00 the next morning in Tokyo
    cluster.tick_at("tokyo", at(2025, 1, 1, 22, 0)).await;
    assert_eq!(cluster.deployment("web").replicas(), Some(3));
}

#[tokio::test]
async fn invalid_timezone_leaves_resources_untouched() {
    let cluster = Cluster::at(at(2025, 1, 1, 23, 0));
    cluster
        .apply(window(
            "broken",
            json!({
                "window": { "start": "22:00", "end": "06:00", "date": "2025-01-01" },
                "timezone": "Not/AZone"
            }),
        ))
        .apply(deployment("web", 3));
    let before = cluster.deployment("web");

    let err = cluster.reconcile("broken").await.unwrap_err();

    assert_eq!(err.reason(), "InvalidTimezone");
    similar_asserts::assert_eq!(cluster.deployment("web"), before);
    let ready = cluster.window("broken").status.conditions[0].clone();
    assert_eq!(ready.kind, "Ready");
    assert_eq!(ready.status, ConditionStatus::False);
    assert_eq!(ready.reason, "InvalidTimezone");
}

#[tokio::test]
async fn window_and_cron_together_are_rejected() {
    let cluster = Cluster::at(at(2025, 1, 1, 23, 0));
    cluster.apply(window(
        "both",
        json!({
            "cron": { "snoozeAt": "0 22 * * *", "wakeAt": "0 6 * * *" },
            "window": { "start": "22:00", "end": "06:00", "date": "2025-01-01" }
        }),
    ));

    let err = cluster.reconcile("both").await.unwrap_err();
    assert_eq!(err.reason(), "InvalidSchedule");
}
