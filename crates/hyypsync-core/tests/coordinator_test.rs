#![allow(clippy::unwrap_used)]
// Integration tests for `Coordinator` refresh scheduling and failure
// handling, driven through a scripted `AlarmApi`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;

use hyypsync_api::{Error, SiteListing};
use hyypsync_core::{
    AlarmState, CommandMediator, ConnectionState, Coordinator, CoordinatorConfig, CoreError,
    StayMode,
};

use common::{PartitionFlags, ScriptedApi, disarmed, listing, manual_config};

fn coordinator(api: &Arc<ScriptedApi>, config: CoordinatorConfig) -> Coordinator {
    Coordinator::new(api.clone(), config)
}

// ── Startup ─────────────────────────────────────────────────────────

#[tokio::test]
async fn start_publishes_first_snapshot() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, manual_config());
    assert_eq!(coord.state(), ConnectionState::Disconnected);

    coord.start().await.unwrap();

    assert_eq!(coord.state(), ConnectionState::Ready);
    assert_eq!(coord.fetch_count(), 1);
    let snapshot = coord.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.fetched_at.is_some());
    assert_eq!(coord.last_refresh(), snapshot.fetched_at);
    assert_eq!(coord.alarm_state("p1"), Some(AlarmState::Disarmed));
}

#[tokio::test]
async fn first_refresh_failure_is_not_ready() {
    let api = ScriptedApi::new(disarmed());
    api.fail_listing(Error::Transport("connection refused".into()));
    let coord = coordinator(&api, manual_config());

    let err = coord.start().await.unwrap_err();

    assert!(matches!(err, CoreError::NotReady { .. }), "{err:?}");
    assert!(err.is_transient());
    assert_eq!(coord.state(), ConnectionState::Failed);
    assert!(coord.snapshot().is_empty());
}

#[tokio::test]
async fn first_refresh_with_invalid_session_requires_reauth() {
    let api = ScriptedApi::new(disarmed());
    api.fail_listing(Error::SessionExpired);
    let coord = coordinator(&api, manual_config());

    let err = coord.start().await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }), "{err:?}");
    assert_eq!(coord.state(), ConnectionState::ReauthRequired);
}

// ── Refresh semantics ───────────────────────────────────────────────

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();
    let before = coord.snapshot();

    api.fail_listing(Error::Api {
        message: "internal error".into(),
        code: Some("500".into()),
    });
    let err = coord.refresh().await.unwrap_err();

    assert!(matches!(err, CoreError::Api { .. }));
    assert!(Arc::ptr_eq(&before, &coord.snapshot()));
    assert_eq!(coord.last_refresh(), before.fetched_at);
}

#[tokio::test]
async fn malformed_listing_keeps_previous_snapshot() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();
    let before = coord.snapshot();

    let mut duplicated = disarmed();
    let site = duplicated.sites[0].clone();
    duplicated.sites.push(site);
    api.set_listing(duplicated);

    let err = coord.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::MalformedResponse { .. }));
    assert!(Arc::ptr_eq(&before, &coord.snapshot()));
}

#[tokio::test]
async fn refresh_publishes_new_state() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();
    let mut stream = coord.subscribe();
    let _ = stream.latest();

    api.set_listing(listing(PartitionFlags {
        armed: true,
        ..PartitionFlags::default()
    }));
    coord.refresh().await.unwrap();

    let published = stream.changed().await.unwrap();
    assert!(published.partition("p1").unwrap().armed);
    assert_eq!(coord.alarm_state("p1"), Some(AlarmState::ArmedAway));
}

#[tokio::test]
async fn snapshot_stream_yields_current_then_each_publish() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();
    let mut stream = coord.subscribe().into_stream();

    let first = stream.next().await.unwrap();
    assert!(Arc::ptr_eq(&first, &coord.snapshot()));

    api.set_listing(listing(PartitionFlags {
        alarm: true,
        ..PartitionFlags::default()
    }));
    coord.refresh().await.unwrap();

    let second = stream.next().await.unwrap();
    assert!(second.partition("p1").unwrap().alarm);
    assert_eq!(coord.alarm_state("p1"), Some(AlarmState::Triggered));
}

#[tokio::test]
async fn stay_mode_selects_stay_state() {
    let api = ScriptedApi::new(listing(PartitionFlags {
        armed: true,
        stay_armed: true,
        ..PartitionFlags::default()
    }));
    let coord = coordinator(
        &api,
        CoordinatorConfig {
            stay_mode: StayMode::Home,
            ..manual_config()
        },
    );
    coord.start().await.unwrap();

    assert_eq!(coord.alarm_state("p1"), Some(AlarmState::ArmedHome));
}

#[tokio::test]
async fn refresh_attaches_to_fetch_in_flight() {
    let api = ScriptedApi::gated(disarmed());
    api.release(1);
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();

    let first = tokio::spawn({
        let coord = coord.clone();
        async move { coord.refresh().await }
    });
    api.wait_for_list_calls(2).await;

    let attached: Vec<_> = (0..3)
        .map(|_| {
            let coord = coord.clone();
            tokio::spawn(async move { coord.refresh().await })
        })
        .collect();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    api.release(10);
    let first = first.await.unwrap().unwrap();
    for handle in attached {
        let snapshot = handle.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &snapshot));
    }
    assert_eq!(coord.fetch_count(), 2);
    assert_eq!(api.list_calls(), 2);
}

#[tokio::test]
async fn optimistic_state_dropped_with_its_partition() {
    let api = ScriptedApi::gated(disarmed());
    api.release(1);
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();
    let mediator = CommandMediator::new(coord.clone());

    let in_flight = tokio::spawn({
        let coord = coord.clone();
        async move { coord.refresh().await }
    });
    api.wait_for_list_calls(2).await;
    mediator.arm_away("p1", None).await.unwrap();
    assert_eq!(coord.alarm_state("p1"), Some(AlarmState::ArmedAway));

    api.set_listing(SiteListing { sites: Vec::new() });
    api.release(1);
    let snapshot = in_flight.await.unwrap().unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(coord.alarm_state("p1"), None);
}

#[tokio::test]
async fn concurrent_requests_cause_one_extra_fetch() {
    let api = ScriptedApi::gated(disarmed());
    api.release(1);
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();

    let in_flight = tokio::spawn({
        let coord = coord.clone();
        async move { coord.refresh().await }
    });
    api.wait_for_list_calls(2).await;

    let requests: Vec<_> = (0..5)
        .map(|_| {
            let coord = coord.clone();
            tokio::spawn(async move { coord.request_refresh().await })
        })
        .collect();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    api.release(10);
    let in_flight = in_flight.await.unwrap().unwrap();
    let mut follow_ups = Vec::new();
    for handle in requests {
        follow_ups.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(coord.fetch_count(), 3);
    assert_eq!(api.list_calls(), 3);
    for snapshot in &follow_ups {
        assert!(!Arc::ptr_eq(&in_flight, snapshot));
        assert!(Arc::ptr_eq(&follow_ups[0], snapshot));
    }
}

#[tokio::test]
async fn request_refresh_when_idle_fetches_once() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, manual_config());
    coord.start().await.unwrap();

    coord.request_refresh().await.unwrap();
    assert_eq!(coord.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn remote_call_is_bounded_by_timeout() {
    let api = ScriptedApi::gated(disarmed());
    api.release(1);
    let coord = coordinator(
        &api,
        CoordinatorConfig {
            timeout: Duration::from_secs(3),
            ..manual_config()
        },
    );
    coord.start().await.unwrap();
    let before = coord.snapshot();

    let err = coord.refresh().await.unwrap_err();

    assert!(matches!(err, CoreError::Timeout { timeout_secs: 3 }), "{err:?}");
    assert!(err.is_transient());
    assert!(Arc::ptr_eq(&before, &coord.snapshot()));
}

// ── Periodic task ───────────────────────────────────────────────────

fn periodic_config() -> CoordinatorConfig {
    CoordinatorConfig {
        refresh_interval: Duration::from_secs(25),
        ..CoordinatorConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn periodic_task_refreshes_on_interval() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, periodic_config());
    coord.start().await.unwrap();
    assert_eq!(coord.fetch_count(), 1);

    tokio::time::sleep(Duration::from_secs(26)).await;
    assert_eq!(coord.fetch_count(), 2);

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(coord.fetch_count(), 3);

    coord.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn periodic_auth_failure_requires_reauth_then_recovers() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, periodic_config());
    coord.start().await.unwrap();
    let before = coord.snapshot();

    api.fail_listing(Error::SessionExpired);
    tokio::time::sleep(Duration::from_secs(26)).await;
    assert_eq!(coord.state(), ConnectionState::ReauthRequired);
    assert!(Arc::ptr_eq(&before, &coord.snapshot()));

    api.set_listing(disarmed());
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(coord.state(), ConnectionState::Ready);

    coord.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn periodic_transient_failure_keeps_ready() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, periodic_config());
    coord.start().await.unwrap();

    api.fail_listing(Error::Transport("reset by peer".into()));
    tokio::time::sleep(Duration::from_secs(26)).await;

    assert_eq!(coord.fetch_count(), 2);
    assert_eq!(coord.state(), ConnectionState::Ready);
    assert_eq!(coord.snapshot().len(), 1);

    coord.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_periodic_refresh() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, periodic_config());
    coord.start().await.unwrap();

    coord.shutdown().await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(coord.fetch_count(), 1);
    assert_eq!(coord.state(), ConnectionState::Disconnected);
    assert_eq!(coord.snapshot().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn second_start_replaces_periodic_task() {
    let api = ScriptedApi::new(disarmed());
    let coord = coordinator(&api, periodic_config());
    coord.start().await.unwrap();
    coord.start().await.unwrap();
    assert_eq!(coord.fetch_count(), 2);

    tokio::time::sleep(Duration::from_secs(26)).await;
    assert_eq!(coord.fetch_count(), 3, "only one periodic task should run");

    let stopped = tokio::time::timeout(Duration::from_secs(120), coord.shutdown()).await;
    assert!(stopped.is_ok(), "shutdown should finish after a second start");
    assert_eq!(coord.state(), ConnectionState::Disconnected);
}
