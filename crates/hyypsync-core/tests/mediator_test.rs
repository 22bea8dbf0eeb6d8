#![allow(clippy::unwrap_used)]
// Integration tests for `CommandMediator` and the entity views built on it.

mod common;

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use hyypsync_api::{ApiResponse, BypassFlags, Error};
use hyypsync_core::{
    AlarmState, CommandStatus, ConnectionState, CoordinatorConfig, CoreError, EntityKind,
    IntegrationContext, StayMode,
};

use common::{PartitionFlags, ScriptedApi, context, disarmed, listing, manual_config};

fn code(value: &str) -> Option<SecretString> {
    Some(SecretString::from(value.to_string()))
}

// ── Arm / disarm ────────────────────────────────────────────────────

#[tokio::test]
async fn arm_away_success_shows_armed_away_immediately() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    let result = ctx.commands().arm_away("p1", code("1234")).await.unwrap();

    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::ArmedAway));
    // The snapshot itself still holds what the service last reported.
    assert!(!ctx.coordinator().snapshot().partition("p1").unwrap().armed);

    let requests = api.arm_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].arm);
    assert_eq!(requests[0].site_id, "s1");
    assert_eq!(requests[0].stay_profile_id, None);
    assert_eq!(requests[0].pin.as_ref().unwrap().expose_secret(), "1234");
}

#[tokio::test]
async fn optimistic_state_is_cleared_by_next_refresh() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    ctx.commands().arm_away("p1", None).await.unwrap();
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::ArmedAway));

    ctx.coordinator().refresh().await.unwrap();
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::Disarmed));
}

#[tokio::test]
async fn disarm_success_shows_disarmed() {
    let api = ScriptedApi::new(listing(PartitionFlags {
        armed: true,
        ..PartitionFlags::default()
    }));
    let ctx = context(&api, manual_config()).await;
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::ArmedAway));

    ctx.commands().disarm("p1", code("1234")).await.unwrap();

    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::Disarmed));
    assert!(!api.arm_requests()[0].arm);
}

#[tokio::test]
async fn arm_stay_uses_first_stay_profile_and_stay_mode() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(
        &api,
        CoordinatorConfig {
            stay_mode: StayMode::Home,
            ..manual_config()
        },
    )
    .await;

    ctx.commands().arm_stay("p1", None).await.unwrap();

    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::ArmedHome));
    assert_eq!(api.arm_requests()[0].stay_profile_id.as_deref(), Some("sp1"));
}

#[tokio::test]
async fn arm_stay_prefers_designated_profile() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(
        &api,
        CoordinatorConfig {
            stay_profiles: HashMap::from([("p1".to_owned(), "sp2".to_owned())]),
            ..manual_config()
        },
    )
    .await;

    ctx.commands().arm_stay("p1", None).await.unwrap();

    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::ArmedNight));
    assert_eq!(api.arm_requests()[0].stay_profile_id.as_deref(), Some("sp2"));
}

#[tokio::test]
async fn arm_stay_without_profiles_is_unsupported() {
    let mut bare = disarmed();
    bare.sites[0].partitions[0].stay_profiles.clear();
    let api = ScriptedApi::new(bare);
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().arm_stay("p1", None).await.unwrap_err();

    assert!(matches!(err, CoreError::Unsupported { .. }), "{err:?}");
    assert!(api.arm_requests().is_empty());
}

#[tokio::test]
async fn rejected_arm_carries_raw_response_and_keeps_state() {
    let api = ScriptedApi::new(disarmed());
    api.push_arm_response(Ok(ApiResponse::from_raw(json!({
        "status": "FAILED",
        "violatedZones": ["Front Door"]
    }))));
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().arm_away("p1", None).await.unwrap_err();

    match &err {
        CoreError::CommandRejected { status, raw, .. } => {
            assert_eq!(status, "FAILED");
            assert_eq!(raw["violatedZones"][0], "Front Door");
        }
        other => panic!("expected CommandRejected, got {other:?}"),
    }
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::Disarmed));
}

#[tokio::test]
async fn pending_arm_is_rejected() {
    let api = ScriptedApi::new(disarmed());
    api.push_arm_response(Ok(ApiResponse::with_status("PENDING")));
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().arm_away("p1", None).await.unwrap_err();
    assert!(matches!(err, CoreError::CommandRejected { .. }), "{err:?}");
}

#[tokio::test]
async fn transport_errors_are_wrapped_with_cause() {
    let api = ScriptedApi::new(disarmed());
    api.push_arm_response(Err(Error::Transport("connection reset".into())));
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().disarm("p1", None).await.unwrap_err();

    assert!(matches!(err, CoreError::Command { operation: "disarm", .. }), "{err:?}");
    assert!(err.is_transient());
    assert!(matches!(err.root_cause(), CoreError::Transport { .. }));
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::Disarmed));
}

#[tokio::test]
async fn expired_session_during_command_requires_reauth() {
    let api = ScriptedApi::new(disarmed());
    api.push_bypass_response(Err(Error::SessionExpired));
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().bypass_zone("p1", "z1", None).await.unwrap_err();
    assert!(err.requires_reauth());
}

// ── Code resolution ─────────────────────────────────────────────────

#[tokio::test]
async fn explicit_code_beats_configured_code() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(
        &api,
        CoordinatorConfig {
            partition_codes: HashMap::from([(
                "p1".to_owned(),
                SecretString::from("0000".to_string()),
            )]),
            ..manual_config()
        },
    )
    .await;

    ctx.commands().arm_away("p1", code("9999")).await.unwrap();
    ctx.commands().arm_away("p1", None).await.unwrap();

    let pins: Vec<String> = api
        .arm_requests()
        .iter()
        .map(|r| r.pin.as_ref().unwrap().expose_secret().to_owned())
        .collect();
    assert_eq!(pins, vec!["9999", "0000"]);
}

#[tokio::test]
async fn no_code_is_sent_when_none_configured() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    ctx.commands().bypass_zone("p1", "z1", None).await.unwrap();
    assert!(api.bypass_requests()[0].code.is_none());
}

// ── Bypass ──────────────────────────────────────────────────────────

#[tokio::test]
async fn bypass_pending_requires_code_and_leaves_zone() {
    let api = ScriptedApi::new(disarmed());
    api.push_bypass_response(Ok(ApiResponse::with_status("PENDING")));
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().bypass_zone("p1", "z1", None).await.unwrap_err();

    assert!(err.is_code_required(), "{err:?}");
    assert!(err.raw_response().is_some());
    assert_eq!(ctx.coordinator().fetch_count(), 1);
    assert!(!ctx.coordinator().snapshot().zone("p1", "z1").unwrap().bypassed);
}

#[tokio::test]
async fn bypass_success_triggers_exactly_one_refresh() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    let result = ctx.commands().bypass_zone("p1", "z1", code("55")).await.unwrap();

    assert!(result.is_success());
    assert_eq!(ctx.coordinator().fetch_count(), 2);
    // The service has not reported the bypass yet, and nothing flipped it
    // locally.
    assert!(!ctx.coordinator().snapshot().zone("p1", "z1").unwrap().bypassed);

    let request = &api.bypass_requests()[0];
    assert_eq!(request.zone_id, "z1");
    assert_eq!(request.flags, BypassFlags::BYPASS);
}

#[tokio::test]
async fn bypass_success_shows_zone_once_refreshed() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;
    api.set_listing(listing(PartitionFlags {
        zone_bypassed: true,
        ..PartitionFlags::default()
    }));

    ctx.commands().bypass_zone("p1", "z1", None).await.unwrap();

    assert!(ctx.coordinator().snapshot().zone("p1", "z1").unwrap().bypassed);
}

#[tokio::test]
async fn bypass_success_survives_failed_refresh() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;
    api.fail_listing(Error::Transport("timeout".into()));

    let result = ctx.commands().bypass_zone("p1", "z1", None).await;

    assert!(result.is_ok());
    assert_eq!(ctx.coordinator().fetch_count(), 2);
}

#[tokio::test]
async fn bypass_failure_is_rejected_without_refresh() {
    let api = ScriptedApi::new(disarmed());
    api.push_bypass_response(Ok(ApiResponse::with_status("DENIED")));
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().unbypass_zone("p1", "z1", None).await.unwrap_err();

    assert!(matches!(err, CoreError::CommandRejected { .. }), "{err:?}");
    assert_eq!(ctx.coordinator().fetch_count(), 1);
    assert!(api.bypass_requests()[0].flags.is_empty());
}

#[tokio::test]
async fn unknown_targets_are_not_found() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    let err = ctx.commands().arm_away("nope", None).await.unwrap_err();
    assert!(matches!(err, CoreError::PartitionNotFound { .. }));

    let err = ctx.commands().bypass_zone("p1", "z9", None).await.unwrap_err();
    assert!(matches!(err, CoreError::ZoneNotFound { .. }));

    assert!(api.arm_requests().is_empty());
    assert!(api.bypass_requests().is_empty());
}

#[tokio::test]
async fn dispatch_does_not_touch_local_state() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    let cmd = hyypsync_core::Command::ArmAway {
        partition_id: "p1".into(),
        code: None,
    };
    let result = ctx.commands().dispatch(&cmd).await.unwrap();

    assert!(result.is_success());
    assert_eq!(ctx.coordinator().alarm_state("p1"), Some(AlarmState::Disarmed));
}

// ── Entities ────────────────────────────────────────────────────────

#[tokio::test]
async fn entity_catalogue_uses_stable_ids() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;

    let ids: Vec<String> = ctx.entities().into_iter().map(|e| e.unique_id).collect();
    assert_eq!(
        ids,
        vec![
            "s1_p1_Alarm",
            "s1_p1_z1",
            "s1_p1_z2",
            "s1_p1_dateTime",
            "s1_p1_eventName",
        ]
    );

    let entities = ctx.entities();
    assert_eq!(entities[0].kind, EntityKind::AlarmPanel);
    assert_eq!(entities[0].state.as_deref(), Some("disarmed"));
    assert_eq!(entities[0].device.manufacturer, "IDS");
    assert_eq!(entities[0].device.model, "Hyyp");
    assert_eq!(entities[1].name, "Front Door");
    assert_eq!(entities[1].state.as_deref(), Some("on"));
    assert_eq!(entities[3].name, "Home Last Event Datetime");
    assert_eq!(entities[4].name, "Home Last Event Eventname");
    assert_eq!(entities[4].state.as_deref(), Some("Disarmed by user"));
}

#[tokio::test]
async fn zone_switch_off_bypasses_and_on_restores() {
    let api = ScriptedApi::new(disarmed());
    let ctx = context(&api, manual_config()).await;
    let switch = ctx
        .zone_switches()
        .into_iter()
        .find(|s| s.zone_id() == "z1")
        .unwrap();
    assert_eq!(switch.is_on(), Some(true));

    switch.turn_off(None).await.unwrap();
    switch.turn_on(None).await.unwrap();

    let flags: Vec<BypassFlags> = api.bypass_requests().iter().map(|r| r.flags).collect();
    assert_eq!(flags, vec![BypassFlags::BYPASS, BypassFlags::empty()]);
}

#[tokio::test]
async fn panel_follows_site_availability() {
    let mut offline = disarmed();
    offline.sites[0].online = false;
    let api = ScriptedApi::new(offline);
    let ctx = context(&api, manual_config()).await;

    let panel = ctx.alarm_panels().remove(0);
    assert!(!panel.available());
    assert_eq!(panel.state(), Some(AlarmState::Disarmed));
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn oneshot_runs_closure_then_unloads() {
    let api = ScriptedApi::new(disarmed());

    let (coordinator, result) = IntegrationContext::oneshot(
        api.clone(),
        CoordinatorConfig::default(),
        |ctx| async move {
            let result = ctx.commands().arm_away("p1", None).await?;
            Ok::<_, CoreError>((ctx.coordinator().clone(), result))
        },
    )
    .await
    .unwrap();

    assert!(result.is_success());
    assert_eq!(coordinator.state(), ConnectionState::Disconnected);
    assert_eq!(api.list_calls(), 1);
}

#[tokio::test]
async fn oneshot_reports_setup_failure_without_running_closure() {
    let api = ScriptedApi::new(disarmed());
    api.fail_listing(Error::SessionExpired);

    let err = IntegrationContext::oneshot(api.clone(), manual_config(), |_ctx| async {
        Ok::<_, CoreError>(())
    })
    .await
    .unwrap_err();

    assert!(err.requires_reauth());
    assert!(api.arm_requests().is_empty());
}
