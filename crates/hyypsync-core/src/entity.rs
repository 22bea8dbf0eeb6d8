// ── Entity views ──
//
// Observers over the coordinator's snapshot, one per exposed device. A view
// holds keys only; every read goes through the latest published snapshot.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;

use crate::command::CommandResult;
use crate::command::mediator::CommandMediator;
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::{AlarmState, Partition, Zone};

pub const MANUFACTURER: &str = "IDS";
pub const MODEL: &str = "Hyyp";

/// Device registry details shared by every entity of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Site id; groups the site's entities under one device.
    pub identifier: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub name: String,
}

/// A partition-keyed observer of the coordinator.
#[derive(Clone)]
pub struct PartitionView {
    coordinator: Coordinator,
    partition_id: String,
}

impl PartitionView {
    pub fn new(coordinator: Coordinator, partition_id: impl Into<String>) -> Self {
        Self {
            coordinator,
            partition_id: partition_id.into(),
        }
    }

    pub fn partition_id(&self) -> &str {
        &self.partition_id
    }

    /// The partition as of the latest snapshot; `None` once it disappears
    /// from the listing.
    pub fn data(&self) -> Option<Arc<Partition>> {
        self.coordinator.partition(&self.partition_id)
    }

    /// Available while the partition's site is online.
    pub fn available(&self) -> bool {
        self.data().is_some_and(|p| p.is_available())
    }

    pub fn site_id(&self) -> Option<String> {
        self.data().map(|p| p.site.id.clone())
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.data().map(|p| DeviceInfo {
            identifier: p.site.id.clone(),
            manufacturer: MANUFACTURER,
            model: MODEL,
            name: p.name.clone(),
        })
    }

    fn unique_id(&self, suffix: &str) -> Option<String> {
        self.site_id()
            .map(|site| format!("{site}_{}_{suffix}", self.partition_id))
    }
}

// ── Alarm panel ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct AlarmPanel {
    view: PartitionView,
    mediator: CommandMediator,
}

impl AlarmPanel {
    pub fn new(view: PartitionView, mediator: CommandMediator) -> Self {
        Self { view, mediator }
    }

    pub fn view(&self) -> &PartitionView {
        &self.view
    }

    pub fn unique_id(&self) -> Option<String> {
        self.view.unique_id("Alarm")
    }

    pub fn name(&self) -> Option<String> {
        self.view.data().map(|p| p.name.clone())
    }

    pub fn available(&self) -> bool {
        self.view.available()
    }

    /// Optimistic state if a command recorded one since the last fetch
    /// started, else derived from the snapshot.
    pub fn state(&self) -> Option<AlarmState> {
        self.mediator
            .coordinator()
            .alarm_state(self.view.partition_id())
    }

    pub async fn arm_away(&self, code: Option<SecretString>) -> Result<CommandResult, CoreError> {
        self.mediator.arm_away(self.view.partition_id(), code).await
    }

    pub async fn arm_stay(&self, code: Option<SecretString>) -> Result<CommandResult, CoreError> {
        self.mediator.arm_stay(self.view.partition_id(), code).await
    }

    pub async fn disarm(&self, code: Option<SecretString>) -> Result<CommandResult, CoreError> {
        self.mediator.disarm(self.view.partition_id(), code).await
    }
}

// ── Zone switch ──────────────────────────────────────────────────

/// A zone exposed as a switch: on while the zone is armed (not bypassed).
#[derive(Clone)]
pub struct ZoneSwitch {
    view: PartitionView,
    zone_id: String,
    mediator: CommandMediator,
}

impl ZoneSwitch {
    pub fn new(view: PartitionView, zone_id: impl Into<String>, mediator: CommandMediator) -> Self {
        Self {
            view,
            zone_id: zone_id.into(),
            mediator,
        }
    }

    pub fn view(&self) -> &PartitionView {
        &self.view
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn zone(&self) -> Option<Zone> {
        self.view.data()?.zone(&self.zone_id).cloned()
    }

    pub fn unique_id(&self) -> Option<String> {
        self.view.unique_id(&self.zone_id)
    }

    pub fn name(&self) -> Option<String> {
        self.zone().map(|z| title_case(&z.name))
    }

    pub fn available(&self) -> bool {
        self.view.available()
    }

    pub fn is_on(&self) -> Option<bool> {
        self.zone().map(|z| !z.bypassed)
    }

    /// Restore the zone so it arms with the partition.
    pub async fn turn_on(&self, code: Option<SecretString>) -> Result<CommandResult, CoreError> {
        self.mediator
            .unbypass_zone(self.view.partition_id(), &self.zone_id, code)
            .await
    }

    /// Bypass the zone.
    pub async fn turn_off(&self, code: Option<SecretString>) -> Result<CommandResult, CoreError> {
        self.mediator
            .bypass_zone(self.view.partition_id(), &self.zone_id, code)
            .await
    }
}

// ── Last-event sensors ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum SensorKind {
    #[strum(serialize = "dateTime")]
    DateTime,
    #[strum(serialize = "eventName")]
    EventName,
}

/// One field of a partition's last notification.
#[derive(Clone)]
pub struct LastEventSensor {
    view: PartitionView,
    kind: SensorKind,
}

impl LastEventSensor {
    pub fn new(view: PartitionView, kind: SensorKind) -> Self {
        Self { view, kind }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn view(&self) -> &PartitionView {
        &self.view
    }

    pub fn unique_id(&self) -> Option<String> {
        self.view.unique_id(&self.kind.to_string())
    }

    /// `"{site} Last Event Datetime"` or `"{site} Last Event Eventname"`.
    pub fn name(&self) -> Option<String> {
        let label = title_case(&self.kind.to_string());
        self.view
            .data()
            .map(|p| format!("{} Last Event {label}", p.site.name))
    }

    pub fn available(&self) -> bool {
        self.view.available()
    }

    pub fn value(&self) -> Option<String> {
        let partition = self.view.data()?;
        match self.kind {
            SensorKind::DateTime => partition.last_notification.date_time.clone(),
            SensorKind::EventName => partition.last_notification.event_name.clone(),
        }
    }
}

/// Capitalize the first letter of each word, lowercase the rest.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
