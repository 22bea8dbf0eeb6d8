// ── Integration context ──
//
// One configured alarm account: a coordinator, the command mediator bound
// to it, and the entity catalogue derived from the current snapshot.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use hyypsync_api::AlarmApi;

use crate::command::mediator::CommandMediator;
use crate::config::CoordinatorConfig;
use crate::coordinator::Coordinator;
use crate::entity::{AlarmPanel, DeviceInfo, LastEventSensor, PartitionView, SensorKind, ZoneSwitch};
use crate::error::CoreError;

/// Kind of exposed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    AlarmPanel,
    ZoneSwitch,
    Sensor,
}

/// Flat description of one entity, for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub unique_id: String,
    pub kind: EntityKind,
    pub name: String,
    pub state: Option<String>,
    pub available: bool,
    pub device: DeviceInfo,
}

/// A running integration instance, passed by reference to consumers.
///
/// Cheaply cloneable; clones share the coordinator.
#[derive(Clone)]
pub struct IntegrationContext {
    coordinator: Coordinator,
    mediator: CommandMediator,
}

impl IntegrationContext {
    /// Build the coordinator, run its first refresh and start polling.
    pub async fn setup(api: Arc<dyn AlarmApi>, config: CoordinatorConfig) -> Result<Self, CoreError> {
        let coordinator = Coordinator::new(api, config);
        coordinator.start().await?;
        let mediator = CommandMediator::new(coordinator.clone());
        info!(partitions = coordinator.snapshot().len(), "integration ready");
        Ok(Self {
            coordinator,
            mediator,
        })
    }

    /// Set up without periodic refresh, run `f`, then unload.
    ///
    /// `f` may return any error type a [`CoreError`] converts into.
    pub async fn oneshot<F, Fut, T, E>(
        api: Arc<dyn AlarmApi>,
        config: CoordinatorConfig,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(IntegrationContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        let mut cfg = config;
        cfg.refresh_interval = std::time::Duration::ZERO;

        let ctx = Self::setup(api, cfg).await?;
        let result = f(ctx.clone()).await;
        ctx.unload().await;
        result
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn commands(&self) -> &CommandMediator {
        &self.mediator
    }

    /// Stop background work. The context is consumed; build a new one to
    /// reload.
    pub async fn unload(self) {
        self.coordinator.shutdown().await;
        info!("integration unloaded");
    }

    /// Unload, then set up again with a new client and configuration.
    pub async fn reload(
        self,
        api: Arc<dyn AlarmApi>,
        config: CoordinatorConfig,
    ) -> Result<Self, CoreError> {
        self.unload().await;
        Self::setup(api, config).await
    }

    // ── Entity catalogue ─────────────────────────────────────────

    fn views(&self) -> Vec<PartitionView> {
        self.coordinator
            .snapshot()
            .partitions
            .keys()
            .map(|id| PartitionView::new(self.coordinator.clone(), id.clone()))
            .collect()
    }

    /// One alarm panel per partition.
    pub fn alarm_panels(&self) -> Vec<AlarmPanel> {
        self.views()
            .into_iter()
            .map(|view| AlarmPanel::new(view, self.mediator.clone()))
            .collect()
    }

    /// One switch per zone, in partition then zone order.
    pub fn zone_switches(&self) -> Vec<ZoneSwitch> {
        let snapshot = self.coordinator.snapshot();
        snapshot
            .iter()
            .flat_map(|partition| {
                partition.zones.keys().map(move |zone_id| {
                    ZoneSwitch::new(
                        PartitionView::new(self.coordinator.clone(), partition.id.clone()),
                        zone_id.clone(),
                        self.mediator.clone(),
                    )
                })
            })
            .collect()
    }

    /// Last-event time and name sensors for every partition.
    pub fn sensors(&self) -> Vec<LastEventSensor> {
        self.views()
            .into_iter()
            .flat_map(|view| {
                [SensorKind::DateTime, SensorKind::EventName]
                    .map(|kind| LastEventSensor::new(view.clone(), kind))
            })
            .collect()
    }

    /// Every entity as a flat summary. Entities whose partition vanished
    /// between calls are skipped.
    pub fn entities(&self) -> Vec<EntitySummary> {
        let panels = self.alarm_panels().into_iter().filter_map(|panel| {
            Some(EntitySummary {
                unique_id: panel.unique_id()?,
                kind: EntityKind::AlarmPanel,
                name: panel.name()?,
                state: panel.state().map(|s| s.to_string()),
                available: panel.available(),
                device: panel.view().device_info()?,
            })
        });

        let switches = self.zone_switches().into_iter().filter_map(|switch| {
            Some(EntitySummary {
                unique_id: switch.unique_id()?,
                kind: EntityKind::ZoneSwitch,
                name: switch.name()?,
                state: switch
                    .is_on()
                    .map(|on| if on { "on" } else { "off" }.to_owned()),
                available: switch.available(),
                device: switch.view().device_info()?,
            })
        });

        let sensors = self.sensors().into_iter().filter_map(|sensor| {
            Some(EntitySummary {
                unique_id: sensor.unique_id()?,
                kind: EntityKind::Sensor,
                name: sensor.name()?,
                state: sensor.value(),
                available: sensor.available(),
                device: sensor.view().device_info()?,
            })
        });

        panels.chain(switches).chain(sensors).collect()
    }
}
