//! Partition status handler.

use serde::Serialize;
use tabled::Tabled;

use hyypsync_core::{AlarmState, IntegrationContext, Partition};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// One partition's state as shown by `status` and `watch`.
#[derive(Debug, Serialize)]
pub struct PartitionStatus {
    pub partition_id: String,
    pub name: String,
    pub site_id: String,
    pub site_name: String,
    pub online: bool,
    pub state: AlarmState,
    pub armed: bool,
    pub stay_armed: bool,
    pub alarm: bool,
    pub zones: usize,
    pub bypassed_zones: usize,
    pub last_event: Option<String>,
}

impl PartitionStatus {
    fn new(partition: &Partition, state: AlarmState) -> Self {
        Self {
            partition_id: partition.id.clone(),
            name: partition.name.clone(),
            site_id: partition.site.id.clone(),
            site_name: partition.site.name.clone(),
            online: partition.site.online,
            state,
            armed: partition.armed,
            stay_armed: partition.stay_armed,
            alarm: partition.alarm,
            zones: partition.zones.len(),
            bypassed_zones: partition.zones.values().filter(|z| z.bypassed).count(),
            last_event: partition.last_notification.event_name.clone(),
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Partition")]
    name: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Zones")]
    zones: String,
    #[tabled(rename = "Last event")]
    last_event: String,
}

fn row(status: &PartitionStatus, color: bool) -> StatusRow {
    let site = if status.online {
        status.site_name.clone()
    } else {
        format!("{} (offline)", status.site_name)
    };
    let zones = if status.bypassed_zones == 0 {
        status.zones.to_string()
    } else {
        format!("{} ({} bypassed)", status.zones, status.bypassed_zones)
    };
    StatusRow {
        id: status.partition_id.clone(),
        name: status.name.clone(),
        site,
        state: output::paint_state(status.state, color),
        zones,
        last_event: status.last_event.clone().unwrap_or_default(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// Current status of every partition, optimistic state included.
pub fn collect(ctx: &IntegrationContext) -> Vec<PartitionStatus> {
    let coordinator = ctx.coordinator();
    let stay_mode = coordinator.config().stay_mode;
    coordinator
        .snapshot()
        .iter()
        .map(|partition| {
            let state = coordinator
                .alarm_state(&partition.id)
                .unwrap_or_else(|| partition.alarm_state(stay_mode));
            PartitionStatus::new(partition, state)
        })
        .collect()
}

pub fn render(ctx: &IntegrationContext, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(global.color);
    output::render_list(
        global.output,
        &collect(ctx),
        |s| row(s, color),
        |s| format!("{}\t{}", s.partition_id, s.state),
    )
}

pub fn handle(ctx: &IntegrationContext, global: &GlobalOpts) -> Result<(), CliError> {
    let out = render(ctx, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
