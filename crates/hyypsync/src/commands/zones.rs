//! Zone listing handler.

use serde::Serialize;
use tabled::Tabled;

use hyypsync_core::{CoreError, IntegrationContext};

use crate::cli::{GlobalOpts, ZonesArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ZoneEntry {
    partition_id: String,
    zone_id: String,
    unique_id: String,
    name: String,
    bypassed: bool,
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Partition")]
    partition: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Bypassed")]
    bypassed: String,
}

pub fn handle(
    ctx: &IntegrationContext,
    args: &ZonesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref partition) = args.partition {
        if ctx.coordinator().partition(partition).is_none() {
            return Err(CoreError::PartitionNotFound {
                identifier: partition.clone(),
            }
            .into());
        }
    }

    let entries: Vec<ZoneEntry> = ctx
        .zone_switches()
        .into_iter()
        .filter(|switch| {
            args.partition
                .as_deref()
                .is_none_or(|p| p == switch.view().partition_id())
        })
        .filter_map(|switch| {
            let zone = switch.zone()?;
            Some(ZoneEntry {
                partition_id: switch.view().partition_id().to_owned(),
                zone_id: zone.id.clone(),
                unique_id: switch.unique_id()?,
                name: switch.name()?,
                bypassed: zone.bypassed,
            })
        })
        .filter(|entry| !args.bypassed || entry.bypassed)
        .collect();

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &entries,
        |e| ZoneRow {
            partition: e.partition_id.clone(),
            zone: e.zone_id.clone(),
            name: e.name.clone(),
            bypassed: output::paint_flag(e.bypassed, color),
        },
        |e| e.zone_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
