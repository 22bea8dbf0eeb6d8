//! Last-event handler.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tabled::Tabled;

use hyypsync_core::IntegrationContext;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct EventEntry {
    partition_id: String,
    partition: String,
    event_name: Option<String>,
    /// As the service reported it.
    date_time: Option<String>,
    /// Parsed, when the service's format is recognised.
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Partition")]
    partition: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "When")]
    when: String,
}

fn when(entry: &EventEntry) -> String {
    match (entry.timestamp, entry.date_time.as_deref()) {
        (Some(ts), _) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        (None, Some(raw)) => raw.to_owned(),
        (None, None) => "-".into(),
    }
}

pub fn handle(ctx: &IntegrationContext, global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<EventEntry> = ctx
        .coordinator()
        .snapshot()
        .iter()
        .map(|p| EventEntry {
            partition_id: p.id.clone(),
            partition: p.name.clone(),
            event_name: p.last_notification.event_name.clone(),
            date_time: p.last_notification.date_time.clone(),
            timestamp: p.last_notification.timestamp(),
        })
        .collect();

    let out = output::render_list(
        global.output,
        &entries,
        |e| EventRow {
            partition: e.partition.clone(),
            event: e.event_name.clone().unwrap_or_else(|| "-".into()),
            when: when(e),
        },
        |e| e.event_name.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
