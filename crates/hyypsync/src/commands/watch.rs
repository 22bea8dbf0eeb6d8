//! `watch`: keep the integration running and print every published
//! snapshot until interrupted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use hyypsync_api::AlarmApi;
use hyypsync_core::{ConnectionState, CoordinatorConfig, IntegrationContext};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status;

pub async fn handle(
    api: Arc<dyn AlarmApi>,
    mut config: CoordinatorConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        config.refresh_interval = Duration::from_secs(secs);
    }
    if config.refresh_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "watch needs a refresh interval of at least 1 second".into(),
        });
    }

    let ctx = IntegrationContext::setup(api, config).await?;
    let result = watch_loop(&ctx, args.count, global).await;
    ctx.unload().await;
    result
}

async fn watch_loop(
    ctx: &IntegrationContext,
    count: Option<u32>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut snapshots = ctx.coordinator().subscribe();
    let mut state = ctx.coordinator().connection_state();

    let _ = snapshots.latest();
    print_update(ctx, global)?;
    let mut printed: u32 = 1;

    loop {
        if count.is_some_and(|n| printed >= n) {
            return Ok(());
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_none() {
                    return Ok(());
                }
                print_update(ctx, global)?;
                printed += 1;
            }
            res = state.changed() => {
                if res.is_err() {
                    return Ok(());
                }
                let current = *state.borrow_and_update();
                tracing::info!(state = %current, "connection state changed");
                if current == ConnectionState::ReauthRequired {
                    return Err(CliError::AuthFailed {
                        message: "session expired while watching".into(),
                    });
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                return Ok(());
            }
        }
    }
}

fn print_update(ctx: &IntegrationContext, global: &GlobalOpts) -> Result<(), CliError> {
    if global.output == OutputFormat::Table && !global.quiet {
        let at = ctx.coordinator().last_refresh().map_or_else(
            || "-".into(),
            |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
        );
        println!("── {at} ──");
    }
    let out = status::render(ctx, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
