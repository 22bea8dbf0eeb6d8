//! Command dispatch: bridges CLI args -> integration context -> output.

pub mod arm;
pub mod bypass;
pub mod config_cmd;
pub mod entities;
pub mod events;
pub mod status;
pub mod util;
pub mod watch;
pub mod zones;

use hyypsync_core::IntegrationContext;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
///
/// `watch` keeps the integration running; everything else sets it up
/// without background refresh and unloads it when the handler returns.
pub async fn dispatch(
    cmd: Command,
    resolved: Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let Resolved { api, config } = resolved;

    if let Command::Watch(args) = cmd {
        return watch::handle(api, config, args, global).await;
    }

    IntegrationContext::oneshot(api, config, |ctx| async move {
        match cmd {
            Command::Status => status::handle(&ctx, global),
            Command::Zones(args) => zones::handle(&ctx, &args, global),
            Command::Events => events::handle(&ctx, global),
            Command::Entities => entities::handle(&ctx, global),
            Command::Arm(args) => arm::handle_arm(&ctx, args, global).await,
            Command::Disarm(args) => arm::handle_disarm(&ctx, args, global).await,
            Command::Bypass(args) => bypass::handle(&ctx, args, global).await,
            // Handled before the integration is set up
            Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
                unreachable!("handled before dispatch")
            }
        }
    })
    .await
}
