//! Zone bypass handler.
//!
//! Some panels accept a bypass but answer `PENDING` until a second
//! authorization code is supplied. Interactively the code is prompted for
//! and the request resent once; otherwise the command fails with the
//! code-required exit status.

use secrecy::SecretString;

use hyypsync_core::{Command as CoreCommand, CommandResult, CoreError, IntegrationContext};

use crate::cli::{BypassArgs, BypassCommand, GlobalOpts, ZoneArgs};
use crate::error::CliError;

use super::util::{self, Outcome};

fn command(bypass: bool, args: &ZoneArgs, code: Option<SecretString>) -> CoreCommand {
    let partition_id = args.partition.clone();
    let zone_id = args.zone.clone();
    if bypass {
        CoreCommand::BypassZone {
            partition_id,
            zone_id,
            code,
        }
    } else {
        CoreCommand::RestoreZone {
            partition_id,
            zone_id,
            code,
        }
    }
}

async fn send(
    ctx: &IntegrationContext,
    bypass: bool,
    args: &ZoneArgs,
    code: Option<SecretString>,
) -> Result<CommandResult, CoreError> {
    ctx.commands().execute(command(bypass, args, code)).await
}

pub async fn handle(
    ctx: &IntegrationContext,
    args: BypassArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (bypass, zone) = match args.command {
        BypassCommand::On(zone) => (true, zone),
        BypassCommand::Off(zone) => (false, zone),
    };
    let operation = command(bypass, &zone, None).operation();

    let result = match send(ctx, bypass, &zone, util::secret(zone.code.clone())).await {
        Err(err) if err.is_code_required() && zone.code.is_none() && util::can_prompt(global) => {
            tracing::info!(zone = %zone.zone, "panel asked for an authorization code");
            let code = util::prompt_code()?;
            send(ctx, bypass, &zone, Some(code)).await?
        }
        other => other?,
    };

    let outcome = Outcome::new(ctx, operation, &zone.partition, Some(&zone.zone), result);
    util::print_outcome(&outcome, global)
}
