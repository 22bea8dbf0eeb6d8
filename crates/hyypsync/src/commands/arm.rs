//! Arm / disarm handlers.

use hyypsync_core::{Command as CoreCommand, IntegrationContext};

use crate::cli::{ArmArgs, ArmCommand, GlobalOpts, PartitionArgs};
use crate::error::CliError;

use super::util::{self, Outcome};

pub async fn handle_arm(
    ctx: &IntegrationContext,
    args: ArmArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = match args.command {
        ArmCommand::Away(PartitionArgs { partition, code }) => CoreCommand::ArmAway {
            partition_id: partition,
            code: util::secret(code),
        },
        ArmCommand::Stay(PartitionArgs { partition, code }) => CoreCommand::ArmStay {
            partition_id: partition,
            code: util::secret(code),
        },
    };
    run(ctx, cmd, global).await
}

pub async fn handle_disarm(
    ctx: &IntegrationContext,
    args: PartitionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = CoreCommand::Disarm {
        partition_id: args.partition,
        code: util::secret(args.code),
    };
    run(ctx, cmd, global).await
}

async fn run(
    ctx: &IntegrationContext,
    cmd: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let operation = cmd.operation();
    let partition_id = cmd.partition_id().to_owned();
    let result = ctx.commands().execute(cmd).await?;
    let outcome = Outcome::new(ctx, operation, &partition_id, None, result);
    util::print_outcome(&outcome, global)
}
