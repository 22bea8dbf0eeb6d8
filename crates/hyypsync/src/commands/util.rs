//! Shared helpers for command handlers.

use std::io::IsTerminal;

use secrecy::SecretString;
use serde::Serialize;

use hyypsync_core::{CommandResult, CommandStatus, IntegrationContext};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Whether an authorization code may be asked for interactively.
pub fn can_prompt(global: &GlobalOpts) -> bool {
    !global.yes && std::io::stdin().is_terminal()
}

/// Read an authorization code from the terminal without echo.
pub fn prompt_code() -> Result<SecretString, CliError> {
    let code = rpassword::prompt_password("Authorization code: ").map_err(prompt_err)?;
    if code.is_empty() {
        return Err(CliError::Validation {
            field: "code".into(),
            reason: "authorization code cannot be empty".into(),
        });
    }
    Ok(SecretString::from(code))
}

/// Wrap a `--code` flag value.
pub fn secret(code: Option<String>) -> Option<SecretString> {
    code.map(SecretString::from)
}

// ── Command outcome ─────────────────────────────────────────────────

/// What a control command did, as rendered to the user.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub operation: &'static str,
    pub partition_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub status: CommandStatus,
    /// Alarm state shown for the partition after the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub response: serde_json::Value,
}

impl Outcome {
    pub fn new(
        ctx: &IntegrationContext,
        operation: &'static str,
        partition_id: &str,
        zone_id: Option<&str>,
        result: CommandResult,
    ) -> Self {
        Self {
            operation,
            partition_id: partition_id.to_owned(),
            zone_id: zone_id.map(str::to_owned),
            status: result.status,
            state: ctx
                .coordinator()
                .alarm_state(partition_id)
                .map(|s| s.to_string()),
            response: result.raw,
        }
    }
}

fn detail(outcome: &Outcome) -> String {
    let target = match outcome.zone_id {
        Some(ref zone) => format!("zone {zone} of partition {}", outcome.partition_id),
        None => format!("partition {}", outcome.partition_id),
    };
    match outcome.state {
        Some(ref state) if outcome.zone_id.is_none() => {
            format!("✓ {}: {target} is now {state}", outcome.operation)
        }
        _ => format!("✓ {}: {target}", outcome.operation),
    }
}

/// Render and print a command outcome in the selected format.
pub fn print_outcome(outcome: &Outcome, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.output, outcome, detail, |o| o.status.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
