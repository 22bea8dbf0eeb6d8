// ── Command mediator ──
//
// Sends arm / disarm / bypass intents to the panel and reconciles the
// outcome with the coordinator: optimistic state for arm and disarm, an
// out-of-band refresh for bypass.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use hyypsync_api::{ArmRequest, BypassFlags, BypassRequest};

use super::{Command, CommandResult, CommandStatus};
use crate::coordinator::{Coordinator, call_remote};
use crate::error::CoreError;
use crate::model::{AlarmState, Partition};

/// Executes commands on behalf of consumers.
///
/// Commands are not serialized against each other; each runs to
/// completion from the caller's point of view.
#[derive(Clone)]
pub struct CommandMediator {
    coordinator: Coordinator,
}

impl CommandMediator {
    pub fn new(coordinator: Coordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    // ── Intents ──────────────────────────────────────────────────

    pub async fn arm_away(
        &self,
        partition_id: &str,
        code: Option<SecretString>,
    ) -> Result<CommandResult, CoreError> {
        self.execute(Command::ArmAway {
            partition_id: partition_id.to_owned(),
            code,
        })
        .await
    }

    pub async fn arm_stay(
        &self,
        partition_id: &str,
        code: Option<SecretString>,
    ) -> Result<CommandResult, CoreError> {
        self.execute(Command::ArmStay {
            partition_id: partition_id.to_owned(),
            code,
        })
        .await
    }

    pub async fn disarm(
        &self,
        partition_id: &str,
        code: Option<SecretString>,
    ) -> Result<CommandResult, CoreError> {
        self.execute(Command::Disarm {
            partition_id: partition_id.to_owned(),
            code,
        })
        .await
    }

    pub async fn bypass_zone(
        &self,
        partition_id: &str,
        zone_id: &str,
        code: Option<SecretString>,
    ) -> Result<CommandResult, CoreError> {
        self.execute(Command::BypassZone {
            partition_id: partition_id.to_owned(),
            zone_id: zone_id.to_owned(),
            code,
        })
        .await
    }

    pub async fn unbypass_zone(
        &self,
        partition_id: &str,
        zone_id: &str,
        code: Option<SecretString>,
    ) -> Result<CommandResult, CoreError> {
        self.execute(Command::RestoreZone {
            partition_id: partition_id.to_owned(),
            zone_id: zone_id.to_owned(),
            code,
        })
        .await
    }

    // ── Execution ────────────────────────────────────────────────

    /// Dispatch a command and reconcile its outcome.
    ///
    /// Returns `Ok` only for `SUCCESS`. A pending bypass is
    /// [`CoreError::AuthorizationCodeRequired`]; every other status is
    /// [`CoreError::CommandRejected`] with the raw response.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let result = self.dispatch(&cmd).await?;
        self.reconcile(&cmd, result).await
    }

    /// Send a command to the panel and classify the response, without
    /// touching any local state.
    ///
    /// Transport and session failures come back wrapped in
    /// [`CoreError::Command`], keeping the original error as the source.
    pub async fn dispatch(&self, cmd: &Command) -> Result<CommandResult, CoreError> {
        let operation = cmd.operation();
        let partition = self.lookup(cmd)?;
        let code = self.resolve_code(cmd);
        let timeout = self.coordinator.config().timeout;
        let api = Arc::clone(self.coordinator.api());

        let response = match cmd {
            Command::ArmAway { .. } | Command::ArmStay { .. } | Command::Disarm { .. } => {
                let request = ArmRequest {
                    partition_id: partition.id.clone(),
                    site_id: partition.site.id.clone(),
                    arm: !matches!(cmd, Command::Disarm { .. }),
                    pin: code,
                    stay_profile_id: self.stay_profile(cmd, &partition)?,
                };
                debug!(partition = %request.partition_id, operation, "sending arm request");
                call_remote(timeout, async move { api.arm_site(request).await }).await
            }
            Command::BypassZone { zone_id, .. } | Command::RestoreZone { zone_id, .. } => {
                let request = BypassRequest {
                    partition_id: partition.id.clone(),
                    zone_id: zone_id.clone(),
                    flags: BypassFlags::for_state(matches!(cmd, Command::BypassZone { .. })),
                    code,
                };
                debug!(
                    partition = %request.partition_id,
                    zone = %request.zone_id,
                    operation,
                    "sending bypass request"
                );
                call_remote(timeout, async move { api.set_zone_bypass(request).await }).await
            }
        }
        .map_err(|e| CoreError::Command {
            operation,
            source: Box::new(e),
        })?;

        Ok(CommandResult::from(response))
    }

    async fn reconcile(
        &self,
        cmd: &Command,
        result: CommandResult,
    ) -> Result<CommandResult, CoreError> {
        let operation = cmd.operation();
        let partition_id = cmd.partition_id();

        if cmd.is_zone_command() {
            return match result.status {
                CommandStatus::Success => {
                    info!(partition = %partition_id, operation, "bypass accepted; refreshing");
                    // The zone flag only changes once the refreshed snapshot
                    // reports it.
                    if let Err(e) = self.coordinator.request_refresh().await {
                        warn!(
                            partition = %partition_id,
                            error = %e,
                            "refresh after bypass failed; zone state will catch up next tick"
                        );
                    }
                    Ok(result)
                }
                CommandStatus::Pending => {
                    info!(partition = %partition_id, operation, "bypass waiting for authorization code");
                    Err(CoreError::AuthorizationCodeRequired {
                        operation,
                        raw: result.raw,
                    })
                }
                CommandStatus::Failure => Err(rejected(operation, partition_id, result)),
            };
        }

        if !result.is_success() {
            return Err(rejected(operation, partition_id, result));
        }

        let state = match cmd {
            Command::ArmAway { .. } => AlarmState::ArmedAway,
            Command::ArmStay { .. } => self.coordinator.config().stay_mode.armed_state(),
            _ => AlarmState::Disarmed,
        };
        info!(partition = %partition_id, operation, %state, "command accepted");
        self.coordinator.set_optimistic(partition_id, state);
        Ok(result)
    }

    // ── Resolution helpers ───────────────────────────────────────

    fn lookup(&self, cmd: &Command) -> Result<Arc<Partition>, CoreError> {
        let partition_id = cmd.partition_id();
        let partition =
            self.coordinator
                .partition(partition_id)
                .ok_or_else(|| CoreError::PartitionNotFound {
                    identifier: partition_id.to_owned(),
                })?;

        if let Some(zone_id) = cmd.zone_id() {
            if partition.zone(zone_id).is_none() {
                return Err(CoreError::ZoneNotFound {
                    partition: partition_id.to_owned(),
                    zone: zone_id.to_owned(),
                });
            }
        }
        Ok(partition)
    }

    /// Explicit code, else the partition's configured code, else none.
    fn resolve_code(&self, cmd: &Command) -> Option<SecretString> {
        cmd.code()
            .or_else(|| self.coordinator.config().code_for(cmd.partition_id()))
            .cloned()
    }

    /// The stay profile for a stay-arm: the designated one, else the first
    /// the partition lists.
    fn stay_profile(
        &self,
        cmd: &Command,
        partition: &Partition,
    ) -> Result<Option<String>, CoreError> {
        if !matches!(cmd, Command::ArmStay { .. }) {
            return Ok(None);
        }
        if let Some(designated) = self.coordinator.config().stay_profile_for(&partition.id) {
            return Ok(Some(designated.to_owned()));
        }
        partition
            .default_stay_profile()
            .map(|profile| Some(profile.id.clone()))
            .ok_or_else(|| CoreError::Unsupported {
                operation: cmd.operation(),
                reason: format!("partition {} has no stay profiles", partition.id),
            })
    }
}

fn rejected(operation: &'static str, partition_id: &str, result: CommandResult) -> CoreError {
    warn!(
        partition = %partition_id,
        operation,
        status = %result.status_text,
        "panel rejected command"
    );
    CoreError::CommandRejected {
        operation,
        status: result.status_text,
        raw: result.raw,
    }
}
