// ── Command types ──
//
// Typed control intents for partitions and zones, and the tagged outcome
// of sending one to the panel.

pub mod mediator;

use secrecy::SecretString;
use serde::Serialize;

use hyypsync_api::ApiResponse;

/// A control intent. `code` overrides any statically configured code.
#[derive(Debug, Clone)]
pub enum Command {
    ArmAway {
        partition_id: String,
        code: Option<SecretString>,
    },
    /// Arm with a stay profile; shown as night or home per the stay mode.
    ArmStay {
        partition_id: String,
        code: Option<SecretString>,
    },
    Disarm {
        partition_id: String,
        code: Option<SecretString>,
    },
    BypassZone {
        partition_id: String,
        zone_id: String,
        code: Option<SecretString>,
    },
    RestoreZone {
        partition_id: String,
        zone_id: String,
        code: Option<SecretString>,
    },
}

impl Command {
    /// Human-readable verb used in error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::ArmAway { .. } => "arm away",
            Self::ArmStay { .. } => "arm stay",
            Self::Disarm { .. } => "disarm",
            Self::BypassZone { .. } => "bypass zone",
            Self::RestoreZone { .. } => "restore zone",
        }
    }

    pub fn partition_id(&self) -> &str {
        match self {
            Self::ArmAway { partition_id, .. }
            | Self::ArmStay { partition_id, .. }
            | Self::Disarm { partition_id, .. }
            | Self::BypassZone { partition_id, .. }
            | Self::RestoreZone { partition_id, .. } => partition_id,
        }
    }

    pub fn zone_id(&self) -> Option<&str> {
        match self {
            Self::BypassZone { zone_id, .. } | Self::RestoreZone { zone_id, .. } => Some(zone_id),
            _ => None,
        }
    }

    pub(crate) fn code(&self) -> Option<&SecretString> {
        match self {
            Self::ArmAway { code, .. }
            | Self::ArmStay { code, .. }
            | Self::Disarm { code, .. }
            | Self::BypassZone { code, .. }
            | Self::RestoreZone { code, .. } => code.as_ref(),
        }
    }

    pub fn is_zone_command(&self) -> bool {
        self.zone_id().is_some()
    }
}

/// Classification of the panel's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommandStatus {
    Success,
    /// Accepted, but waiting for a second authorization code.
    Pending,
    Failure,
}

impl CommandStatus {
    /// `SUCCESS` and `PENDING` are the only statuses with meaning; anything
    /// else, including a missing status, is a failure.
    pub fn classify(status: &str) -> Self {
        match status {
            "SUCCESS" => Self::Success,
            "PENDING" => Self::Pending,
            _ => Self::Failure,
        }
    }
}

/// Outcome of a dispatched command: the classified status plus the raw
/// response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub status: CommandStatus,
    /// Status string exactly as the service sent it.
    pub status_text: String,
    pub raw: serde_json::Value,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

impl From<ApiResponse> for CommandResult {
    fn from(response: ApiResponse) -> Self {
        Self {
            status: CommandStatus::classify(&response.status),
            status_text: response.status,
            raw: response.raw,
        }
    }
}
