// ── Core error types ──
//
// Domain errors from hyypsync-core. Consumers never see the remote
// client's error type directly; the `From<hyypsync_api::Error>` impl
// translates it into the variants below.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so one refresh failure can be handed to every caller that was
/// waiting on that refresh.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Remote failures ──────────────────────────────────────────────
    #[error("Cannot reach the alarm cloud: {reason}")]
    Transport { reason: String },

    #[error("Alarm cloud request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Malformed response from the alarm cloud: {message}")]
    MalformedResponse { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// The service's error code, when it sent one.
        code: Option<String>,
    },

    // ── Command outcomes ─────────────────────────────────────────────
    #[error("Cannot {operation}: panel answered {status}: {raw}")]
    CommandRejected {
        operation: &'static str,
        status: String,
        /// Full response body, e.g. listing violated zones.
        raw: serde_json::Value,
    },

    #[error("Authorization code required to {operation}")]
    AuthorizationCodeRequired {
        operation: &'static str,
        raw: serde_json::Value,
    },

    #[error("Cannot {operation}")]
    Command {
        operation: &'static str,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Cannot {operation}: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: String,
    },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Alarm coordinator not ready")]
    NotReady {
        #[source]
        source: Box<CoreError>,
    },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Partition not found: {identifier}")]
    PartitionNotFound { identifier: String },

    #[error("Zone {zone} not found in partition {partition}")]
    ZoneNotFound { partition: String, zone: String },

    // ── Configuration / internal ─────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The innermost error, looking through command and startup wrappers.
    pub fn root_cause(&self) -> &CoreError {
        match self {
            Self::Command { source, .. } | Self::NotReady { source } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the session is invalid and the host must re-authenticate
    /// instead of retrying.
    pub fn requires_reauth(&self) -> bool {
        matches!(self.root_cause(), Self::AuthenticationFailed { .. })
    }

    /// Whether the failure is a network or deadline problem that the next
    /// refresh tick may resolve.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Transport { .. } | Self::Timeout { .. }
        )
    }

    /// Whether a bypass is waiting for a second authorization code.
    pub fn is_code_required(&self) -> bool {
        matches!(self, Self::AuthorizationCodeRequired { .. })
    }

    /// The raw response attached to a command outcome, if any.
    pub fn raw_response(&self) -> Option<&serde_json::Value> {
        match self {
            Self::CommandRejected { raw, .. } | Self::AuthorizationCodeRequired { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }
}

// ── Conversion from remote client errors ─────────────────────────────

impl From<hyypsync_api::Error> for CoreError {
    fn from(err: hyypsync_api::Error) -> Self {
        match err {
            hyypsync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            hyypsync_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            hyypsync_api::Error::Transport(reason) => CoreError::Transport { reason },
            hyypsync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            hyypsync_api::Error::Api { message, code } => CoreError::Api { message, code },
            hyypsync_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            hyypsync_api::Error::Fixture { path, reason } => CoreError::Config {
                message: format!("fixture {path}: {reason}"),
            },
        }
    }
}
