use thiserror::Error;

/// Top-level error type for the `hyypsync-api` crate.
///
/// Covers every failure mode of the remote alarm service:
/// authentication, transport, API-level errors, and malformed responses.
/// `hyypsync-core` maps these into domain errors.
///
/// Payloads are plain strings so the error is `Clone`, which lets a single
/// refresh failure be handed to every caller waiting on that refresh.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected or account locked.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session token has expired or was revoked.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, TLS failure, etc.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// The service answered with an error envelope.
    #[error("Hyyp API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Fixture backend ─────────────────────────────────────────────
    /// A fixture file could not be loaded.
    #[error("Fixture {path} unusable: {reason}")]
    Fixture { path: String, reason: String },
}

impl Error {
    /// Returns `true` if this error indicates the session is no longer
    /// valid and re-authentication is required.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next refresh tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization {
            message: err.to_string(),
            body: String::new(),
        }
    }
}
