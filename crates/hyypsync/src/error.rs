//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hyypsync_config::ConfigError;
use hyypsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CODE_REQUIRED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the alarm cloud: {reason}")]
    #[diagnostic(
        code(hyypsync::connection_failed),
        help("Check your network connection and retry. Run with -v for details.")
    )]
    ConnectionFailed { reason: String },

    #[error("No alarm backend configured")]
    #[diagnostic(
        code(hyypsync::no_client),
        help(
            "Point the CLI at an account with --fixture <FILE> or HYYP_FIXTURE,\n\
             or set `fixture` in the profile via: hyypsync config init"
        )
    )]
    NoClient,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(hyypsync::auth_failed),
        help(
            "The session token was rejected or has expired.\n\
             Store a fresh one with: hyypsync config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(hyypsync::no_credentials),
        help(
            "Store one with: hyypsync config set-token --profile {profile}\n\
             Or set the HYYP_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(hyypsync::not_found),
        help("Run: hyypsync {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Commands ─────────────────────────────────────────────────────
    #[error("An authorization code is required to {operation}")]
    #[diagnostic(
        code(hyypsync::code_required),
        help("Pass the code with --code, or configure it under [profiles.<name>.codes].")
    )]
    CodeRequired { operation: String },

    #[error("The panel refused to {operation} (status {status})")]
    #[diagnostic(code(hyypsync::rejected), help("Panel response: {detail}"))]
    Rejected {
        operation: String,
        status: String,
        detail: String,
    },

    #[error("Cannot {operation}: {reason}")]
    #[diagnostic(code(hyypsync::unsupported))]
    Unsupported { operation: String, reason: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(hyypsync::api_error))]
    Api { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hyypsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hyypsync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hyypsync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Keyring access failed: {reason}")]
    #[diagnostic(
        code(hyypsync::keyring),
        help("Use token_env or a plaintext token in the profile instead.")
    )]
    Keyring { reason: String },

    #[error(transparent)]
    #[diagnostic(code(hyypsync::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(hyypsync::timeout),
        help("Increase the timeout with --timeout or in the profile.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(hyypsync::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(hyypsync::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(hyypsync::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::Keyring { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::CodeRequired { .. } => exit_code::CODE_REQUIRED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoClient => exit_code::USAGE,
            Self::Unsupported { .. } => exit_code::PERMISSION,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Command { source, .. } | CoreError::NotReady { source } => {
                CliError::from(*source)
            }

            CoreError::Transport { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::MalformedResponse { message } => CliError::Api {
                code: "malformed".into(),
                message,
            },

            CoreError::Api { message, code } => CliError::Api {
                code: code.unwrap_or_else(|| "unknown".into()),
                message,
            },

            CoreError::CommandRejected {
                operation,
                status,
                raw,
            } => CliError::Rejected {
                operation: operation.into(),
                status,
                detail: raw.to_string(),
            },

            CoreError::AuthorizationCodeRequired { operation, .. } => CliError::CodeRequired {
                operation: operation.into(),
            },

            CoreError::Unsupported { operation, reason } => CliError::Unsupported {
                operation: operation.into(),
                reason,
            },

            CoreError::PartitionNotFound { identifier } => CliError::NotFound {
                resource_type: "partition".into(),
                identifier,
                list_command: "status".into(),
            },

            CoreError::ZoneNotFound { partition, zone } => CliError::NotFound {
                resource_type: "zone".into(),
                identifier: zone,
                list_command: format!("zones --partition {partition}"),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Api {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Keyring { reason } => CliError::Keyring { reason },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
