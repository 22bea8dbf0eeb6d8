//! CLI configuration: thin layer over `hyypsync_config`.
//!
//! Resolves the active profile, applies `GlobalOpts` overrides
//! (--fixture, --token, --timeout) and builds the alarm client plus the
//! coordinator configuration the integration runs with.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use hyypsync_api::{AlarmApi, Credentials, FixtureClient};
use hyypsync_config::{Config, ConfigError, Profile};
use hyypsync_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use hyypsync_config::{config_path, load_config, save_config};

/// Everything needed to set up the integration.
pub struct Resolved {
    pub api: Arc<dyn AlarmApi>,
    pub config: CoordinatorConfig,
}

/// Pick the active profile.
///
/// A profile named with `--profile` must exist. Otherwise a missing
/// default profile falls back to an empty one so flag-only runs work.
pub fn active_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = cfg.active_profile_name(global.profile.as_deref());
    match cfg.profile(&name) {
        Ok(profile) => Ok((name, profile.clone())),
        Err(err) if global.profile.is_some() => Err(err.into()),
        Err(_) => Ok((name, Profile::default())),
    }
}

/// Build the client and coordinator configuration from the config file,
/// the active profile and command-line overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let (name, profile) = active_profile(global, &cfg)?;

    let mut config = hyypsync_config::profile_to_coordinator_config(&profile, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.timeout = Duration::from_secs(secs);
    }

    let fixture = fixture_path(global, &profile)?;
    let mut client = FixtureClient::from_path(&fixture).map_err(|e| CliError::Validation {
        field: "fixture".into(),
        reason: e.to_string(),
    })?;

    if let Some(credentials) = credentials(global, &profile, &name)? {
        client = client.with_credentials(&credentials);
    }

    tracing::debug!(profile = %name, fixture = %fixture.display(), "resolved backend");
    Ok(Resolved {
        api: Arc::new(client),
        config,
    })
}

fn fixture_path(global: &GlobalOpts, profile: &Profile) -> Result<PathBuf, CliError> {
    global
        .fixture
        .clone()
        .or_else(|| profile.fixture.clone())
        .ok_or(CliError::NoClient)
}

/// `--token` wins; otherwise the profile's token sources. A profile
/// without any token runs unauthenticated.
fn credentials(
    global: &GlobalOpts,
    profile: &Profile,
    name: &str,
) -> Result<Option<Credentials>, CliError> {
    if let Some(ref token) = global.token {
        return Ok(Some(Credentials::new(
            SecretString::from(token.clone()),
            profile.package,
        )));
    }
    match hyypsync_config::resolve_credentials(profile, name) {
        Ok(credentials) => Ok(Some(credentials)),
        Err(ConfigError::NoCredentials { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
