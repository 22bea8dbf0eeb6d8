// ── Runtime coordinator configuration ──
//
// Describes *how* the coordinator polls and how commands resolve codes and
// stay profiles. Never touches disk: the CLI builds a `CoordinatorConfig`
// from its profile and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;

use crate::model::StayMode;

/// Default period between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(25);

/// Default bound on a single remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How often to refresh in the background. Zero disables the task.
    pub refresh_interval: Duration,
    /// Bound on each remote call; exceeding it is a transport failure.
    pub timeout: Duration,
    /// Whether stay-arming is presented as night or home.
    pub stay_mode: StayMode,
    /// Statically configured codes, keyed by partition id.
    pub partition_codes: HashMap<String, SecretString>,
    /// Designated stay profile per partition id. Partitions without an
    /// entry stay-arm with their first listed profile.
    pub stay_profiles: HashMap<String, String>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            stay_mode: StayMode::default(),
            partition_codes: HashMap::new(),
            stay_profiles: HashMap::new(),
        }
    }
}

impl CoordinatorConfig {
    /// The configured code for a partition, if any.
    pub fn code_for(&self, partition_id: &str) -> Option<&SecretString> {
        self.partition_codes.get(partition_id)
    }

    /// The designated stay profile for a partition, if any.
    pub fn stay_profile_for(&self, partition_id: &str) -> Option<&str> {
        self.stay_profiles.get(partition_id).map(String::as_str)
    }
}
