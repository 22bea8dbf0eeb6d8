// Remote client capability
//
// The alarm cloud is consumed through the `AlarmApi` trait. The core never
// sees HTTP: anything that can list sites, arm a partition and change a
// zone's bypass flags can back a coordinator.

use async_trait::async_trait;
use bitflags::bitflags;
use secrecy::SecretString;

use crate::error::Error;
use crate::models::{ApiResponse, SiteListing};

bitflags! {
    /// Bypass flags sent with a zone bypass request.
    ///
    /// An empty set restores the zone into the armed set; `BYPASS`
    /// excludes it from arming.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BypassFlags: u32 {
        const BYPASS = 1;
    }
}

impl BypassFlags {
    /// Flags for the requested bypass state.
    pub fn for_state(bypassed: bool) -> Self {
        if bypassed { Self::BYPASS } else { Self::empty() }
    }

    /// Whether these flags request the zone to be bypassed.
    pub fn is_bypass(self) -> bool {
        self.contains(Self::BYPASS)
    }
}

/// Arm or disarm one partition.
#[derive(Debug, Clone)]
pub struct ArmRequest {
    pub partition_id: String,
    pub site_id: String,
    /// `true` arms, `false` disarms.
    pub arm: bool,
    pub pin: Option<SecretString>,
    /// Stay profile to arm with; `None` arms away.
    pub stay_profile_id: Option<String>,
}

/// Change the bypass state of one zone.
#[derive(Debug, Clone)]
pub struct BypassRequest {
    pub partition_id: String,
    pub zone_id: String,
    pub flags: BypassFlags,
    /// Second authorization code, when the panel demands one.
    pub code: Option<SecretString>,
}

/// Operations the alarm cloud offers.
///
/// Implementations must be cheap to share (`Arc<dyn AlarmApi>`) and safe to
/// call concurrently: the coordinator refreshes from a background task while
/// commands run on caller tasks.
#[async_trait]
pub trait AlarmApi: Send + Sync {
    /// Fetch the full site / partition / zone tree.
    async fn list_sites(&self) -> Result<SiteListing, Error>;

    /// Arm, stay-arm, or disarm a partition.
    async fn arm_site(&self, request: ArmRequest) -> Result<ApiResponse, Error>;

    /// Bypass or restore a zone.
    async fn set_zone_bypass(&self, request: BypassRequest) -> Result<ApiResponse, Error>;
}
