// ── Alarm state machine ──
//
// Pure derivation from a partition's remote flags to a discrete state.
// Nothing here is cached: callers derive on every read.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Discrete alarm state shown for a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmState {
    Disarmed,
    ArmedAway,
    ArmedNight,
    ArmedHome,
    Triggered,
}

impl AlarmState {
    pub fn is_armed(self) -> bool {
        matches!(self, Self::ArmedAway | Self::ArmedNight | Self::ArmedHome)
    }
}

/// Which stay-arm state a deployment exposes.
///
/// The panel has a single "stay" concept; installations present it either
/// as night mode or as home mode, never both.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StayMode {
    #[default]
    Night,
    Home,
}

impl StayMode {
    /// The alarm state a stay-armed partition is shown in.
    pub fn armed_state(self) -> AlarmState {
        match self {
            Self::Night => AlarmState::ArmedNight,
            Self::Home => AlarmState::ArmedHome,
        }
    }
}

/// The three remote flags the state is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlarmFlags {
    pub alarm: bool,
    pub armed: bool,
    pub stay_armed: bool,
}

/// Derive the alarm state from remote flags.
///
/// Precedence: a sounding alarm wins over everything, then away, disarmed,
/// and stay. `stay_armed` without `armed` is not something the service
/// reports; it is treated as disarmed because the stay flag only has a
/// meaning while the partition is armed.
pub fn derive_state(flags: AlarmFlags, stay_mode: StayMode) -> AlarmState {
    if flags.alarm {
        return AlarmState::Triggered;
    }
    match (flags.armed, flags.stay_armed) {
        (true, false) => AlarmState::ArmedAway,
        (true, true) => stay_mode.armed_state(),
        (false, _) => AlarmState::Disarmed,
    }
}
