// ── Domain model ──

pub mod alarm_state;
pub mod partition;
pub mod site;
pub mod snapshot;

pub use alarm_state::{AlarmFlags, AlarmState, StayMode, derive_state};
pub use partition::{LastNotification, Partition, StayProfile, Zone};
pub use site::Site;
pub use snapshot::Snapshot;
