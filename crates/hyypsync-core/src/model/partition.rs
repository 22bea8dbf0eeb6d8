// ── Partition domain types ──

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::alarm_state::{AlarmFlags, AlarmState, StayMode, derive_state};
use super::site::Site;

/// A zone (sensor loop) within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    /// Excluded from arming.
    pub bypassed: bool,
}

/// A stay profile: a predefined subset of zones armed while occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayProfile {
    pub id: String,
    pub name: String,
}

/// The last event the panel reported for a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastNotification {
    /// Timestamp exactly as the service sent it.
    pub date_time: Option<String>,
    pub event_name: Option<String>,
}

impl LastNotification {
    /// Parse `date_time` as RFC 3339, or as a naive `YYYY-MM-DD HH:MM:SS`
    /// timestamp taken to be UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_time.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// An alarm partition as of one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub id: String,
    pub name: String,
    /// The site this partition belongs to.
    pub site: Site,
    pub armed: bool,
    pub stay_armed: bool,
    /// True while the alarm is sounding.
    pub alarm: bool,
    pub last_notification: LastNotification,
    /// Zones keyed by id, in the order the service lists them.
    pub zones: IndexMap<String, Zone>,
    /// Stay profiles keyed by id, in the order the service lists them.
    pub stay_profiles: IndexMap<String, StayProfile>,
}

impl Partition {
    pub fn flags(&self) -> AlarmFlags {
        AlarmFlags {
            alarm: self.alarm,
            armed: self.armed,
            stay_armed: self.stay_armed,
        }
    }

    /// Derived alarm state; recomputed on every call.
    pub fn alarm_state(&self, stay_mode: StayMode) -> AlarmState {
        derive_state(self.flags(), stay_mode)
    }

    /// A partition is available while its site is online.
    pub fn is_available(&self) -> bool {
        self.site.online
    }

    /// The stay profile used for stay-arming when none is designated:
    /// the first one the service lists.
    pub fn default_stay_profile(&self) -> Option<&StayProfile> {
        self.stay_profiles.values().next()
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.get(zone_id)
    }
}
