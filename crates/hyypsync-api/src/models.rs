// Wire records for the alarm cloud
//
// The site listing is a tree: sites own partitions, partitions own zones
// and stay profiles. Identifiers arrive as either JSON strings or numbers
// depending on the endpoint, so they are normalized to strings on the way
// in. Fields use `#[serde(default)]` liberally because the service omits
// empty collections and flags that are false.

use serde::{Deserialize, Deserializer, Serialize};

// ── Site listing ─────────────────────────────────────────────────────

/// Full response of the site listing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteListing {
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
}

/// One security site (a physical installation with a panel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Whether the panel is currently connected to the cloud.
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub partitions: Vec<PartitionRecord>,
}

/// An alarm partition (area) of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub armed: bool,
    #[serde(default)]
    pub stay_armed: bool,
    /// True while the alarm is sounding.
    #[serde(default)]
    pub alarm: bool,
    #[serde(default)]
    pub last_notification: Option<NotificationRecord>,
    #[serde(default)]
    pub zones: Vec<ZoneRecord>,
    /// Stay profiles in the order the service lists them.
    #[serde(default)]
    pub stay_profiles: Vec<StayProfileRecord>,
}

/// The most recent event the panel reported for a partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bypassed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayProfileRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

// ── Command responses ────────────────────────────────────────────────

/// Response to an arm or bypass call.
///
/// `status` is the service's verdict (`"SUCCESS"`, `"PENDING"`, or some
/// failure tag); `raw` keeps the whole body for diagnostics, e.g. the list
/// of violated zones when arming is refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub raw: serde_json::Value,
}

impl ApiResponse {
    /// Wrap a raw response body, pulling out its `status` field.
    ///
    /// A body without a string `status` is kept with an empty status so
    /// that callers classify it as a failure rather than losing the body.
    pub fn from_raw(raw: serde_json::Value) -> Self {
        let status = raw
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Self { status, raw }
    }

    /// Convenience constructor for a bare `{"status": ...}` body.
    pub fn with_status(status: &str) -> Self {
        Self::from_raw(serde_json::json!({ "status": status }))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}
