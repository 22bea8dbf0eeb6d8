// ── Site domain type ──

use serde::{Deserialize, Serialize};

/// A security site: one physical installation reporting to the cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    /// Human-friendly display name.
    pub name: String,
    /// Whether the panel is currently connected to the cloud.
    pub online: bool,
}
