// ── Snapshot ──
//
// The whole partition tree as of one successful refresh. Published as an
// `Arc<Snapshot>` and never mutated afterwards; the next refresh replaces it
// wholesale.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use super::partition::{Partition, Zone};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Partitions keyed by id, in listing order.
    pub partitions: IndexMap<String, Arc<Partition>>,
    /// When the fetch that produced this snapshot started.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The placeholder published before the first refresh completes.
    pub fn empty() -> Self {
        Self {
            partitions: IndexMap::new(),
            fetched_at: None,
        }
    }

    pub fn partition(&self, partition_id: &str) -> Option<&Arc<Partition>> {
        self.partitions.get(partition_id)
    }

    pub fn zone(&self, partition_id: &str, zone_id: &str) -> Option<&Zone> {
        self.partition(partition_id)?.zone(zone_id)
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Partition>> {
        self.partitions.values()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
