// ── API-to-domain type conversions ──
//
// Bridges raw `hyypsync_api` records into the canonical snapshot model.
// The listing is a site → partition tree; the snapshot flattens it into a
// partition-keyed map where every partition carries its site.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::debug;

use hyypsync_api::{
    NotificationRecord, PartitionRecord, SiteListing, SiteRecord, StayProfileRecord, ZoneRecord,
};

use crate::error::CoreError;
use crate::model::{LastNotification, Partition, Site, Snapshot, StayProfile, Zone};

impl From<ZoneRecord> for Zone {
    fn from(z: ZoneRecord) -> Self {
        Self {
            id: z.id,
            name: z.name,
            bypassed: z.bypassed,
        }
    }
}

impl From<StayProfileRecord> for StayProfile {
    fn from(p: StayProfileRecord) -> Self {
        Self {
            id: p.id,
            name: p.name,
        }
    }
}

impl From<NotificationRecord> for LastNotification {
    fn from(n: NotificationRecord) -> Self {
        Self {
            date_time: n.date_time,
            event_name: n.event_name,
        }
    }
}

impl From<&SiteRecord> for Site {
    fn from(s: &SiteRecord) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            online: s.online,
        }
    }
}

fn partition_from_record(p: PartitionRecord, site: Site) -> Partition {
    Partition {
        id: p.id,
        name: p.name,
        site,
        armed: p.armed,
        stay_armed: p.stay_armed,
        alarm: p.alarm,
        last_notification: p.last_notification.map(Into::into).unwrap_or_default(),
        zones: p
            .zones
            .into_iter()
            .map(|z| (z.id.clone(), Zone::from(z)))
            .collect(),
        stay_profiles: p
            .stay_profiles
            .into_iter()
            .map(|sp| (sp.id.clone(), StayProfile::from(sp)))
            .collect(),
    }
}

/// Build a snapshot from a full site listing.
///
/// Partition ids are the snapshot keys, so a listing that repeats one is
/// rejected as malformed rather than silently dropping a partition.
pub(crate) fn snapshot_from_listing(
    listing: SiteListing,
    fetched_at: DateTime<Utc>,
) -> Result<Snapshot, CoreError> {
    let mut partitions: IndexMap<String, Arc<Partition>> = IndexMap::new();

    for mut site_record in listing.sites {
        let records = std::mem::take(&mut site_record.partitions);
        let site = Site::from(&site_record);
        for record in records {
            let partition = partition_from_record(record, site.clone());
            if partitions.contains_key(&partition.id) {
                return Err(CoreError::MalformedResponse {
                    message: format!("partition {} listed more than once", partition.id),
                });
            }
            partitions.insert(partition.id.clone(), Arc::new(partition));
        }
    }

    debug!(partitions = partitions.len(), "built snapshot from site listing");
    Ok(Snapshot {
        partitions,
        fetched_at: Some(fetched_at),
    })
}
