// Shared test double for the core integration tests.
#![allow(clippy::unwrap_used, dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Semaphore;

use hyypsync_api::{AlarmApi, ApiResponse, ArmRequest, BypassRequest, Error, SiteListing};
use hyypsync_core::{CoordinatorConfig, IntegrationContext};

/// Scripted `AlarmApi`.
///
/// Listing calls pass through a semaphore so a test can hold a fetch in
/// flight. Command responses are popped from queues and default to
/// `SUCCESS`.
pub struct ScriptedApi {
    listing: Mutex<Result<SiteListing, Error>>,
    gate: Semaphore,
    list_calls: AtomicUsize,
    arm_responses: Mutex<VecDeque<Result<ApiResponse, Error>>>,
    bypass_responses: Mutex<VecDeque<Result<ApiResponse, Error>>>,
    arm_requests: Mutex<Vec<ArmRequest>>,
    bypass_requests: Mutex<Vec<BypassRequest>>,
}

impl ScriptedApi {
    pub fn new(listing: SiteListing) -> Arc<Self> {
        Arc::new(Self::build(listing, Semaphore::MAX_PERMITS))
    }

    /// Listing calls block until [`release`](Self::release) hands out
    /// permits.
    pub fn gated(listing: SiteListing) -> Arc<Self> {
        Arc::new(Self::build(listing, 0))
    }

    fn build(listing: SiteListing, permits: usize) -> Self {
        Self {
            listing: Mutex::new(Ok(listing)),
            gate: Semaphore::new(permits),
            list_calls: AtomicUsize::new(0),
            arm_responses: Mutex::new(VecDeque::new()),
            bypass_responses: Mutex::new(VecDeque::new()),
            arm_requests: Mutex::new(Vec::new()),
            bypass_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    pub fn set_listing(&self, listing: SiteListing) {
        *self.listing.lock().unwrap() = Ok(listing);
    }

    pub fn fail_listing(&self, err: Error) {
        *self.listing.lock().unwrap() = Err(err);
    }

    pub fn push_arm_response(&self, response: Result<ApiResponse, Error>) {
        self.arm_responses.lock().unwrap().push_back(response);
    }

    pub fn push_bypass_response(&self, response: Result<ApiResponse, Error>) {
        self.bypass_responses.lock().unwrap().push_back(response);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn arm_requests(&self) -> Vec<ArmRequest> {
        self.arm_requests.lock().unwrap().clone()
    }

    pub fn bypass_requests(&self) -> Vec<BypassRequest> {
        self.bypass_requests.lock().unwrap().clone()
    }

    /// Yield until `n` listing calls have been made.
    pub async fn wait_for_list_calls(&self, n: usize) {
        while self.list_calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl AlarmApi for ScriptedApi {
    async fn list_sites(&self) -> Result<SiteListing, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.acquire().await.unwrap().forget();
        self.listing.lock().unwrap().clone()
    }

    async fn arm_site(&self, request: ArmRequest) -> Result<ApiResponse, Error> {
        self.arm_requests.lock().unwrap().push(request);
        self.arm_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::with_status("SUCCESS")))
    }

    async fn set_zone_bypass(&self, request: BypassRequest) -> Result<ApiResponse, Error> {
        self.bypass_requests.lock().unwrap().push(request);
        self.bypass_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::with_status("SUCCESS")))
    }
}

// ── Listings ────────────────────────────────────────────────────────

/// Flags for the single partition `p1` of site `s1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionFlags {
    pub armed: bool,
    pub stay_armed: bool,
    pub alarm: bool,
    pub zone_bypassed: bool,
}

/// One online site `s1` with partition `p1` ("House"), zones `z1`
/// ("front door") and `z2` ("garage"), and stay profiles `sp1`, `sp2`.
pub fn listing(flags: PartitionFlags) -> SiteListing {
    serde_json::from_value(json!({
        "sites": [{
            "id": "s1",
            "name": "Home",
            "online": true,
            "partitions": [{
                "id": "p1",
                "name": "House",
                "armed": flags.armed,
                "stayArmed": flags.stay_armed,
                "alarm": flags.alarm,
                "lastNotification": {
                    "dateTime": "2024-05-01 21:14:03",
                    "eventName": "Disarmed by user"
                },
                "zones": [
                    { "id": "z1", "name": "front door", "bypassed": flags.zone_bypassed },
                    { "id": "z2", "name": "garage", "bypassed": false }
                ],
                "stayProfiles": [
                    { "id": "sp1", "name": "Night" },
                    { "id": "sp2", "name": "Perimeter" }
                ]
            }]
        }]
    }))
    .unwrap()
}

pub fn disarmed() -> SiteListing {
    listing(PartitionFlags::default())
}

/// Config with the periodic task disabled.
pub fn manual_config() -> CoordinatorConfig {
    CoordinatorConfig {
        refresh_interval: Duration::ZERO,
        ..CoordinatorConfig::default()
    }
}

pub async fn context(api: &Arc<ScriptedApi>, config: CoordinatorConfig) -> IntegrationContext {
    IntegrationContext::setup(api.clone(), config).await.unwrap()
}
