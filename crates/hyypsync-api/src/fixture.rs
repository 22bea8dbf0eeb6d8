// Fixture-backed client
//
// Serves a site tree from a JSON document instead of the network. Used by
// the CLI for offline runs and by tests that want realistic payloads.
// Successful commands are applied to the in-memory tree, so a refresh after
// a command observes its effect the way the real service eventually would.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::auth::Credentials;
use crate::client::{AlarmApi, ArmRequest, BypassFlags, BypassRequest};
use crate::error::Error;
use crate::models::{ApiResponse, SiteListing, SiteRecord};

/// On-disk fixture document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDocument {
    /// When set, calls made with any other token fail with
    /// [`Error::SessionExpired`].
    #[serde(default)]
    pub token: Option<String>,
    /// Answer `PENDING` to bypass requests that carry no code.
    #[serde(default)]
    pub bypass_requires_code: bool,
    /// Fixed body returned for arm/disarm calls instead of `SUCCESS`.
    #[serde(default)]
    pub arm_response: Option<serde_json::Value>,
    /// Fixed body returned for bypass calls instead of `SUCCESS`.
    #[serde(default)]
    pub bypass_response: Option<serde_json::Value>,
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
}

/// A call observed by the fixture client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListSites,
    Arm {
        partition_id: String,
        arm: bool,
        stay_profile_id: Option<String>,
        with_pin: bool,
    },
    Bypass {
        partition_id: String,
        zone_id: String,
        flags: BypassFlags,
        with_code: bool,
    },
}

struct FixtureState {
    doc: FixtureDocument,
    calls: Vec<RecordedCall>,
}

/// [`AlarmApi`] implementation backed by a [`FixtureDocument`].
pub struct FixtureClient {
    state: Mutex<FixtureState>,
    presented_token: Option<SecretString>,
    recording: bool,
}

impl FixtureClient {
    pub fn new(doc: FixtureDocument) -> Self {
        Self {
            state: Mutex::new(FixtureState {
                doc,
                calls: Vec::new(),
            }),
            presented_token: None,
            recording: false,
        }
    }

    /// Load a fixture document from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let body = std::fs::read_to_string(path).map_err(|e| Error::Fixture {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let doc: FixtureDocument =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;
        debug!(path = %path.display(), sites = doc.sites.len(), "loaded fixture");
        Ok(Self::new(doc))
    }

    /// Present these credentials on every call.
    pub fn with_credentials(mut self, credentials: &Credentials) -> Self {
        self.presented_token = Some(credentials.token.clone());
        self
    }

    /// Keep a log of every call, readable through [`calls`](Self::calls).
    /// Off by default so a long-running watch does not accumulate one.
    pub fn recording(mut self) -> Self {
        self.recording = true;
        self
    }

    /// Calls made since recording was enabled, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    fn record(&self, state: &mut FixtureState, call: RecordedCall) {
        if self.recording {
            state.calls.push(call);
        }
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_token(&self, doc: &FixtureDocument) -> Result<(), Error> {
        let Some(expected) = doc.token.as_deref() else {
            return Ok(());
        };
        match &self.presented_token {
            Some(token) if token.expose_secret() == expected => Ok(()),
            _ => Err(Error::SessionExpired),
        }
    }
}

#[async_trait]
impl AlarmApi for FixtureClient {
    async fn list_sites(&self) -> Result<SiteListing, Error> {
        let mut state = self.lock();
        self.record(&mut state, RecordedCall::ListSites);
        self.check_token(&state.doc)?;
        Ok(SiteListing {
            sites: state.doc.sites.clone(),
        })
    }

    async fn arm_site(&self, request: ArmRequest) -> Result<ApiResponse, Error> {
        let mut state = self.lock();
        self.record(
            &mut state,
            RecordedCall::Arm {
                partition_id: request.partition_id.clone(),
                arm: request.arm,
                stay_profile_id: request.stay_profile_id.clone(),
                with_pin: request.pin.is_some(),
            },
        );
        self.check_token(&state.doc)?;

        let response = state
            .doc
            .arm_response
            .clone()
            .map_or_else(|| ApiResponse::with_status("SUCCESS"), ApiResponse::from_raw);

        if response.status == "SUCCESS" {
            let stay = request.arm && request.stay_profile_id.is_some();
            for partition in state
                .doc
                .sites
                .iter_mut()
                .filter(|s| s.id == request.site_id)
                .flat_map(|s| s.partitions.iter_mut())
                .filter(|p| p.id == request.partition_id)
            {
                partition.armed = request.arm;
                partition.stay_armed = stay;
                if !request.arm {
                    partition.alarm = false;
                }
            }
        }
        Ok(response)
    }

    async fn set_zone_bypass(&self, request: BypassRequest) -> Result<ApiResponse, Error> {
        let mut state = self.lock();
        self.record(
            &mut state,
            RecordedCall::Bypass {
                partition_id: request.partition_id.clone(),
                zone_id: request.zone_id.clone(),
                flags: request.flags,
                with_code: request.code.is_some(),
            },
        );
        self.check_token(&state.doc)?;

        if state.doc.bypass_requires_code && request.code.is_none() {
            return Ok(ApiResponse::with_status("PENDING"));
        }

        let response = state
            .doc
            .bypass_response
            .clone()
            .map_or_else(|| ApiResponse::with_status("SUCCESS"), ApiResponse::from_raw);

        if response.status == "SUCCESS" {
            for zone in state
                .doc
                .sites
                .iter_mut()
                .flat_map(|s| s.partitions.iter_mut())
                .filter(|p| p.id == request.partition_id)
                .flat_map(|p| p.zones.iter_mut())
                .filter(|z| z.id == request.zone_id)
            {
                zone.bypassed = request.flags.is_bypass();
            }
        }
        Ok(response)
    }
}
