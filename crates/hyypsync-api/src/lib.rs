// hyypsync-api: remote client capability for the IDS Hyyp alarm cloud

pub mod auth;
pub mod client;
pub mod error;
pub mod fixture;
pub mod models;

pub use auth::{AppPackage, Credentials};
pub use client::{AlarmApi, ArmRequest, BypassFlags, BypassRequest};
pub use error::Error;
pub use fixture::{FixtureClient, FixtureDocument, RecordedCall};
pub use models::{
    ApiResponse, NotificationRecord, PartitionRecord, SiteListing, SiteRecord, StayProfileRecord,
    ZoneRecord,
};
