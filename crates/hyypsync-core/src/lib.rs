//! State synchronization and command execution for IDS Hyyp alarm panels.
//!
//! This crate sits between the remote client capability in `hyypsync-api`
//! and consumers such as the `hyypsync` CLI:
//!
//! - **[`Coordinator`]**: Pulls the full site / partition / zone tree on a
//!   fixed interval and publishes it as an immutable [`Snapshot`] through a
//!   `watch` channel. Fetches are serialized: [`refresh()`](Coordinator::refresh)
//!   attaches to a fetch already in flight, while
//!   [`request_refresh()`](Coordinator::request_refresh) waits for the next
//!   one, so a burst of requests costs a single extra fetch.
//!
//! - **Alarm state machine** ([`derive_state`]): Pure mapping from a
//!   partition's `alarm` / `armed` / `stay_armed` flags to an [`AlarmState`].
//!
//! - **[`CommandMediator`]**: Arm, disarm and bypass intents. Successful
//!   arm/disarm commands record an optimistic state until the next fetch;
//!   successful bypasses trigger a refresh; a pending bypass surfaces as
//!   [`CoreError::AuthorizationCodeRequired`].
//!
//! - **[`IntegrationContext`]**: One running account: coordinator,
//!   mediator and the entity catalogue ([`AlarmPanel`], [`ZoneSwitch`],
//!   [`LastEventSensor`]).

pub mod command;
pub mod config;
pub mod context;
mod convert;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;
mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::mediator::CommandMediator;
pub use command::{Command, CommandResult, CommandStatus};
pub use config::{CoordinatorConfig, DEFAULT_REFRESH_INTERVAL, DEFAULT_TIMEOUT};
pub use context::{EntityKind, EntitySummary, IntegrationContext};
pub use coordinator::{ConnectionState, Coordinator};
pub use entity::{AlarmPanel, DeviceInfo, LastEventSensor, PartitionView, SensorKind, ZoneSwitch};
pub use error::CoreError;
pub use stream::SnapshotStream;

pub use model::{
    AlarmFlags, AlarmState, LastNotification, Partition, Site, Snapshot, StayMode, StayProfile,
    Zone, derive_state,
};
