//! Data synchronization layer between `vayu-api` and dashboard consumers.
//!
//! This crate owns the polling, state, and normalization logic that keeps a
//! consumer's view of one air-quality device current:
//!
//! - **[`Poller`]**: Fixed-interval re-invocation primitive. Fires
//!   immediately when enabled, then every interval; always runs the most
//!   recently supplied callback; cancels its schedule on drop.
//!
//! - **[`Gateway`]**: Trait seam over the remote API. Implemented for
//!   [`vayu_api::VayuClient`]; resources receive it explicitly as `Arc<G>`.
//!
//! - **Resources** ([`DashboardResource`], [`HistoricalResource`],
//!   [`FanControl`]): Each owns one [`ResourceState`] published through a
//!   `tokio::sync::watch` channel, wires a `Poller` to the gateway, and
//!   discards stale or post-teardown completions via a request sequence.
//!
//! - **[`ResourceStream<T>`]**: Subscription handle vended by a resource.
//!   Exposes `current()` / `latest()` / `changed()` for reactive rendering.
//!
//! - **Domain model** ([`model`]) and display helpers ([`format`]):
//!   [`DeviceId`], normalized [`HistoricalReading`]s, pollutant threshold
//!   tables and risk levels.

pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod model;
pub mod poller;
pub mod resource;
pub mod state;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SyncConfig;
pub use error::CoreError;
pub use gateway::Gateway;
pub use model::{DeviceId, HistoricalReading, HistoricalSeries};
pub use poller::Poller;
pub use resource::{DashboardResource, FanControl, HistoricalResource, PollMode};
pub use state::ResourceState;
pub use stream::ResourceStream;

// Gateway-level types consumers need without a direct `vayu-api` dependency.
pub use vayu_api::models::{
    BlockchainLog, Classification, ControlStatus, DashboardSnapshot, Fault, Prediction,
    SensorReading,
};
pub use vayu_api::{ApiResult, VayuClient};
