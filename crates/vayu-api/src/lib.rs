// vayu-api: Async Rust client for the Vayu air-quality REST API
//
// Every public operation on `VayuClient` resolves into an `ApiResult`
// envelope; transport details never leak past this crate's boundary.

pub mod client;
pub mod envelope;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod transport;

mod control;
mod dashboard;
mod sensor;

pub use client::VayuClient;
pub use dashboard::{DEFAULT_ANALYTICS_HOURS, DEFAULT_LOG_LIMIT};
pub use sensor::DEFAULT_HISTORY_LIMIT;
pub use envelope::ApiResult;
pub use error::Error;
pub use transport::TransportConfig;
