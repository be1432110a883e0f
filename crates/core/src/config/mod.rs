//! Tracked-app configuration: schema and store

mod schema;
mod store;

pub use schema::{AppConfig, TrackedApp, default_config};
pub use store::{ConfigStore, UpdateSummary};
