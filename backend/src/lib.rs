//! Author and article storage with a relational source of truth mirrored
//! into a search index.
//!
//! - [`domain`]: entities, the consistency-preserving services and the ports
//!   they depend on
//! - [`outbound`]: PostgreSQL, Elasticsearch and in-memory adapters
//! - [`wiring`]: builds the services once over a chosen set of adapters

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
pub mod wiring;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{SettingsError, StoreSettings};
pub use wiring::{ContentServices, InMemoryContentServices, PostgresContentServices, WiringError};
