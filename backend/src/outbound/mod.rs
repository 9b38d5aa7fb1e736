//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories and transactions using Diesel
//! - **search**: Elasticsearch-compatible article index over HTTP
//! - **memory**: in-process adapters with the same semantics, for local wiring
//!   and tests
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod search;
