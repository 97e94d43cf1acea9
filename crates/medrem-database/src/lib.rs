//! # medrem-database
//!
//! The record store for MedRem: the store traits consumed by the service
//! layer, their PostgreSQL implementations, and in-memory implementations
//! used by tests and local tooling.
//!
//! Every store method that touches a single user's data takes that user's
//! id and includes it in the lookup, so a record owned by another user is
//! indistinguishable from a missing one.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{DeviceTokenStore, MedicationHistoryStore, MedicationStore};
