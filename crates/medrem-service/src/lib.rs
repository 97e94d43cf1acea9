//! # medrem-service
//!
//! Business logic for MedRem: the schedule calculator, the medication
//! scheduling service, the dose history tracker, and device token
//! registration.
//!
//! Services follow constructor injection. Stores and the clock are passed
//! in as `Arc<dyn ...>` so the same services run against PostgreSQL in
//! production and against in-memory stores in tests.

pub mod context;
pub mod device;
pub mod display;
mod error;
pub mod history;
pub mod medication;
pub mod schedule;

pub use context::RequestContext;
pub use device::DeviceTokenService;
pub use history::MedicationHistoryService;
pub use medication::MedicationService;
pub use schedule::compute_next_dose;
