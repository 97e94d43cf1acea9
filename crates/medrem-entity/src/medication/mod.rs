//! Medication domain entities.

pub mod model;

pub use model::{Medication, MedicationSchedule};
