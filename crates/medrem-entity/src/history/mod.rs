//! Dose adherence history entities.

pub mod model;
pub mod status;

pub use model::MedicationHistory;
pub use status::MissedStatus;
