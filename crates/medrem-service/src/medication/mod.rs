//! Medication scheduling service and its request/response types.

pub mod dto;
pub mod service;

pub use dto::{CreateMedicationRequest, MedicationResponse, UpdateMedicationRequest};
pub use service::{MedicationService, ScheduleAdvance};
