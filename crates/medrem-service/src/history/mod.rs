//! Dose history tracker and its response type.

pub mod dto;
pub mod service;

pub use dto::MedicationHistoryResponse;
pub use service::MedicationHistoryService;
