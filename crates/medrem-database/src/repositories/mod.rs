//! PostgreSQL implementations of the record store traits.

pub mod device_token;
pub mod history;
pub mod medication;

pub use device_token::DeviceTokenRepository;
pub use history::MedicationHistoryRepository;
pub use medication::MedicationRepository;
