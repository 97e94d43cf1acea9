//! Registered push devices.

pub mod model;

pub use model::DeviceToken;
