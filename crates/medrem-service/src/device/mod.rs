//! Device push token registration.

pub mod service;

pub use service::DeviceTokenService;
