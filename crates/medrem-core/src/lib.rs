//! # medrem-core
//!
//! Core crate for MedRem. Contains the unified error system, configuration
//! schemas, typed identifiers, and the capability traits (clock, push
//! delivery) that the scheduling core consumes.
//!
//! This crate has **no** internal dependencies on other MedRem crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
