//! Core type definitions used across the MedRem workspace.

pub mod id;

pub use id::*;
