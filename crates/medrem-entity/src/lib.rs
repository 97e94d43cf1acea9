//! # medrem-entity
//!
//! Domain entity models for MedRem. Every struct in this crate represents
//! a database table row or a domain value object. Row structs derive
//! `sqlx::FromRow` and carry the owning `user_id`.

pub mod device;
pub mod history;
pub mod medication;
