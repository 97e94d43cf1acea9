//! Background work for MedRem.
//!
//! This crate provides:
//! - An hourly runner aligned to the top of the hour that drives the dose reminder sweep
//! - A cron scheduler for maintenance jobs such as course retirement
//! - The [`PeriodicJob`] trait both of them execute

pub mod executor;
pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, PeriodicJob};
pub use jobs::{CourseRetirementJob, DoseReminderJob};
pub use runner::HourlyRunner;
pub use scheduler::CronScheduler;
