//! Built-in job implementations.

pub mod reminder;
pub mod retirement;

pub use reminder::DoseReminderJob;
pub use retirement::CourseRetirementJob;
