//! Medication entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use medrem_core::types::{MedicationId, UserId};

/// A medication a user is taking, with its dosing schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Medication {
    /// Unique medication identifier.
    pub id: MedicationId,
    /// The owning user.
    pub user_id: UserId,
    /// Medication name.
    pub name: String,
    /// Quantity taken per dose.
    pub dosage: i32,
    /// Hours between doses.
    pub time_interval: i32,
    /// First day of the course.
    pub start_date: DateTime<Utc>,
    /// Time of the first dose.
    pub start_time: DateTime<Utc>,
    /// Last day of the course.
    pub stop_date: DateTime<Utc>,
    /// Course length in days.
    pub duration: i32,
    /// Why the medication is taken.
    pub purpose: String,
    /// Icon category shown by clients.
    pub icon: String,
    /// Whether the course has been completed.
    pub is_medication_course_complete: bool,
    /// When the next dose is due. Always computed, never user supplied.
    pub next_dosage_time: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The fields that drive next-dose computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedicationSchedule {
    /// Time of the first dose.
    pub start_time: DateTime<Utc>,
    /// Hours between doses.
    pub time_interval: i32,
}

impl Medication {
    /// The schedule-defining fields of this medication.
    pub fn schedule(&self) -> MedicationSchedule {
        MedicationSchedule {
            start_time: self.start_time,
            time_interval: self.time_interval,
        }
    }

    /// Check whether the next dose falls at or before `now + window`.
    pub fn is_due(&self, now: DateTime<Utc>, window: Duration) -> bool {
        !self.is_medication_course_complete && self.next_dosage_time <= now + window
    }

    /// Check whether the course has run past its stop date.
    pub fn has_course_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.stop_date
    }
}
