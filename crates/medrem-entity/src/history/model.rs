//! Medication history entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use medrem_core::types::{MedicationHistoryId, MedicationId, UserId};

use super::status::MissedStatus;
use crate::medication::Medication;

/// One scheduled dose occurrence and whether it was taken.
///
/// `was_medication_missed` is `Taken` exactly when
/// `has_medication_been_taken` is true, `Missed` when the user explicitly
/// said no, and `Pending` until the user acts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MedicationHistory {
    /// Unique history identifier.
    pub id: MedicationHistoryId,
    /// The medication this dose belongs to.
    pub medication_id: MedicationId,
    /// The owning user.
    pub user_id: UserId,
    /// Medication name at the time the dose was scheduled.
    pub medication_name: String,
    /// Scheduled dosage amount.
    pub dosage: i32,
    /// Scheduled dose time.
    pub dosage_time: DateTime<Utc>,
    /// Whether the user confirmed taking the dose.
    pub has_medication_been_taken: bool,
    /// Derived missed state.
    pub was_medication_missed: MissedStatus,
    /// When the occurrence was recorded.
    pub created_at: DateTime<Utc>,
    /// When the occurrence was last resolved.
    pub updated_at: DateTime<Utc>,
}

impl MedicationHistory {
    /// Record an unresolved dose occurrence of `medication` at `dosage_time`.
    pub fn pending(medication: &Medication, dosage_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            id: MedicationHistoryId::new(),
            medication_id: medication.id,
            user_id: medication.user_id,
            medication_name: medication.name.clone(),
            dosage: medication.dosage,
            dosage_time,
            has_medication_been_taken: false,
            was_medication_missed: MissedStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a user confirmation. Returns `false` when the state already matched.
    pub fn confirm(&mut self, has_medication_been_taken: bool, now: DateTime<Utc>) -> bool {
        let status = MissedStatus::from_taken(has_medication_been_taken);
        if self.has_medication_been_taken == has_medication_been_taken
            && self.was_medication_missed == status
        {
            return false;
        }
        self.has_medication_been_taken = has_medication_been_taken;
        self.was_medication_missed = status;
        self.updated_at = now;
        true
    }
}
