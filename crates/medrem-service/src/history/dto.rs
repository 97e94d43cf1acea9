//! Medication history response type.

use serde::{Deserialize, Serialize};

use medrem_core::types::{MedicationHistoryId, MedicationId};
use medrem_entity::history::{MedicationHistory, MissedStatus};

use crate::display::display_timestamp;

/// A dose occurrence as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationHistoryResponse {
    pub id: MedicationHistoryId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub dosage: i32,
    pub dosage_time: String,
    pub has_medication_been_taken: bool,
    /// Serialized as `"NO"`, `"YES"`, or `""`.
    pub was_medication_missed: MissedStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MedicationHistory> for MedicationHistoryResponse {
    fn from(h: MedicationHistory) -> Self {
        Self {
            id: h.id,
            medication_id: h.medication_id,
            medication_name: h.medication_name,
            dosage: h.dosage,
            dosage_time: display_timestamp(h.dosage_time),
            has_medication_been_taken: h.has_medication_been_taken,
            was_medication_missed: h.was_medication_missed,
            created_at: display_timestamp(h.created_at),
            updated_at: display_timestamp(h.updated_at),
        }
    }
}
