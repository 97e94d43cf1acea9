//! In-memory medication history store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use medrem_core::result::AppResult;
use medrem_core::types::{MedicationHistoryId, MedicationId, UserId};
use medrem_entity::history::{MedicationHistory, MissedStatus};

use super::StoreProbe;
use crate::store::MedicationHistoryStore;

/// History store keyed by history id, with a uniqueness index on
/// `(medication_id, dosage_time)`.
#[derive(Debug, Default)]
pub struct MemoryMedicationHistoryStore {
    rows: DashMap<MedicationHistoryId, MedicationHistory>,
    occurrences: DashMap<(MedicationId, DateTime<Utc>), MedicationHistoryId>,
    probe: StoreProbe,
}

impl MemoryMedicationHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counter and fault switch.
    pub fn probe(&self) -> &StoreProbe {
        &self.probe
    }

    /// Number of stored occurrences across all users.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl MedicationHistoryStore for MemoryMedicationHistoryStore {
    async fn insert_if_absent(&self, entry: &MedicationHistory) -> AppResult<bool> {
        self.probe.enter("insert_if_absent")?;
        match self.occurrences.entry((entry.medication_id, entry.dosage_time)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(entry.id);
                self.rows.insert(entry.id, entry.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_id(
        &self,
        id: MedicationHistoryId,
        user_id: UserId,
    ) -> AppResult<Option<MedicationHistory>> {
        self.probe.enter("find_by_id")?;
        Ok(self
            .rows
            .get(&id)
            .filter(|row| row.user_id == user_id)
            .map(|row| row.value().clone()))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<MedicationHistory>> {
        self.probe.enter("find_by_user")?;
        let mut items: Vec<MedicationHistory> = self
            .rows
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| {
            b.dosage_time
                .cmp(&a.dosage_time)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn set_taken(
        &self,
        id: MedicationHistoryId,
        user_id: UserId,
        has_medication_been_taken: bool,
        was_medication_missed: MissedStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.probe.enter("set_taken")?;
        match self.rows.get_mut(&id) {
            Some(mut row) if row.user_id == user_id => {
                let unchanged = row.has_medication_been_taken == has_medication_been_taken
                    && row.was_medication_missed == was_medication_missed;
                if !unchanged {
                    row.has_medication_been_taken = has_medication_been_taken;
                    row.was_medication_missed = was_medication_missed;
                    row.updated_at = now;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
