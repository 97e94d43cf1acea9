//! In-memory medication store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use medrem_core::error::AppError;
use medrem_core::result::AppResult;
use medrem_core::types::{MedicationId, UserId};
use medrem_entity::medication::Medication;

use super::StoreProbe;
use crate::store::MedicationStore;

/// Medication store keyed by medication id.
#[derive(Debug, Default)]
pub struct MemoryMedicationStore {
    rows: DashMap<MedicationId, Medication>,
    probe: StoreProbe,
}

impl MemoryMedicationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counter and fault switch.
    pub fn probe(&self) -> &StoreProbe {
        &self.probe
    }

    /// Number of stored medications across all users.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn collect_sorted<F>(&self, filter: F, by_next_dose: bool) -> Vec<Medication>
    where
        F: Fn(&Medication) -> bool,
    {
        let mut items: Vec<Medication> = self
            .rows
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        if by_next_dose {
            items.sort_by_key(|m| (m.next_dosage_time, m.id));
        } else {
            items.sort_by_key(|m| (m.created_at, m.id));
        }
        items
    }
}

#[async_trait]
impl MedicationStore for MemoryMedicationStore {
    async fn insert(&self, medication: &Medication) -> AppResult<Medication> {
        self.probe.enter("insert")?;
        if self.rows.contains_key(&medication.id) {
            return Err(AppError::database(format!(
                "duplicate medication id {}",
                medication.id
            )));
        }
        self.rows.insert(medication.id, medication.clone());
        Ok(medication.clone())
    }

    async fn update(&self, medication: &Medication) -> AppResult<Option<Medication>> {
        self.probe.enter("update")?;
        match self.rows.get_mut(&medication.id) {
            Some(mut row) if row.user_id == medication.user_id => {
                let created_at = row.created_at;
                *row = medication.clone();
                row.created_at = created_at;
                Ok(Some(row.value().clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_id(&self, id: MedicationId, user_id: UserId) -> AppResult<Option<Medication>> {
        self.probe.enter("find_by_id")?;
        Ok(self
            .rows
            .get(&id)
            .filter(|row| row.user_id == user_id)
            .map(|row| row.value().clone()))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Medication>> {
        self.probe.enter("find_by_user")?;
        Ok(self.collect_sorted(|m| m.user_id == user_id, false))
    }

    async fn find_due_by_user(
        &self,
        user_id: UserId,
        due_before: DateTime<Utc>,
    ) -> AppResult<Vec<Medication>> {
        self.probe.enter("find_due_by_user")?;
        Ok(self.collect_sorted(
            |m| {
                m.user_id == user_id
                    && !m.is_medication_course_complete
                    && m.next_dosage_time <= due_before
            },
            true,
        ))
    }

    async fn find_due(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Medication>> {
        self.probe.enter("find_due")?;
        Ok(self.collect_sorted(
            |m| !m.is_medication_course_complete && m.next_dosage_time < cutoff,
            true,
        ))
    }

    async fn delete(&self, id: MedicationId, user_id: UserId) -> AppResult<bool> {
        self.probe.enter("delete")?;
        Ok(self
            .rows
            .remove_if(&id, |_, row| row.user_id == user_id)
            .is_some())
    }

    async fn advance_schedule(
        &self,
        id: MedicationId,
        user_id: UserId,
        expected_next: DateTime<Utc>,
        next_dosage_time: DateTime<Utc>,
        course_complete: bool,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.probe.enter("advance_schedule")?;
        match self.rows.get_mut(&id) {
            Some(mut row)
                if row.user_id == user_id
                    && row.next_dosage_time == expected_next
                    && !row.is_medication_course_complete =>
            {
                row.next_dosage_time = next_dosage_time;
                row.is_medication_course_complete = course_complete;
                row.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_ended_courses(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.probe.enter("complete_ended_courses")?;
        let mut completed = 0u64;
        for mut row in self.rows.iter_mut() {
            if !row.is_medication_course_complete && row.stop_date < now {
                row.is_medication_course_complete = true;
                row.updated_at = now;
                completed += 1;
            }
        }
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn medication(user_id: UserId, next: DateTime<Utc>) -> Medication {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        Medication {
            id: MedicationId::new(),
            user_id,
            name: "Metformin".to_string(),
            dosage: 1,
            time_interval: 12,
            start_date: start,
            start_time: start,
            stop_date: start + Duration::days(30),
            duration: 30,
            purpose: "diabetes".to_string(),
            icon: "pill".to_string(),
            is_medication_course_complete: false,
            next_dosage_time: next,
            created_at: start,
            updated_at: start,
        }
    }

    #[tokio::test]
    async fn test_find_is_owner_scoped() {
        let store = MemoryMedicationStore::new();
        let owner = UserId::new();
        let other = UserId::new();
        let med = medication(owner, Utc::now());
        store.insert(&med).await.unwrap();

        assert!(store.find_by_id(med.id, owner).await.unwrap().is_some());
        assert!(store.find_by_id(med.id, other).await.unwrap().is_none());
        assert!(!store.delete(med.id, other).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_due_sorted_and_filtered() {
        let store = MemoryMedicationStore::new();
        let user = UserId::new();
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap();

        let later = medication(user, now + Duration::hours(3));
        let soon = medication(user, now + Duration::minutes(20));
        let overdue = medication(user, now - Duration::hours(2));
        let mut done = medication(user, now - Duration::hours(1));
        done.is_medication_course_complete = true;

        for m in [&later, &soon, &overdue, &done] {
            store.insert(m).await.unwrap();
        }

        let due = store.find_due(now + Duration::hours(1)).await.unwrap();
        let ids: Vec<MedicationId> = due.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![overdue.id, soon.id]);

        let on_cutoff = medication(user, now + Duration::hours(1));
        store.insert(&on_cutoff).await.unwrap();
        let due = store.find_due(now + Duration::hours(1)).await.unwrap();
        assert!(due.iter().all(|m| m.id != on_cutoff.id));
    }

    #[tokio::test]
    async fn test_advance_schedule_skips_changed_rows() {
        let store = MemoryMedicationStore::new();
        let user = UserId::new();
        let now = Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).unwrap();
        let med = medication(user, now);
        store.insert(&med).await.unwrap();

        let mut edited = med.clone();
        edited.next_dosage_time = now + Duration::hours(9);
        edited.is_medication_course_complete = true;
        store.update(&edited).await.unwrap();

        let applied = store
            .advance_schedule(med.id, user, now, now + Duration::hours(12), false, now)
            .await
            .unwrap();
        assert!(!applied);
        let stored = store.find_by_id(med.id, user).await.unwrap().unwrap();
        assert_eq!(stored.next_dosage_time, now + Duration::hours(9));
        assert!(stored.is_medication_course_complete);

        let fresh = medication(user, now);
        store.insert(&fresh).await.unwrap();
        let applied = store
            .advance_schedule(fresh.id, user, now, now + Duration::hours(12), false, now)
            .await
            .unwrap();
        assert!(applied);
        let stored = store.find_by_id(fresh.id, user).await.unwrap().unwrap();
        assert_eq!(stored.next_dosage_time, now + Duration::hours(12));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryMedicationStore::new();
        store.probe().set_unavailable(true);
        let err = store.find_by_user(UserId::new()).await.unwrap_err();
        assert!(err.is(medrem_core::error::ErrorKind::Database));
        assert_eq!(store.probe().calls(), 1);
    }
}
