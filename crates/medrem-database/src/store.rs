//! Record store traits consumed by the service layer.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-memory implementation in [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use medrem_core::result::AppResult;
use medrem_core::types::{MedicationHistoryId, MedicationId, UserId};
use medrem_entity::device::DeviceToken;
use medrem_entity::history::{MedicationHistory, MissedStatus};
use medrem_entity::medication::Medication;

/// Persistence for medication records.
#[async_trait]
pub trait MedicationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new medication and return the stored row.
    async fn insert(&self, medication: &Medication) -> AppResult<Medication>;

    /// Replace a medication matched by `id` and `user_id`. Returns `None` if no row matched.
    async fn update(&self, medication: &Medication) -> AppResult<Option<Medication>>;

    /// Find a medication owned by `user_id`.
    async fn find_by_id(&self, id: MedicationId, user_id: UserId) -> AppResult<Option<Medication>>;

    /// List all medications owned by `user_id`, oldest first.
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Medication>>;

    /// Active medications of `user_id` with `next_dosage_time <= due_before`.
    async fn find_due_by_user(
        &self,
        user_id: UserId,
        due_before: DateTime<Utc>,
    ) -> AppResult<Vec<Medication>>;

    /// Active medications of every user with `next_dosage_time < cutoff`.
    async fn find_due(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Medication>>;

    /// Delete a medication owned by `user_id`. Returns `true` if deleted.
    async fn delete(&self, id: MedicationId, user_id: UserId) -> AppResult<bool>;

    /// Move the schedule forward, optionally retiring the course.
    ///
    /// Only writes while the row is active and still scheduled at
    /// `expected_next`. Returns `false` when the row was edited, completed,
    /// or removed since it was read.
    async fn advance_schedule(
        &self,
        id: MedicationId,
        user_id: UserId,
        expected_next: DateTime<Utc>,
        next_dosage_time: DateTime<Utc>,
        course_complete: bool,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Mark every active medication whose stop date is before `now` as complete.
    async fn complete_ended_courses(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Persistence for dose occurrences.
#[async_trait]
pub trait MedicationHistoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an occurrence unless one already exists for the same
    /// medication and dose time. Returns `true` if a row was inserted.
    async fn insert_if_absent(&self, entry: &MedicationHistory) -> AppResult<bool>;

    /// Find an occurrence owned by `user_id`.
    async fn find_by_id(
        &self,
        id: MedicationHistoryId,
        user_id: UserId,
    ) -> AppResult<Option<MedicationHistory>>;

    /// List every occurrence owned by `user_id`, newest dose first.
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<MedicationHistory>>;

    /// Write both confirmation fields in one statement. Returns `false`
    /// when no occurrence with `id` is owned by `user_id`.
    async fn set_taken(
        &self,
        id: MedicationHistoryId,
        user_id: UserId,
        has_medication_been_taken: bool,
        was_medication_missed: MissedStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Persistence for device push tokens.
#[async_trait]
pub trait DeviceTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Register a token. Registering an existing `(user_id, token)` pair
    /// returns the existing record.
    async fn register(&self, token: &DeviceToken) -> AppResult<DeviceToken>;

    /// Remove a token of `user_id`. Returns `true` if removed.
    async fn remove(&self, user_id: UserId, token: &str) -> AppResult<bool>;

    /// List the tokens of `user_id`.
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>>;
}
