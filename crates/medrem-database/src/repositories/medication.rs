//! Medication repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use medrem_core::error::{AppError, ErrorKind};
use medrem_core::result::AppResult;
use medrem_core::types::{MedicationId, UserId};
use medrem_entity::medication::Medication;

use crate::store::MedicationStore;

/// Repository for medication CRUD and schedule queries.
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    pool: PgPool,
}

impl MedicationRepository {
    /// Create a new medication repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicationStore for MedicationRepository {
    async fn insert(&self, medication: &Medication) -> AppResult<Medication> {
        sqlx::query_as::<_, Medication>(
            "INSERT INTO medications (id, user_id, name, dosage, time_interval, start_date, start_time, \
             stop_date, duration, purpose, icon, is_medication_course_complete, next_dosage_time, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        )
        .bind(medication.id)
        .bind(medication.user_id)
        .bind(&medication.name)
        .bind(medication.dosage)
        .bind(medication.time_interval)
        .bind(medication.start_date)
        .bind(medication.start_time)
        .bind(medication.stop_date)
        .bind(medication.duration)
        .bind(&medication.purpose)
        .bind(&medication.icon)
        .bind(medication.is_medication_course_complete)
        .bind(medication.next_dosage_time)
        .bind(medication.created_at)
        .bind(medication.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create medication", e))
    }

    async fn update(&self, medication: &Medication) -> AppResult<Option<Medication>> {
        sqlx::query_as::<_, Medication>(
            "UPDATE medications SET name = $3, dosage = $4, time_interval = $5, start_date = $6, \
             start_time = $7, stop_date = $8, duration = $9, purpose = $10, icon = $11, \
             is_medication_course_complete = $12, next_dosage_time = $13, updated_at = $14 \
             WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(medication.id)
        .bind(medication.user_id)
        .bind(&medication.name)
        .bind(medication.dosage)
        .bind(medication.time_interval)
        .bind(medication.start_date)
        .bind(medication.start_time)
        .bind(medication.stop_date)
        .bind(medication.duration)
        .bind(&medication.purpose)
        .bind(&medication.icon)
        .bind(medication.is_medication_course_complete)
        .bind(medication.next_dosage_time)
        .bind(medication.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update medication", e))
    }

    async fn find_by_id(&self, id: MedicationId, user_id: UserId) -> AppResult<Option<Medication>> {
        sqlx::query_as::<_, Medication>("SELECT * FROM medications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find medication", e))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Medication>> {
        sqlx::query_as::<_, Medication>(
            "SELECT * FROM medications WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list medications", e))
    }

    async fn find_due_by_user(
        &self,
        user_id: UserId,
        due_before: DateTime<Utc>,
    ) -> AppResult<Vec<Medication>> {
        sqlx::query_as::<_, Medication>(
            "SELECT * FROM medications WHERE user_id = $1 AND is_medication_course_complete = FALSE \
             AND next_dosage_time <= $2 ORDER BY next_dosage_time ASC",
        )
        .bind(user_id)
        .bind(due_before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list due medications", e)
        })
    }

    async fn find_due(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Medication>> {
        sqlx::query_as::<_, Medication>(
            "SELECT * FROM medications WHERE is_medication_course_complete = FALSE \
             AND next_dosage_time < $1 ORDER BY next_dosage_time ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list due medications", e)
        })
    }

    async fn delete(&self, id: MedicationId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM medications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete medication", e)
            })?;
        Ok(result.rows_affected() > 0)
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
        let result = sqlx::query(
            "UPDATE medications SET next_dosage_time = $4, is_medication_course_complete = $5, \
             updated_at = $6 WHERE id = $1 AND user_id = $2 AND next_dosage_time = $3 \
             AND is_medication_course_complete = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .bind(expected_next)
        .bind(next_dosage_time)
        .bind(course_complete)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to advance schedule", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn complete_ended_courses(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE medications SET is_medication_course_complete = TRUE, updated_at = $1 \
             WHERE is_medication_course_complete = FALSE AND stop_date < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to complete ended courses", e)
        })?;
        Ok(result.rows_affected())
    }
}
