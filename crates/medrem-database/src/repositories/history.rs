//! Medication history repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use medrem_core::error::{AppError, ErrorKind};
use medrem_core::result::AppResult;
use medrem_core::types::{MedicationHistoryId, UserId};
use medrem_entity::history::{MedicationHistory, MissedStatus};

use crate::store::MedicationHistoryStore;

/// Repository for dose occurrences.
#[derive(Debug, Clone)]
pub struct MedicationHistoryRepository {
    pool: PgPool,
}

impl MedicationHistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicationHistoryStore for MedicationHistoryRepository {
    async fn insert_if_absent(&self, entry: &MedicationHistory) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO medication_histories (id, medication_id, user_id, medication_name, dosage, \
             dosage_time, has_medication_been_taken, was_medication_missed, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (medication_id, dosage_time) DO NOTHING",
        )
        .bind(entry.id)
        .bind(entry.medication_id)
        .bind(entry.user_id)
        .bind(&entry.medication_name)
        .bind(entry.dosage)
        .bind(entry.dosage_time)
        .bind(entry.has_medication_been_taken)
        .bind(entry.was_medication_missed)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record dose occurrence", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(
        &self,
        id: MedicationHistoryId,
        user_id: UserId,
    ) -> AppResult<Option<MedicationHistory>> {
        sqlx::query_as::<_, MedicationHistory>(
            "SELECT * FROM medication_histories WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find history", e))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<MedicationHistory>> {
        sqlx::query_as::<_, MedicationHistory>(
            "SELECT * FROM medication_histories WHERE user_id = $1 \
             ORDER BY dosage_time DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list history", e))
    }

    async fn set_taken(
        &self,
        id: MedicationHistoryId,
        user_id: UserId,
        has_medication_been_taken: bool,
        was_medication_missed: MissedStatus,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        // PostgreSQL counts matched rows, so a no-op re-confirmation still reports the row.
        let result = sqlx::query(
            "UPDATE medication_histories SET has_medication_been_taken = $3, \
             was_medication_missed = $4, \
             updated_at = CASE WHEN has_medication_been_taken = $3 AND was_medication_missed = $4 \
                          THEN updated_at ELSE $5 END \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(has_medication_been_taken)
        .bind(was_medication_missed)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update history", e))?;
        Ok(result.rows_affected() > 0)
    }
}
