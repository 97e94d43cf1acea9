//! Dose adherence tracking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use medrem_core::error::AppError;
use medrem_core::result::AppResult;
use medrem_core::traits::Clock;
use medrem_core::types::MedicationHistoryId;
use medrem_database::MedicationHistoryStore;
use medrem_entity::history::{MedicationHistory, MissedStatus};
use medrem_entity::medication::Medication;

use super::dto::MedicationHistoryResponse;
use crate::context::RequestContext;
use crate::error::conceal;

/// Records dose occurrences and the user's taken/missed confirmations.
#[derive(Debug, Clone)]
pub struct MedicationHistoryService {
    /// History store.
    histories: Arc<dyn MedicationHistoryStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl MedicationHistoryService {
    /// Creates a new history service.
    pub fn new(histories: Arc<dyn MedicationHistoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { histories, clock }
    }

    /// Records whether the caller took the dose `history_id`.
    ///
    /// Both fields are written in one store call. Re-applying the same
    /// answer succeeds and leaves the row as it was.
    pub async fn update_medication_history(
        &self,
        ctx: &RequestContext,
        history_id: MedicationHistoryId,
        has_medication_been_taken: bool,
    ) -> AppResult<()> {
        let status = MissedStatus::from_taken(has_medication_been_taken);
        let found = self
            .histories
            .set_taken(
                history_id,
                ctx.user_id,
                has_medication_been_taken,
                status,
                self.clock.now(),
            )
            .await
            .map_err(conceal("update medication history"))?;

        if !found {
            return Err(AppError::not_found("Medication history not found"));
        }

        info!(
            history_id = %history_id,
            user_id = %ctx.user_id,
            was_medication_missed = %status,
            "Dose confirmation recorded"
        );
        Ok(())
    }

    /// Lists every dose occurrence of the caller, newest dose first.
    pub async fn get_all_by_user(
        &self,
        ctx: &RequestContext,
    ) -> AppResult<Vec<MedicationHistoryResponse>> {
        let entries = self
            .histories
            .find_by_user(ctx.user_id)
            .await
            .map_err(conceal("list medication history"))?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    /// Gets one dose occurrence of the caller.
    pub async fn get_detail(
        &self,
        ctx: &RequestContext,
        history_id: MedicationHistoryId,
    ) -> AppResult<MedicationHistoryResponse> {
        self.histories
            .find_by_id(history_id, ctx.user_id)
            .await
            .map_err(conceal("find medication history"))?
            .map(Into::into)
            .ok_or_else(|| AppError::not_found("Medication history not found"))
    }

    /// Records the unresolved occurrence of `medication` at `dosage_time`.
    ///
    /// Returns `false` when that occurrence was already recorded.
    pub async fn record_occurrence(
        &self,
        medication: &Medication,
        dosage_time: DateTime<Utc>,
    ) -> AppResult<bool> {
        let entry = MedicationHistory::pending(medication, dosage_time, self.clock.now());
        let inserted = self
            .histories
            .insert_if_absent(&entry)
            .await
            .map_err(conceal("record dose occurrence"))?;

        if inserted {
            debug!(
                medication_id = %medication.id,
                history_id = %entry.id,
                dosage_time = %dosage_time,
                "Dose occurrence recorded"
            );
        }
        Ok(inserted)
    }
}
