//! Medication scheduling: creation, editing, lookups, and due queries.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use validator::Validate;

use medrem_core::error::AppError;
use medrem_core::result::AppResult;
use medrem_core::traits::Clock;
use medrem_core::types::MedicationId;
use medrem_database::MedicationStore;
use medrem_entity::medication::Medication;

use super::dto::{
    CreateMedicationRequest, MedicationResponse, UpdateMedicationRequest, WRONG_DATE_FORMAT,
    WRONG_TIME_FORMAT, parse_timestamp, validation_error,
};
use crate::context::RequestContext;
use crate::error::conceal;
use crate::schedule::{advance_past, compute_next_dose, truncate_to_hour};

/// Default look-ahead for "what's next" queries.
pub const DEFAULT_DUE_WINDOW_MINUTES: i64 = 60;

/// Where a medication's schedule landed after a handled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAdvance {
    /// The next dose is due at this time.
    Next(DateTime<Utc>),
    /// The next dose would fall after the stop date; the course is complete.
    CourseComplete,
    /// The medication was edited, completed, or deleted after it was read.
    /// Nothing was written.
    Superseded,
}

/// Creates, edits, and queries medications and their next dose time.
#[derive(Debug, Clone)]
pub struct MedicationService {
    /// Medication store.
    medications: Arc<dyn MedicationStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Look-ahead of [`MedicationService::get_next`].
    due_window: Duration,
}

impl MedicationService {
    /// Creates a new medication service with the default due window.
    pub fn new(medications: Arc<dyn MedicationStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            medications,
            clock,
            due_window: Duration::minutes(DEFAULT_DUE_WINDOW_MINUTES),
        }
    }

    /// Replaces the due window.
    pub fn with_due_window(mut self, due_window: Duration) -> Self {
        self.due_window = due_window;
        self
    }

    /// Creates a medication and computes its first next dose.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut req: CreateMedicationRequest,
    ) -> AppResult<MedicationResponse> {
        req.name = req.name.trim().to_string();
        req.validate().map_err(validation_error)?;

        let start_date = parse_timestamp(&req.start_date, WRONG_DATE_FORMAT)?;
        let start_time = parse_timestamp(&req.start_time, WRONG_TIME_FORMAT)?;
        let stop_date = parse_timestamp(&req.stop_date, WRONG_DATE_FORMAT)?;
        ensure_date_range(start_date, stop_date)?;

        let now = self.clock.now();
        let medication = Medication {
            id: MedicationId::new(),
            user_id: ctx.user_id,
            name: req.name,
            dosage: req.dosage,
            time_interval: req.time_interval,
            start_date,
            start_time,
            stop_date,
            duration: req.duration,
            purpose: req.purpose,
            icon: req.icon,
            is_medication_course_complete: false,
            next_dosage_time: compute_next_dose(start_time, req.time_interval),
            created_at: now,
            updated_at: now,
        };

        let stored = self
            .medications
            .insert(&medication)
            .await
            .map_err(conceal("insert medication"))?;

        info!(
            medication_id = %stored.id,
            user_id = %stored.user_id,
            next_dosage_time = %stored.next_dosage_time,
            "Medication created"
        );

        Ok(stored.into())
    }

    /// Edits a medication owned by the caller.
    ///
    /// The next dose is recomputed when the interval or start time changes.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        medication_id: MedicationId,
        mut req: UpdateMedicationRequest,
    ) -> AppResult<MedicationResponse> {
        req.name = req.name.map(|name| name.trim().to_string());
        req.validate().map_err(validation_error)?;

        let start_date = req
            .start_date
            .as_deref()
            .map(|s| parse_timestamp(s, WRONG_DATE_FORMAT))
            .transpose()?;
        let start_time = req
            .start_time
            .as_deref()
            .map(|s| parse_timestamp(s, WRONG_TIME_FORMAT))
            .transpose()?;
        let stop_date = req
            .stop_date
            .as_deref()
            .map(|s| parse_timestamp(s, WRONG_DATE_FORMAT))
            .transpose()?;

        let mut medication = self.find_owned(ctx, medication_id).await?;
        let previous = medication.schedule();

        if let Some(name) = req.name {
            medication.name = name;
        }
        if let Some(dosage) = req.dosage {
            medication.dosage = dosage;
        }
        if let Some(time_interval) = req.time_interval {
            medication.time_interval = time_interval;
        }
        if let Some(start_date) = start_date {
            medication.start_date = start_date;
        }
        if let Some(start_time) = start_time {
            medication.start_time = start_time;
        }
        if let Some(stop_date) = stop_date {
            medication.stop_date = stop_date;
        }
        if let Some(duration) = req.duration {
            medication.duration = duration;
        }
        if let Some(purpose) = req.purpose {
            medication.purpose = purpose;
        }
        if let Some(icon) = req.icon {
            medication.icon = icon;
        }
        if let Some(complete) = req.is_medication_course_complete {
            medication.is_medication_course_complete = complete;
        }
        ensure_date_range(medication.start_date, medication.stop_date)?;

        if medication.schedule() != previous {
            medication.next_dosage_time =
                compute_next_dose(medication.start_time, medication.time_interval);
            debug!(
                medication_id = %medication.id,
                next_dosage_time = %medication.next_dosage_time,
                "Schedule changed, next dose recomputed"
            );
        }
        medication.updated_at = self.clock.now();

        let stored = self
            .medications
            .update(&medication)
            .await
            .map_err(conceal("update medication"))?
            .ok_or_else(|| AppError::not_found("Medication not found"))?;

        info!(medication_id = %stored.id, user_id = %stored.user_id, "Medication updated");

        Ok(stored.into())
    }

    /// Gets one medication owned by the caller.
    pub async fn get_detail(
        &self,
        ctx: &RequestContext,
        medication_id: MedicationId,
    ) -> AppResult<MedicationResponse> {
        self.find_owned(ctx, medication_id).await.map(Into::into)
    }

    /// Lists every medication owned by the caller.
    pub async fn get_all(&self, ctx: &RequestContext) -> AppResult<Vec<MedicationResponse>> {
        let medications = self
            .medications
            .find_by_user(ctx.user_id)
            .await
            .map_err(conceal("list medications"))?;
        Ok(medications.into_iter().map(Into::into).collect())
    }

    /// Lists the caller's medications due now or within the due window,
    /// soonest first.
    pub async fn get_next(&self, ctx: &RequestContext) -> AppResult<Vec<MedicationResponse>> {
        let due_before = self.clock.now() + self.due_window;
        let medications = self
            .medications
            .find_due_by_user(ctx.user_id, due_before)
            .await
            .map_err(conceal("list next medications"))?;
        Ok(medications.into_iter().map(Into::into).collect())
    }

    /// Lists every user's medications with a dose in the current hour or
    /// earlier, soonest first. A dose at the top of the next hour waits for
    /// the next hourly sweep.
    pub async fn get_due_medications(&self) -> AppResult<Vec<Medication>> {
        let cutoff = truncate_to_hour(self.clock.now()) + Duration::hours(1);
        self.medications
            .find_due(cutoff)
            .await
            .map_err(conceal("list due medications"))
    }

    /// Deletes a medication owned by the caller. Its dose history is kept.
    pub async fn delete(&self, ctx: &RequestContext, medication_id: MedicationId) -> AppResult<()> {
        let deleted = self
            .medications
            .delete(medication_id, ctx.user_id)
            .await
            .map_err(conceal("delete medication"))?;
        if !deleted {
            return Err(AppError::not_found("Medication not found"));
        }

        info!(medication_id = %medication_id, user_id = %ctx.user_id, "Medication deleted");
        Ok(())
    }

    /// Moves the schedule of `medication` past the dose at `dosage_time`.
    ///
    /// The next dose is the first calculator step from `dosage_time` that
    /// lies in the future. If that falls after the stop date the course is
    /// marked complete instead. A row that no longer holds `dosage_time` as
    /// its next dose, or was completed meanwhile, is left untouched.
    pub async fn advance_schedule(
        &self,
        medication: &Medication,
        dosage_time: DateTime<Utc>,
    ) -> AppResult<ScheduleAdvance> {
        let now = self.clock.now();
        let next = advance_past(dosage_time, medication.time_interval, now);
        let complete = next > medication.stop_date;

        let applied = self
            .medications
            .advance_schedule(
                medication.id,
                medication.user_id,
                dosage_time,
                next,
                complete,
                now,
            )
            .await
            .map_err(conceal("advance schedule"))?;

        if !applied {
            debug!(
                medication_id = %medication.id,
                dosage_time = %dosage_time,
                "Schedule changed since it was read, advance skipped"
            );
            Ok(ScheduleAdvance::Superseded)
        } else if complete {
            info!(medication_id = %medication.id, "Medication course complete");
            Ok(ScheduleAdvance::CourseComplete)
        } else {
            debug!(medication_id = %medication.id, next_dosage_time = %next, "Schedule advanced");
            Ok(ScheduleAdvance::Next(next))
        }
    }

    /// Marks every course whose stop date has passed as complete.
    pub async fn complete_ended_courses(&self) -> AppResult<u64> {
        let now = self.clock.now();
        let completed = self
            .medications
            .complete_ended_courses(now)
            .await
            .map_err(conceal("complete ended courses"))?;
        if completed > 0 {
            info!(completed, "Retired ended medication courses");
        }
        Ok(completed)
    }

    async fn find_owned(
        &self,
        ctx: &RequestContext,
        medication_id: MedicationId,
    ) -> AppResult<Medication> {
        self.medications
            .find_by_id(medication_id, ctx.user_id)
            .await
            .map_err(conceal("find medication"))?
            .ok_or_else(|| AppError::not_found("Medication not found"))
    }
}

fn ensure_date_range(start_date: DateTime<Utc>, stop_date: DateTime<Utc>) -> AppResult<()> {
    if stop_date < start_date {
        return Err(AppError::bad_request("stop_date must not be before start_date"));
    }
    Ok(())
}
