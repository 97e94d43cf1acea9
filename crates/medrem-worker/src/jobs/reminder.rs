//! Dose reminder sweep.
//!
//! Each run asks for every medication with a dose in the current hour or
//! earlier, then handles each one as an independent task on a bounded pool:
//! notify the owner's devices, record the dose occurrence, and advance the
//! schedule. Only the notification is bounded by the dispatch timeout. A
//! push that hangs or fails is logged, and the dose is still recorded and
//! the schedule still advanced.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use medrem_core::config::{PushConfig, SchedulerConfig};
use medrem_core::result::AppResult;
use medrem_core::traits::{DeliveryStatus, PushMessage, PushSender};
use medrem_entity::medication::Medication;
use medrem_service::medication::ScheduleAdvance;
use medrem_service::{DeviceTokenService, MedicationHistoryService, MedicationService};

use crate::executor::{JobExecutionError, PeriodicJob};

/// Sends due-dose reminders and moves schedules forward.
#[derive(Debug, Clone)]
pub struct DoseReminderJob {
    /// Collaborators shared with every dispatch task
    dispatcher: Arc<Dispatcher>,
    /// Maximum concurrent dispatch tasks
    concurrency: usize,
}

#[derive(Debug)]
struct Dispatcher {
    medications: MedicationService,
    histories: MedicationHistoryService,
    devices: DeviceTokenService,
    sender: Arc<dyn PushSender>,
    click_action_base_url: String,
    /// Upper bound for notifying one medication's devices
    notify_timeout: Duration,
}

/// What happened to one due medication.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DispatchOutcome {
    delivery: Delivery,
    recorded: bool,
    advance: ScheduleAdvance,
}

/// Result of notifying one medication's devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Delivery {
    delivered: usize,
    invalid_removed: usize,
    timed_out: bool,
}

impl DoseReminderJob {
    /// Create a new dose reminder job
    pub fn new(
        medications: MedicationService,
        histories: MedicationHistoryService,
        devices: DeviceTokenService,
        sender: Arc<dyn PushSender>,
        scheduler: &SchedulerConfig,
        push: &PushConfig,
    ) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher {
                medications,
                histories,
                devices,
                sender,
                click_action_base_url: push.click_action_base_url.clone(),
                notify_timeout: scheduler.dispatch_timeout(),
            }),
            concurrency: scheduler.concurrency.max(1),
        }
    }
}

#[async_trait]
impl PeriodicJob for DoseReminderJob {
    fn name(&self) -> &str {
        "dose_reminder"
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let due = self
            .dispatcher
            .medications
            .get_due_medications()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Due medication query failed: {}", e)))?;

        tracing::info!(
            "Dose reminder sweep: {} due medication(s), sender='{}'",
            due.len(),
            self.dispatcher.sender.name()
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let total = due.len();

        for medication in due {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| JobExecutionError::Transient(format!("Dispatch pool closed: {}", e)))?;
            let dispatcher = Arc::clone(&self.dispatcher);

            tasks.spawn(async move {
                let _permit = permit;
                let medication_id = medication.id;
                (medication_id, dispatcher.dispatch(medication).await)
            });
        }

        let mut handled = 0usize;
        let mut delivered = 0usize;
        let mut tokens_removed = 0usize;
        let mut recorded = 0usize;
        let mut failed = 0usize;
        let mut timed_out = 0usize;
        let mut completed = 0usize;
        let mut superseded = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(outcome))) => {
                    handled += 1;
                    delivered += outcome.delivery.delivered;
                    tokens_removed += outcome.delivery.invalid_removed;
                    timed_out += usize::from(outcome.delivery.timed_out);
                    recorded += usize::from(outcome.recorded);
                    match outcome.advance {
                        ScheduleAdvance::CourseComplete => completed += 1,
                        ScheduleAdvance::Superseded => superseded += 1,
                        ScheduleAdvance::Next(_) => {}
                    }
                }
                Ok((medication_id, Err(e))) => {
                    failed += 1;
                    tracing::warn!("Reminder for medication {} failed: {}", medication_id, e);
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("Reminder task aborted: {}", e);
                }
            }
        }

        Ok(serde_json::json!({
            "task": "dose_reminder",
            "due": total,
            "handled": handled,
            "notifications_delivered": delivered,
            "tokens_removed": tokens_removed,
            "occurrences_recorded": recorded,
            "courses_completed": completed,
            "superseded": superseded,
            "failed": failed,
            "timed_out": timed_out,
        }))
    }
}

impl Dispatcher {
    async fn dispatch(&self, medication: Medication) -> AppResult<DispatchOutcome> {
        let dosage_time = medication.next_dosage_time;
        let delivery = self.notify_bounded(&medication).await;

        let recorded = self
            .histories
            .record_occurrence(&medication, dosage_time)
            .await?;
        let advance = self
            .medications
            .advance_schedule(&medication, dosage_time)
            .await?;

        Ok(DispatchOutcome {
            delivery,
            recorded,
            advance,
        })
    }

    /// Notify within `notify_timeout`. Timeouts and errors are logged and
    /// reported as an empty delivery.
    async fn notify_bounded(&self, medication: &Medication) -> Delivery {
        match tokio::time::timeout(self.notify_timeout, self.notify(medication)).await {
            Ok(Ok(delivery)) => delivery,
            Ok(Err(e)) => {
                tracing::warn!("Notifying medication {} failed: {}", medication.id, e);
                Delivery::default()
            }
            Err(_) => {
                tracing::warn!(
                    "Notifying medication {} timed out after {:?}",
                    medication.id,
                    self.notify_timeout
                );
                Delivery {
                    timed_out: true,
                    ..Delivery::default()
                }
            }
        }
    }

    /// Push the reminder to every device of the owner.
    async fn notify(&self, medication: &Medication) -> AppResult<Delivery> {
        let tokens = self.devices.tokens_for_user(medication.user_id).await?;
        if tokens.is_empty() {
            tracing::debug!(
                "No device tokens for user {}, skipping push for medication {}",
                medication.user_id,
                medication.id
            );
            return Ok(Delivery::default());
        }

        let message = build_message(medication, &self.click_action_base_url);
        let deliveries = self.sender.send(&tokens, &message).await?;

        let mut delivery = Delivery::default();
        for result in deliveries {
            match result.status {
                DeliveryStatus::Delivered => delivery.delivered += 1,
                DeliveryStatus::InvalidToken => {
                    self.devices
                        .discard_invalid(medication.user_id, &result.token)
                        .await?;
                    delivery.invalid_removed += 1;
                }
                DeliveryStatus::Failed(reason) => {
                    tracing::warn!(
                        "Push to a device of user {} failed: {}",
                        medication.user_id,
                        reason
                    );
                }
            }
        }
        Ok(delivery)
    }
}

/// Build the reminder payload for `medication`.
pub fn build_message(medication: &Medication, click_action_base_url: &str) -> PushMessage {
    let dosage_time: DateTime<Utc> = medication.next_dosage_time;
    PushMessage {
        title: medication.name.clone(),
        body: format!(
            "It's time to take {} dose(s) of {}.",
            medication.dosage, medication.name
        ),
        click_action: format!(
            "{}/{}",
            click_action_base_url.trim_end_matches('/'),
            medication.id
        ),
        data: HashMap::from([
            ("medication_id".to_string(), medication.id.to_string()),
            ("dosage_time".to_string(), dosage_time.to_rfc3339()),
        ]),
    }
}
