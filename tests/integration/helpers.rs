//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use medrem_core::config::{PushConfig, SchedulerConfig};
use medrem_core::error::AppError;
use medrem_core::result::AppResult;
use medrem_core::traits::{Clock, DeliveryStatus, FixedClock, PushDelivery, PushMessage, PushSender};
use medrem_core::types::UserId;
use medrem_database::memory::{
    MemoryDeviceTokenStore, MemoryMedicationHistoryStore, MemoryMedicationStore,
};
use medrem_service::medication::{CreateMedicationRequest, MedicationResponse};
use medrem_service::{
    DeviceTokenService, MedicationHistoryService, MedicationService, RequestContext,
};
use medrem_worker::{DoseReminderJob, PeriodicJob};

/// Push sender that records every message and can reject tokens.
#[derive(Debug, Default)]
pub struct RecordingSender {
    invalid: Mutex<Vec<String>>,
    down: Mutex<bool>,
    sent: Mutex<Vec<(Vec<String>, PushMessage)>>,
}

impl RecordingSender {
    /// Report `token` as unregistered from now on.
    pub fn reject(&self, token: &str) {
        self.invalid.lock().unwrap().push(token.to_string());
    }

    /// Make every send fail.
    pub fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }

    /// Messages sent so far with their target tokens.
    pub fn sent(&self) -> Vec<(Vec<String>, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> AppResult<Vec<PushDelivery>> {
        if *self.down.lock().unwrap() {
            return Err(AppError::external_service("push provider unavailable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((tokens.to_vec(), message.clone()));
        let invalid = self.invalid.lock().unwrap();
        Ok(tokens
            .iter()
            .map(|token| PushDelivery {
                token: token.clone(),
                status: if invalid.contains(token) {
                    DeliveryStatus::InvalidToken
                } else {
                    DeliveryStatus::Delivered
                },
            })
            .collect())
    }
}

/// Test application context wired over in-memory stores.
pub struct TestApp {
    pub clock: Arc<FixedClock>,
    pub medication_store: Arc<MemoryMedicationStore>,
    pub history_store: Arc<MemoryMedicationHistoryStore>,
    pub medications: MedicationService,
    pub histories: MedicationHistoryService,
    pub devices: DeviceTokenService,
    pub sender: Arc<RecordingSender>,
    pub job: DoseReminderJob,
}

impl TestApp {
    /// Create a new test application with the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        let clock = Arc::new(FixedClock::new(now));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let medication_store = Arc::new(MemoryMedicationStore::new());
        let history_store = Arc::new(MemoryMedicationHistoryStore::new());
        let token_store = Arc::new(MemoryDeviceTokenStore::new());

        let scheduler = SchedulerConfig::default();
        let push = PushConfig::default();

        let medications = MedicationService::new(medication_store.clone(), shared_clock.clone())
            .with_due_window(scheduler.due_window());
        let histories = MedicationHistoryService::new(history_store.clone(), shared_clock.clone());
        let devices = DeviceTokenService::new(token_store, shared_clock);
        let sender = Arc::new(RecordingSender::default());

        let job = DoseReminderJob::new(
            medications.clone(),
            histories.clone(),
            devices.clone(),
            sender.clone(),
            &scheduler,
            &push,
        );

        Self {
            clock,
            medication_store,
            history_store,
            medications,
            histories,
            devices,
            sender,
            job,
        }
    }

    /// A request context for a fresh user.
    pub fn user(&self) -> RequestContext {
        RequestContext::new(UserId::new())
    }

    /// Create a medication for `ctx`.
    pub async fn create_medication(
        &self,
        ctx: &RequestContext,
        name: &str,
        start_time: &str,
        time_interval: i32,
        stop_date: &str,
    ) -> MedicationResponse {
        self.medications
            .create(
                ctx,
                CreateMedicationRequest {
                    name: name.to_string(),
                    dosage: 1,
                    time_interval,
                    start_date: start_time.to_string(),
                    start_time: start_time.to_string(),
                    stop_date: stop_date.to_string(),
                    duration: 2,
                    purpose: "test".to_string(),
                    icon: "tablet".to_string(),
                },
            )
            .await
            .expect("Failed to create medication")
    }

    /// Move the clock to `hour:minute` on 2024-05-`day` UTC.
    pub fn set_time(&self, day: u32, hour: u32, minute: u32) {
        self.clock
            .set(Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap());
    }

    /// Advance the clock.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Run one reminder sweep and return its summary.
    pub async fn sweep(&self) -> Value {
        self.job.execute().await.expect("Sweep failed")
    }
}

/// 2024-05-01 08:00:00 UTC.
pub fn start_of_test() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}
