//! Marks medication courses whose stop date has passed as complete.

use async_trait::async_trait;
use serde_json::Value;

use medrem_service::MedicationService;

use crate::executor::{JobExecutionError, PeriodicJob};

/// Retires ended courses so they are never due again.
#[derive(Debug, Clone)]
pub struct CourseRetirementJob {
    /// Medication service
    medications: MedicationService,
}

impl CourseRetirementJob {
    /// Create a new course retirement job
    pub fn new(medications: MedicationService) -> Self {
        Self { medications }
    }
}

#[async_trait]
impl PeriodicJob for CourseRetirementJob {
    fn name(&self) -> &str {
        "course_retirement"
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let completed = self
            .medications
            .complete_ended_courses()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Course retirement failed: {}", e)))?;

        Ok(serde_json::json!({
            "task": "course_retirement",
            "completed": completed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use medrem_core::traits::FixedClock;
    use medrem_core::types::UserId;
    use medrem_database::memory::MemoryMedicationStore;
    use medrem_service::RequestContext;
    use medrem_service::medication::CreateMedicationRequest;

    #[tokio::test]
    async fn test_retires_ended_courses() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()));
        let store = Arc::new(MemoryMedicationStore::new());
        let medications = MedicationService::new(store.clone(), clock.clone());
        let ctx = RequestContext::new(UserId::new());
        medications
            .create(
                &ctx,
                CreateMedicationRequest {
                    name: "Prednisone".to_string(),
                    dosage: 1,
                    time_interval: 24,
                    start_date: "2024-01-01T00:00:00Z".to_string(),
                    start_time: "2024-01-01T08:00:00Z".to_string(),
                    stop_date: "2024-01-10T00:00:00Z".to_string(),
                    duration: 10,
                    purpose: String::new(),
                    icon: String::new(),
                },
            )
            .await
            .unwrap();

        let job = CourseRetirementJob::new(medications);
        let summary = job.execute().await.unwrap();
        assert_eq!(summary["completed"], 1);
        let summary = job.execute().await.unwrap();
        assert_eq!(summary["completed"], 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_transient() {
        let store = Arc::new(MemoryMedicationStore::new());
        store.probe().set_unavailable(true);
        let job = CourseRetirementJob::new(MedicationService::new(
            store,
            Arc::new(FixedClock::new(Utc::now())),
        ));
        assert!(matches!(
            job.execute().await,
            Err(JobExecutionError::Transient(_))
        ));
    }
}
