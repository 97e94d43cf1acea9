//! Job trait shared by the hourly runner and the cron scheduler.

use async_trait::async_trait;
use serde_json::Value;

use medrem_core::error::AppError;

/// A unit of background work run on a schedule.
#[async_trait]
pub trait PeriodicJob: Send + Sync + std::fmt::Debug + 'static {
    /// Get the job name used in logs
    fn name(&self) -> &str;

    /// Run the job once and return a summary
    async fn execute(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Transient failure; the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Run `job` once and log its outcome. Failures are never propagated.
pub async fn run_logged(job: &dyn PeriodicJob) {
    tracing::debug!("Running job '{}'", job.name());
    match job.execute().await {
        Ok(summary) => tracing::info!("Job '{}' finished: {}", job.name(), summary),
        Err(e) => tracing::error!("Job '{}' failed: {}", job.name(), e),
    }
}
