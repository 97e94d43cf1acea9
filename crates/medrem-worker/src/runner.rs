//! Hourly runner: fires a job at the top of every hour.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use medrem_core::traits::Clock;

use crate::executor::{PeriodicJob, run_logged};

const HOUR: Duration = Duration::from_secs(3600);

/// Runs a job once per hour, aligned to the top of the hour at start.
#[derive(Debug)]
pub struct HourlyRunner {
    /// The job fired on every tick
    job: Arc<dyn PeriodicJob>,
    /// Clock used to compute the alignment delay
    clock: Arc<dyn Clock>,
    /// Upper bound for a single run of the job
    run_timeout: Duration,
}

impl HourlyRunner {
    /// Create a new hourly runner
    pub fn new(job: Arc<dyn PeriodicJob>, clock: Arc<dyn Clock>, run_timeout: Duration) -> Self {
        Self {
            job,
            clock,
            run_timeout,
        }
    }

    /// Start the runner. Runs until the cancel signal is received or its sender is dropped.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let delay = delay_until_next_hour(self.clock.now());
        tracing::info!(
            "Hourly runner for '{}' started, first run in {}s",
            self.job.name(),
            delay.as_secs()
        );

        tokio::select! {
            _ = cancelled(&mut cancel) => {
                tracing::info!("Hourly runner for '{}' stopped before first run", self.job.name());
                return;
            }
            _ = time::sleep(delay) => {}
        }

        let mut ticker = time::interval(HOUR);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancelled(&mut cancel) => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancelled(&mut cancel) => break,
                        _ = self.run_once() => {}
                    }
                }
            }
        }

        tracing::info!("Hourly runner for '{}' shut down", self.job.name());
    }

    /// Run the job once under the run timeout.
    pub async fn run_once(&self) {
        if time::timeout(self.run_timeout, run_logged(self.job.as_ref()))
            .await
            .is_err()
        {
            tracing::warn!(
                "Job '{}' exceeded {:?}, abandoned until the next tick",
                self.job.name(),
                self.run_timeout
            );
        }
    }
}

/// Time from `now` to the next whole hour. Exactly on the hour gives a full hour.
pub fn delay_until_next_hour(now: DateTime<Utc>) -> Duration {
    let into_hour = u64::from(now.minute()) * 60 + u64::from(now.second());
    let nanos = u64::from(now.nanosecond() % 1_000_000_000);
    HOUR - Duration::from_secs(into_hour) - Duration::from_nanos(nanos)
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    // An Err means the sender is gone, which is treated as shutdown.
    let _ = cancel.wait_for(|stop| *stop).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use medrem_core::traits::FixedClock;
    use serde_json::Value;

    use crate::executor::JobExecutionError;

    #[derive(Debug, Default)]
    struct CountingJob {
        runs: AtomicUsize,
        hang: bool,
    }

    #[async_trait]
    impl PeriodicJob for CountingJob {
        fn name(&self) -> &str {
            "counting"
        }

        async fn execute(&self) -> Result<Value, JobExecutionError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(Value::Null)
        }
    }

    fn clock_at(h: u32, m: u32, s: u32) -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()))
    }

    #[test]
    fn test_delay_until_next_hour() {
        let at = |h, m, s| Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap();
        assert_eq!(delay_until_next_hour(at(10, 59, 30)), Duration::from_secs(30));
        assert_eq!(delay_until_next_hour(at(10, 0, 0)), HOUR);
        assert_eq!(delay_until_next_hour(at(23, 15, 0)), Duration::from_secs(45 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_top_of_hour_then_hourly() {
        let job = Arc::new(CountingJob::default());
        let runner = HourlyRunner::new(job.clone(), clock_at(10, 59, 30), Duration::from_secs(60));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        time::sleep(Duration::from_secs(29)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        time::sleep(HOUR).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_run_does_not_stop_the_cycle() {
        let job = Arc::new(CountingJob {
            hang: true,
            ..CountingJob::default()
        });
        let runner = HourlyRunner::new(job.clone(), clock_at(8, 59, 0), Duration::from_secs(10));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        time::sleep(Duration::from_secs(61) + HOUR).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_runner() {
        let job = Arc::new(CountingJob::default());
        let runner = HourlyRunner::new(job.clone(), clock_at(8, 0, 1), Duration::from_secs(10));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });
        drop(tx);
        handle.await.unwrap();
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }
}
