//! MedRem Server: medication reminder backend
//!
//! Wires the crates together and runs the background scheduling until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use medrem_core::config::AppConfig;
use medrem_core::error::AppError;
use medrem_core::traits::{Clock, SystemClock};
use medrem_database::repositories::{
    DeviceTokenRepository, MedicationHistoryRepository, MedicationRepository,
};
use medrem_service::{DeviceTokenService, MedicationHistoryService, MedicationService};
use medrem_worker::{CourseRetirementJob, CronScheduler, DoseReminderJob, HourlyRunner};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_dir = std::env::var("MEDREM_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("MEDREM_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&config_dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting MedRem v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = medrem_database::DatabasePool::connect(&config.database).await?;
    medrem_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Stores and services ──────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let medication_service = MedicationService::new(
        Arc::new(MedicationRepository::new(db.pool().clone())),
        Arc::clone(&clock),
    )
    .with_due_window(config.scheduler.due_window());
    let history_service = MedicationHistoryService::new(
        Arc::new(MedicationHistoryRepository::new(db.pool().clone())),
        Arc::clone(&clock),
    );
    let device_service = DeviceTokenService::new(
        Arc::new(DeviceTokenRepository::new(db.pool().clone())),
        Arc::clone(&clock),
    );

    // ── Step 3: Push sender ──────────────────────────────────────
    let sender = medrem_push::build_sender(&config.push)?;
    tracing::info!("Push provider: {}", sender.name());

    // ── Step 4: Shutdown signal channel ──────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 5: Reminder runner + cron scheduler ─────────────────
    let mut scheduler = None;
    let runner_handle = if config.scheduler.enabled {
        let reminder_job = Arc::new(DoseReminderJob::new(
            medication_service.clone(),
            history_service,
            device_service,
            sender,
            &config.scheduler,
            &config.push,
        ));
        let runner = HourlyRunner::new(
            reminder_job,
            Arc::clone(&clock),
            config.scheduler.sweep_timeout(),
        );

        let cron = CronScheduler::new().await?;
        cron.register(
            &config.scheduler.retirement_cron,
            Arc::new(CourseRetirementJob::new(medication_service)),
        )
        .await?;
        cron.start().await?;
        scheduler = Some(cron);

        let cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(cancel).await;
        });

        tracing::info!(
            "Scheduler started (concurrency={}, notify timeout={}s)",
            config.scheduler.concurrency,
            config.scheduler.dispatch_timeout_seconds
        );
        Some(handle)
    } else {
        tracing::info!("Scheduler disabled");
        None
    };

    // ── Step 6: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = runner_handle {
        let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
    }
    if let Some(mut cron) = scheduler {
        if let Err(e) = cron.shutdown().await {
            tracing::warn!("Cron scheduler shutdown failed: {}", e);
        }
    }

    db.close().await;
    tracing::info!("MedRem server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
