//! CLI command definitions and dispatch.

pub mod device;
pub mod history;
pub mod medication;
pub mod migrate;
pub mod worker;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use medrem_core::config::AppConfig;
use medrem_core::error::AppError;
use medrem_core::traits::{Clock, SystemClock};
use medrem_database::DatabasePool;
use medrem_database::repositories::{
    DeviceTokenRepository, MedicationHistoryRepository, MedicationRepository,
};
use medrem_service::{DeviceTokenService, MedicationHistoryService, MedicationService};

/// MedRem medication reminder administration
#[derive(Debug, Parser)]
#[command(name = "medrem", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Configuration overlay to apply
    #[arg(short, long, env = "MEDREM_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Medication management
    Medication(medication::MedicationArgs),
    /// Dose history
    History(history::HistoryArgs),
    /// Device push tokens
    Device(device::DeviceArgs),
    /// Reminder worker
    Worker(worker::WorkerArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;
        let ctx = Context::connect(config).await?;

        let result = match &self.command {
            Commands::Migrate => migrate::execute(&ctx).await,
            Commands::Medication(args) => medication::execute(args, &ctx, self.format).await,
            Commands::History(args) => history::execute(args, &ctx, self.format).await,
            Commands::Device(args) => device::execute(args, &ctx, self.format).await,
            Commands::Worker(args) => worker::execute(args, &ctx).await,
        };

        ctx.pool.close().await;
        result
    }
}

/// Everything a command needs: configuration, the pool, and the services.
#[derive(Debug)]
pub struct Context {
    /// Loaded configuration
    pub config: AppConfig,
    /// Database pool
    pub pool: DatabasePool,
    /// Shared clock
    pub clock: Arc<dyn Clock>,
    /// Medication service
    pub medications: MedicationService,
    /// Dose history service
    pub histories: MedicationHistoryService,
    /// Device token service
    pub devices: DeviceTokenService,
}

impl Context {
    /// Connect to the database and build the services.
    async fn connect(config: AppConfig) -> Result<Self, AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let medications = MedicationService::new(
            Arc::new(MedicationRepository::new(pool.pool().clone())),
            Arc::clone(&clock),
        )
        .with_due_window(config.scheduler.due_window());
        let histories = MedicationHistoryService::new(
            Arc::new(MedicationHistoryRepository::new(pool.pool().clone())),
            Arc::clone(&clock),
        );
        let devices = DeviceTokenService::new(
            Arc::new(DeviceTokenRepository::new(pool.pool().clone())),
            Arc::clone(&clock),
        );

        Ok(Self {
            config,
            pool,
            clock,
            medications,
            histories,
            devices,
        })
    }
}
