//! Reminder worker CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use tokio::sync::watch;

use crate::output;
use medrem_core::error::AppError;
use medrem_worker::{DoseReminderJob, HourlyRunner, PeriodicJob};

use super::Context;

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Run one dose reminder sweep now
    Sweep,
    /// Run the hourly reminder loop until Ctrl+C
    Run,
}

/// Execute worker commands
pub async fn execute(args: &WorkerArgs, ctx: &Context) -> Result<(), AppError> {
    let sender = medrem_push::build_sender(&ctx.config.push)?;
    let job = Arc::new(DoseReminderJob::new(
        ctx.medications.clone(),
        ctx.histories.clone(),
        ctx.devices.clone(),
        sender,
        &ctx.config.scheduler,
        &ctx.config.push,
    ));

    match &args.command {
        WorkerCommand::Sweep => {
            let summary = job
                .execute()
                .await
                .map_err(|e| AppError::internal(format!("Sweep failed: {}", e)))?;
            println!("Dose reminder sweep:");
            if let Some(fields) = summary.as_object() {
                for (key, value) in fields {
                    output::print_kv(key, &value.to_string());
                }
            }
        }
        WorkerCommand::Run => {
            let runner = HourlyRunner::new(
                job,
                Arc::clone(&ctx.clock),
                ctx.config.scheduler.sweep_timeout(),
            );
            let (cancel_tx, cancel_rx) = watch::channel(false);
            let handle = tokio::spawn(async move { runner.run(cancel_rx).await });

            tokio::signal::ctrl_c()
                .await
                .map_err(|e| AppError::internal(format!("Failed to listen for Ctrl+C: {}", e)))?;
            let _ = cancel_tx.send(true);
            handle
                .await
                .map_err(|e| AppError::internal(format!("Worker task failed: {}", e)))?;
            output::print_success("Worker stopped");
        }
    }

    Ok(())
}
