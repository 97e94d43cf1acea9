//! Dose history CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use medrem_core::error::AppError;
use medrem_core::types::{MedicationHistoryId, UserId};
use medrem_service::RequestContext;
use medrem_service::history::MedicationHistoryResponse;

use super::Context;

/// Arguments for history commands
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// History subcommand
    #[command(subcommand)]
    pub command: HistoryCommand,
}

/// History subcommands
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List a user's dose history, newest first
    List {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
    },
    /// Record whether a dose was taken
    Confirm {
        /// History entry ID
        id: MedicationHistoryId,
        /// Owning user ID
        #[arg(long)]
        user: UserId,
        /// Mark the dose taken; without this flag it is marked missed
        #[arg(long)]
        taken: bool,
    },
}

/// History display row for table output
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    /// Entry ID
    id: String,
    /// Medication name
    medication: String,
    /// Dosage
    dosage: i32,
    /// Scheduled dose time
    dose_time: String,
    /// Taken
    taken: bool,
    /// Missed (YES/NO/blank)
    missed: String,
}

impl From<&MedicationHistoryResponse> for HistoryRow {
    fn from(h: &MedicationHistoryResponse) -> Self {
        Self {
            id: h.id.to_string(),
            medication: h.medication_name.clone(),
            dosage: h.dosage,
            dose_time: h.dosage_time.clone(),
            taken: h.has_medication_been_taken,
            missed: h.was_medication_missed.to_string(),
        }
    }
}

/// Execute history commands
pub async fn execute(
    args: &HistoryArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        HistoryCommand::List { user } => {
            let entries = ctx
                .histories
                .get_all_by_user(&RequestContext::new(*user))
                .await?;
            match format {
                OutputFormat::Json => output::print_list_json(&entries),
                OutputFormat::Table => {
                    let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        HistoryCommand::Confirm { id, user, taken } => {
            ctx.histories
                .update_medication_history(&RequestContext::new(*user), *id, *taken)
                .await?;
            let outcome = if *taken { "taken" } else { "missed" };
            output::print_success(&format!("Dose {} marked as {}", id, outcome));
        }
    }

    Ok(())
}
