//! Medication management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use medrem_core::error::AppError;
use medrem_core::types::{MedicationId, UserId};
use medrem_service::RequestContext;
use medrem_service::medication::{
    CreateMedicationRequest, MedicationResponse, UpdateMedicationRequest,
};

use super::Context;

/// Arguments for medication commands
#[derive(Debug, Args)]
pub struct MedicationArgs {
    /// Medication subcommand
    #[command(subcommand)]
    pub command: MedicationCommand,
}

/// Medication subcommands
#[derive(Debug, Subcommand)]
pub enum MedicationCommand {
    /// Create a medication
    Add {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
        /// Medication name
        #[arg(long)]
        name: String,
        /// Quantity per dose
        #[arg(long)]
        dosage: i32,
        /// Hours between doses
        #[arg(long)]
        interval: i32,
        /// First day of the course (RFC 3339)
        #[arg(long)]
        start_date: String,
        /// Time of the first dose (RFC 3339)
        #[arg(long)]
        start_time: String,
        /// Last day of the course (RFC 3339)
        #[arg(long)]
        stop_date: String,
        /// Course length in days
        #[arg(long)]
        duration: i32,
        /// Why the medication is taken
        #[arg(long, default_value = "")]
        purpose: String,
        /// Icon category
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Edit a medication
    Update {
        /// Medication ID
        id: MedicationId,
        /// Owning user ID
        #[arg(long)]
        user: UserId,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New quantity per dose
        #[arg(long)]
        dosage: Option<i32>,
        /// New interval in hours
        #[arg(long)]
        interval: Option<i32>,
        /// New first day (RFC 3339)
        #[arg(long)]
        start_date: Option<String>,
        /// New first dose time (RFC 3339)
        #[arg(long)]
        start_time: Option<String>,
        /// New last day (RFC 3339)
        #[arg(long)]
        stop_date: Option<String>,
        /// New course length in days
        #[arg(long)]
        duration: Option<i32>,
        /// New purpose
        #[arg(long)]
        purpose: Option<String>,
        /// New icon category
        #[arg(long)]
        icon: Option<String>,
        /// Mark the course complete (true) or reopen it (false)
        #[arg(long)]
        complete: Option<bool>,
    },
    /// Show one medication
    Show {
        /// Medication ID
        id: MedicationId,
        /// Owning user ID
        #[arg(long)]
        user: UserId,
    },
    /// List a user's medications
    List {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
    },
    /// List a user's medications due now or within the due window
    Next {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
    },
    /// Delete a medication (its dose history is kept)
    Delete {
        /// Medication ID
        id: MedicationId,
        /// Owning user ID
        #[arg(long)]
        user: UserId,
    },
}

/// Medication display row for table output
#[derive(Debug, Serialize, Tabled)]
struct MedicationRow {
    /// Medication ID
    id: String,
    /// Name
    name: String,
    /// Dosage
    dosage: i32,
    /// Interval (hours)
    interval: i32,
    /// Next dose
    next_dose: String,
    /// Stop date
    stop_date: String,
    /// Completed
    complete: bool,
}

impl From<&MedicationResponse> for MedicationRow {
    fn from(m: &MedicationResponse) -> Self {
        Self {
            id: m.id.to_string(),
            name: m.name.clone(),
            dosage: m.dosage,
            interval: m.time_interval,
            next_dose: m.next_dosage_time.clone(),
            stop_date: m.stop_date.clone(),
            complete: m.is_medication_course_complete,
        }
    }
}

fn print_medications(items: &[MedicationResponse], format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_list_json(items),
        OutputFormat::Table => {
            let rows: Vec<MedicationRow> = items.iter().map(MedicationRow::from).collect();
            output::print_list(&rows, format);
        }
    }
}

/// Execute medication commands
pub async fn execute(
    args: &MedicationArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        MedicationCommand::Add {
            user,
            name,
            dosage,
            interval,
            start_date,
            start_time,
            stop_date,
            duration,
            purpose,
            icon,
        } => {
            let req = CreateMedicationRequest {
                name: name.clone(),
                dosage: *dosage,
                time_interval: *interval,
                start_date: start_date.clone(),
                start_time: start_time.clone(),
                stop_date: stop_date.clone(),
                duration: *duration,
                purpose: purpose.clone(),
                icon: icon.clone(),
            };
            let created = ctx
                .medications
                .create(&RequestContext::new(*user), req)
                .await?;
            output::print_success(&format!(
                "Medication '{}' created, next dose at {}",
                created.name, created.next_dosage_time
            ));
            print_medications(std::slice::from_ref(&created), format);
        }
        MedicationCommand::Update {
            id,
            user,
            name,
            dosage,
            interval,
            start_date,
            start_time,
            stop_date,
            duration,
            purpose,
            icon,
            complete,
        } => {
            let req = UpdateMedicationRequest {
                name: name.clone(),
                dosage: *dosage,
                time_interval: *interval,
                start_date: start_date.clone(),
                start_time: start_time.clone(),
                stop_date: stop_date.clone(),
                duration: *duration,
                purpose: purpose.clone(),
                icon: icon.clone(),
                is_medication_course_complete: *complete,
            };
            let updated = ctx
                .medications
                .update(&RequestContext::new(*user), *id, req)
                .await?;
            output::print_success(&format!("Medication '{}' updated", updated.name));
            print_medications(std::slice::from_ref(&updated), format);
        }
        MedicationCommand::Show { id, user } => {
            let medication = ctx
                .medications
                .get_detail(&RequestContext::new(*user), *id)
                .await?;
            match format {
                OutputFormat::Json => output::print_list_json(std::slice::from_ref(&medication)),
                OutputFormat::Table => {
                    output::print_kv("ID", &medication.id.to_string());
                    output::print_kv("Name", &medication.name);
                    output::print_kv("Dosage", &medication.dosage.to_string());
                    output::print_kv("Interval (hours)", &medication.time_interval.to_string());
                    output::print_kv("Start date", &medication.start_date);
                    output::print_kv("Start time", &medication.start_time);
                    output::print_kv("Stop date", &medication.stop_date);
                    output::print_kv("Duration (days)", &medication.duration.to_string());
                    output::print_kv("Purpose", &medication.purpose);
                    output::print_kv("Icon", &medication.icon);
                    output::print_kv(
                        "Course complete",
                        &medication.is_medication_course_complete.to_string(),
                    );
                    output::print_kv("Next dose", &medication.next_dosage_time);
                }
            }
        }
        MedicationCommand::List { user } => {
            let items = ctx.medications.get_all(&RequestContext::new(*user)).await?;
            print_medications(&items, format);
        }
        MedicationCommand::Next { user } => {
            let items = ctx.medications.get_next(&RequestContext::new(*user)).await?;
            print_medications(&items, format);
        }
        MedicationCommand::Delete { id, user } => {
            ctx.medications
                .delete(&RequestContext::new(*user), *id)
                .await?;
            output::print_success(&format!("Medication {} deleted", id));
        }
    }

    Ok(())
}
