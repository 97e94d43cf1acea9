//! Device push token CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use medrem_core::error::AppError;
use medrem_core::types::UserId;
use medrem_service::RequestContext;

use super::Context;

/// Arguments for device commands
#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device subcommand
    #[command(subcommand)]
    pub command: DeviceCommand,
}

/// Device subcommands
#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Register a push token
    Add {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
        /// Provider token
        token: String,
    },
    /// Remove a push token
    Remove {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
        /// Provider token
        token: String,
    },
    /// List a user's push tokens
    List {
        /// Owning user ID
        #[arg(long)]
        user: UserId,
    },
}

/// Device token display row for table output
#[derive(Debug, Serialize, Tabled)]
struct DeviceRow {
    /// Record ID
    id: String,
    /// Token
    token: String,
    /// Registered at
    registered_at: String,
}

/// Execute device commands
pub async fn execute(
    args: &DeviceArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        DeviceCommand::Add { user, token } => {
            let stored = ctx
                .devices
                .register(&RequestContext::new(*user), token)
                .await?;
            output::print_success(&format!("Device token registered ({})", stored.id));
        }
        DeviceCommand::Remove { user, token } => {
            ctx.devices
                .unregister(&RequestContext::new(*user), token)
                .await?;
            output::print_success("Device token removed");
        }
        DeviceCommand::List { user } => {
            let tokens = ctx.devices.list(&RequestContext::new(*user)).await?;
            let rows: Vec<DeviceRow> = tokens
                .iter()
                .map(|t| DeviceRow {
                    id: t.id.to_string(),
                    token: t.token.clone(),
                    registered_at: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
