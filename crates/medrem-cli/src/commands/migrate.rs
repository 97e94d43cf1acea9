//! Database migration command.

use crate::output;
use medrem_core::error::AppError;

use super::Context;

/// Run all pending migrations
pub async fn execute(ctx: &Context) -> Result<(), AppError> {
    println!("Running database migrations...");
    medrem_database::migration::run_migrations(ctx.pool.pool()).await?;
    output::print_success("All migrations applied successfully.");
    Ok(())
}
