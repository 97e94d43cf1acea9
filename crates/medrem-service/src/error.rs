//! Storage error concealment.

use medrem_core::error::AppError;

/// Log a storage failure in full and replace it with a generic internal error.
pub(crate) fn conceal(operation: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |err| {
        tracing::error!(operation, error = %err, source = ?err.source, "Storage operation failed");
        AppError::internal("Internal server error")
    }
}
