//! Convenience result type alias for MedRem.

use crate::error::AppError;

/// A specialized `Result` type for MedRem operations.
pub type AppResult<T> = Result<T, AppError>;
