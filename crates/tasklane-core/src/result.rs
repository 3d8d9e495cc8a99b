//! Convenience result type alias for Tasklane.

use crate::error::AppError;

/// A specialized `Result` type for Tasklane operations.
pub type AppResult<T> = Result<T, AppError>;
