//! Convenience result type alias for TreeTag.

use crate::error::AppError;

/// A specialized `Result` type for TreeTag operations.
pub type AppResult<T> = Result<T, AppError>;
