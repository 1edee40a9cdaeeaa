use deposit_core::error::CoreError;

/// Error type for repository operations that validate input or enforce a
/// domain rule.
///
/// Plain reads return `sqlx::Error` directly.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A domain-level error from `deposit_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Field-level validation failures on an input DTO.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
