use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A receipt was attempted on a transfer that is already received.
    #[error("Transfer {transfer_id} has already been received")]
    AlreadyReceived { transfer_id: DbId },

    #[error("Internal error: {0}")]
    Internal(String),
}
