//! One-time receipt of a transfer.
//!
//! A transfer's `received` and `received_by` fields move together from
//! unset to set exactly once.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// The receipt fields of a transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Receipt {
    pub received: Option<Timestamp>,
    pub received_by: Option<DbId>,
}

impl Receipt {
    pub fn is_received(&self) -> bool {
        self.received.is_some()
    }

    /// Mark received by `account_id` at `at`.
    ///
    /// Fails with [`CoreError::AlreadyReceived`] and leaves both fields
    /// untouched if the receipt was already recorded.
    pub fn record(
        &mut self,
        transfer_id: DbId,
        account_id: DbId,
        at: Timestamp,
    ) -> Result<(), CoreError> {
        can_receive(transfer_id, self.received)?;
        self.received_by = Some(account_id);
        self.received = Some(at);
        Ok(())
    }
}

/// Validate that a transfer can still be received.
pub fn can_receive(transfer_id: DbId, received: Option<Timestamp>) -> Result<(), CoreError> {
    if received.is_some() {
        return Err(CoreError::AlreadyReceived { transfer_id });
    }
    Ok(())
}
