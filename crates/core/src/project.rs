//! Project transfer-type choices.
//!
//! A project may pick one network transfer type and one shipment transfer
//! type. Either may be left unset.

use crate::error::CoreError;
use crate::transfer_type::{TransferType, NETWORK_CHOICES, SHIPMENT_CHOICES};

/// Validate that `choice` is a network transfer type.
pub fn validate_network_choice(choice: TransferType) -> Result<(), CoreError> {
    validate_choice(choice, NETWORK_CHOICES, "network_transfer_type")
}

/// Validate that `choice` is a shipment transfer type.
pub fn validate_shipment_choice(choice: TransferType) -> Result<(), CoreError> {
    validate_choice(choice, SHIPMENT_CHOICES, "shipment_transfer_type")
}

fn validate_choice(
    choice: TransferType,
    allowed: &[TransferType],
    field: &str,
) -> Result<(), CoreError> {
    if allowed.contains(&choice) {
        Ok(())
    } else {
        let names: Vec<&str> = allowed.iter().map(TransferType::as_str).collect();
        Err(CoreError::Validation(format!(
            "Invalid {field} '{choice}'. Must be one of: {}",
            names.join(", ")
        )))
    }
}

/// Transfer types a project has enabled, network first.
pub fn allowed_transfer_types(
    network: Option<TransferType>,
    shipment: Option<TransferType>,
) -> Vec<TransferType> {
    network.into_iter().chain(shipment).collect()
}
