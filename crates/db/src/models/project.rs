//! Project entity model and DTOs.

use deposit_core::error::CoreError;
use deposit_core::paths;
use deposit_core::project as rules;
use deposit_core::transfer_type::TransferType;
use deposit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub shipping_address: String,
    /// Policy for marking a transfer as received.
    pub received_policy: String,
    pub network_transfer_type: Option<String>,
    pub shipment_transfer_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn url(&self) -> String {
        paths::project_path(self.id)
    }

    pub fn network_choice(&self) -> Result<Option<TransferType>, CoreError> {
        self.network_transfer_type.as_deref().map(str::parse::<TransferType>).transpose()
    }

    pub fn shipment_choice(&self) -> Result<Option<TransferType>, CoreError> {
        self.shipment_transfer_type.as_deref().map(str::parse::<TransferType>).transpose()
    }

    /// Transfer types this project has enabled.
    pub fn allowed_transfer_types(&self) -> Result<Vec<TransferType>, CoreError> {
        Ok(rules::allowed_transfer_types(
            self.network_choice()?,
            self.shipment_choice()?,
        ))
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub contact_name: String,
    #[validate(length(max = 10))]
    pub contact_phone: String,
    #[validate(email)]
    pub contact_email: String,
    #[validate(length(max = 255))]
    pub shipping_address: String,
    pub received_policy: String,
    pub network_transfer_type: Option<TransferType>,
    pub shipment_transfer_type: Option<TransferType>,
}

impl CreateProject {
    /// Check each transfer-type choice against its delivery kind.
    pub fn validate_choices(&self) -> Result<(), CoreError> {
        validate_choices(self.network_transfer_type, self.shipment_transfer_type)
    }
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub contact_name: Option<String>,
    #[validate(length(max = 10))]
    pub contact_phone: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 255))]
    pub shipping_address: Option<String>,
    pub received_policy: Option<String>,
    pub network_transfer_type: Option<TransferType>,
    pub shipment_transfer_type: Option<TransferType>,
}

impl UpdateProject {
    pub fn validate_choices(&self) -> Result<(), CoreError> {
        validate_choices(self.network_transfer_type, self.shipment_transfer_type)
    }
}

fn validate_choices(
    network: Option<TransferType>,
    shipment: Option<TransferType>,
) -> Result<(), CoreError> {
    if let Some(choice) = network {
        rules::validate_network_choice(choice)?;
    }
    if let Some(choice) = shipment {
        rules::validate_shipment_choice(choice)?;
    }
    Ok(())
}
