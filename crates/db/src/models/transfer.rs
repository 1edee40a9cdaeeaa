//! Transfer entity models and DTOs.
//!
//! A transfer is one base row in `transfers` plus exactly one delivery
//! payload (`network_transfers` or `shipment_transfers`) and, for NDNP
//! subtypes, one `ndnp_transfers` row. In memory the payload is the tagged
//! [`TransferDetails`] enum.

use chrono::{NaiveDate, Utc};
use deposit_core::error::CoreError;
use deposit_core::paths;
use deposit_core::receipt::Receipt;
use deposit_core::transfer_type::{MediaType, TransferKind, TransferType};
use deposit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row from the `transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transfer {
    pub id: DbId,
    pub uuid: Uuid,
    /// Concrete subtype name. Written once at insert.
    pub transfer_type: String,
    /// Supplied list of packages in the transfer. Only a hint.
    pub package_ids: String,
    pub user_id: DbId,
    pub project_id: DbId,
    pub received: Option<Timestamp>,
    /// Account that received the transfer.
    pub received_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transfer {
    pub fn transfer_type(&self) -> Result<TransferType, CoreError> {
        self.transfer_type.parse()
    }

    pub fn receipt(&self) -> Receipt {
        Receipt {
            received: self.received,
            received_by: self.received_by,
        }
    }

    pub fn is_received(&self) -> bool {
        self.received.is_some()
    }

    /// Mark this transfer received by `account_id` now.
    ///
    /// Only the in-memory record changes; persist it with
    /// [`TransferRepo::save_receipt`](crate::repositories::TransferRepo::save_receipt).
    pub fn update_received(&mut self, account_id: DbId) -> Result<(), CoreError> {
        self.update_received_at(account_id, Utc::now())
    }

    /// Mark this transfer received by `account_id` at `at`.
    ///
    /// Fails with [`CoreError::AlreadyReceived`] if a receipt is already
    /// recorded, whatever the arguments.
    pub fn update_received_at(
        &mut self,
        account_id: DbId,
        at: Timestamp,
    ) -> Result<(), CoreError> {
        let mut receipt = self.receipt();
        receipt.record(self.id, account_id, at)?;
        self.received = receipt.received;
        self.received_by = receipt.received_by;
        Ok(())
    }

    pub fn url(&self) -> String {
        paths::transfer_path(self.id)
    }

    pub fn package_id_list(&self) -> Vec<&str> {
        deposit_core::package::parse_package_ids(&self.package_ids)
    }
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.transfer_type, self.id)
    }
}

/// A row from the `network_transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NetworkDetails {
    pub transfer_id: DbId,
    /// URL from which the package is to be retrieved.
    pub location: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Estimated size of the complete package in GB.
    pub estimated_size: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `shipment_transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShipmentDetails {
    pub transfer_id: DbId,
    pub ship_date: NaiveDate,
    pub ship_method: String,
    pub ship_tracking_number: String,
    pub media_type: String,
    pub media_identifiers: Option<String>,
    pub number_media_shipped: i32,
    pub addl_equipment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ShipmentDetails {
    pub fn media_type(&self) -> Result<MediaType, CoreError> {
        self.media_type.parse()
    }
}

/// A row from the `ndnp_transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NdnpDetails {
    pub transfer_id: DbId,
    /// Normalized LCCNs, comma separated.
    pub lccns: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NdnpDetails {
    pub fn lccn_list(&self) -> Vec<&str> {
        self.lccns
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Delivery payload of a transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferDetails {
    Network {
        network: NetworkDetails,
        ndnp: Option<NdnpDetails>,
    },
    Shipment {
        shipment: ShipmentDetails,
        ndnp: Option<NdnpDetails>,
    },
}

impl TransferDetails {
    pub fn kind(&self) -> TransferKind {
        match self {
            Self::Network { .. } => TransferKind::Network,
            Self::Shipment { .. } => TransferKind::Shipment,
        }
    }

    pub fn ndnp(&self) -> Option<&NdnpDetails> {
        match self {
            Self::Network { ndnp, .. } | Self::Shipment { ndnp, .. } => ndnp.as_ref(),
        }
    }

    pub fn transfer_type(&self) -> TransferType {
        TransferType::from_parts(self.kind(), self.ndnp().is_some())
    }
}

/// A transfer together with its delivery payload.
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecord {
    #[serde(flatten)]
    pub transfer: Transfer,
    pub details: TransferDetails,
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a transfer of any subtype.
///
/// The stored `transfer_type` is derived from `details`; callers never set
/// it directly.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransfer {
    #[validate(length(max = 255))]
    pub package_ids: String,
    pub user_id: DbId,
    pub project_id: DbId,
    pub details: NewTransferDetails,
}

impl CreateTransfer {
    pub fn transfer_type(&self) -> TransferType {
        self.details.transfer_type()
    }
}

/// Delivery payload for a new transfer.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewTransferDetails {
    Network {
        network: CreateNetworkDetails,
        ndnp: Option<CreateNdnp>,
    },
    Shipment {
        shipment: CreateShipmentDetails,
        ndnp: Option<CreateNdnp>,
    },
}

impl NewTransferDetails {
    pub fn kind(&self) -> TransferKind {
        match self {
            Self::Network { .. } => TransferKind::Network,
            Self::Shipment { .. } => TransferKind::Shipment,
        }
    }

    pub fn ndnp(&self) -> Option<&CreateNdnp> {
        match self {
            Self::Network { ndnp, .. } | Self::Shipment { ndnp, .. } => ndnp.as_ref(),
        }
    }

    pub fn transfer_type(&self) -> TransferType {
        TransferType::from_parts(self.kind(), self.ndnp().is_some())
    }
}

impl Validate for NewTransferDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Network { network, .. } => network.validate()?,
            Self::Shipment { shipment, .. } => shipment.validate()?,
        }
        match self.ndnp() {
            Some(ndnp) => ndnp.validate(),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNetworkDetails {
    #[validate(url)]
    pub location: String,
    #[validate(length(max = 100))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub password: Option<String>,
    #[validate(range(min = 0))]
    pub estimated_size: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShipmentDetails {
    pub ship_date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub ship_method: String,
    #[validate(length(max = 150))]
    pub ship_tracking_number: String,
    pub media_type: MediaType,
    #[validate(length(max = 255))]
    pub media_identifiers: Option<String>,
    #[validate(range(min = 1))]
    pub number_media_shipped: i32,
    #[validate(length(max = 255))]
    pub addl_equipment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNdnp {
    /// Raw LCCN list separated by commas, semicolons or newlines. The
    /// normalized form is checked against the same limit before storage.
    #[validate(length(min = 1, max = 255))]
    pub lccns: String,
}

// ---------------------------------------------------------------------------
// Update DTOs
// ---------------------------------------------------------------------------

/// DTO for updating the base transfer row. Subtype and receipt are not
/// editable here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransfer {
    #[validate(length(max = 255))]
    pub package_ids: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateNetworkDetails {
    #[validate(url)]
    pub location: Option<String>,
    #[validate(length(max = 100))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub password: Option<String>,
    #[validate(range(min = 0))]
    pub estimated_size: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateShipmentDetails {
    pub ship_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub ship_method: Option<String>,
    #[validate(length(max = 150))]
    pub ship_tracking_number: Option<String>,
    pub media_type: Option<MediaType>,
    #[validate(length(max = 255))]
    pub media_identifiers: Option<String>,
    #[validate(range(min = 1))]
    pub number_media_shipped: Option<i32>,
    #[validate(length(max = 255))]
    pub addl_equipment: Option<String>,
}
