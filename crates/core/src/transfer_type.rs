//! Transfer subtypes and shipment media types.
//!
//! The `transfer_type` column stores [`TransferType::as_str`], which is the
//! concrete subtype name. The value is chosen once when a transfer is
//! created and never rewritten.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Transfer type
// ---------------------------------------------------------------------------

/// How a transfer's content reaches the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Retrieved from a URL.
    Network,
    /// Delivered on physical media.
    Shipment,
}

/// Concrete transfer subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferType {
    NetworkTransfer,
    ShipmentTransfer,
    NdnpNetworkTransfer,
    NdnpShipmentTransfer,
}

/// Transfer types a project may select for network delivery.
pub const NETWORK_CHOICES: &[TransferType] = &[
    TransferType::NetworkTransfer,
    TransferType::NdnpNetworkTransfer,
];

/// Transfer types a project may select for shipment delivery.
pub const SHIPMENT_CHOICES: &[TransferType] = &[
    TransferType::ShipmentTransfer,
    TransferType::NdnpShipmentTransfer,
];

impl TransferType {
    /// All subtypes, in declaration order.
    pub const ALL: [TransferType; 4] = [
        Self::NetworkTransfer,
        Self::ShipmentTransfer,
        Self::NdnpNetworkTransfer,
        Self::NdnpShipmentTransfer,
    ];

    /// Build the subtype for a delivery kind, with or without NDNP metadata.
    pub fn from_parts(kind: TransferKind, ndnp: bool) -> Self {
        match (kind, ndnp) {
            (TransferKind::Network, false) => Self::NetworkTransfer,
            (TransferKind::Network, true) => Self::NdnpNetworkTransfer,
            (TransferKind::Shipment, false) => Self::ShipmentTransfer,
            (TransferKind::Shipment, true) => Self::NdnpShipmentTransfer,
        }
    }

    /// The stored subtype name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkTransfer => "NetworkTransfer",
            Self::ShipmentTransfer => "ShipmentTransfer",
            Self::NdnpNetworkTransfer => "NdnpNetworkTransfer",
            Self::NdnpShipmentTransfer => "NdnpShipmentTransfer",
        }
    }

    /// Human-readable choice label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NetworkTransfer => "network transfer",
            Self::ShipmentTransfer => "shipment transfer",
            Self::NdnpNetworkTransfer => "ndnp network transfer",
            Self::NdnpShipmentTransfer => "ndnp shipment transfer",
        }
    }

    pub fn kind(&self) -> TransferKind {
        match self {
            Self::NetworkTransfer | Self::NdnpNetworkTransfer => TransferKind::Network,
            Self::ShipmentTransfer | Self::NdnpShipmentTransfer => TransferKind::Shipment,
        }
    }

    /// Whether the subtype carries NDNP (LCCN) metadata.
    pub fn is_ndnp(&self) -> bool {
        matches!(self, Self::NdnpNetworkTransfer | Self::NdnpShipmentTransfer)
    }
}

impl std::fmt::Display for TransferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown transfer type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Media type
// ---------------------------------------------------------------------------

/// Physical media a shipment arrives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    ExternalHarddrive,
    Dvd,
    Cd,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [Self::ExternalHarddrive, Self::Dvd, Self::Cd];

    /// The stored media code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExternalHarddrive => "EXTERNAL_HARDDRIVE",
            Self::Dvd => "DVD",
            Self::Cd => "CD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExternalHarddrive => "hard drive",
            Self::Dvd => "dvd",
            Self::Cd => "cd",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown media type '{s}'")))
    }
}
