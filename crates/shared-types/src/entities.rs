//! # Core Domain Entities
//!
//! Defines the identifiers and enumerations shared by every Harvest-Chain crate.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `ProductId`
//! - **Time**: `Timestamp`
//! - **Lifecycle**: `Stage`, `StakeholderKind`
//! - **Provenance**: `Certification`

use crate::errors::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte stakeholder address.
///
/// All stakeholder fields (farmer, owner, inspector) use this type.
pub type Address = [u8; 20];

/// The all-zero address. Never a valid counterparty.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Dense, sequential product identifier. Allocation starts at 1.
pub type ProductId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Returns true if the address is the zero ("null") address.
#[must_use]
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Short hex rendering used in log fields: first four bytes.
#[must_use]
pub fn short_address(address: &Address) -> String {
    format!("0x{}", hex::encode(&address[..4]))
}

// =============================================================================
// CLUSTER B: LIFECYCLE
// =============================================================================

/// Position of a product batch in the supply chain.
///
/// The derive order is the business order: `Planted < Growing < ... < SoldOut`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Stage {
    #[default]
    Planted,
    Growing,
    Harvested,
    Processed,
    PackedAtFarm,
    ShippedToDistributor,
    ReceivedByDistributor,
    ShippedToRetailer,
    ReceivedByRetailer,
    AvailableForSale,
    SoldOut,
}

impl Stage {
    /// Every stage in ascending order.
    pub const ALL: [Stage; 11] = [
        Stage::Planted,
        Stage::Growing,
        Stage::Harvested,
        Stage::Processed,
        Stage::PackedAtFarm,
        Stage::ShippedToDistributor,
        Stage::ReceivedByDistributor,
        Stage::ShippedToRetailer,
        Stage::ReceivedByRetailer,
        Stage::AvailableForSale,
        Stage::SoldOut,
    ];

    /// Ordinal of the stage (0 for `Planted`).
    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Planted => "Planted",
            Self::Growing => "Growing",
            Self::Harvested => "Harvested",
            Self::Processed => "Processed",
            Self::PackedAtFarm => "Packed at farm",
            Self::ShippedToDistributor => "Shipped to distributor",
            Self::ReceivedByDistributor => "Received by distributor",
            Self::ShippedToRetailer => "Shipped to retailer",
            Self::ReceivedByRetailer => "Received by retailer",
            Self::AvailableForSale => "Available for sale",
            Self::SoldOut => "Sold out",
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = ConversionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(ConversionError::UnknownStage(value))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role of a stakeholder as recorded by the registry.
///
/// Sourced once per call from the registry; never re-derived from strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StakeholderKind {
    #[default]
    Unregistered,
    Farmer,
    Distributor,
    Retailer,
    Inspector,
}

impl StakeholderKind {
    /// Returns true for parties that can hold custody of a product.
    #[must_use]
    pub fn can_hold_custody(self) -> bool {
        matches!(self, Self::Farmer | Self::Distributor | Self::Retailer)
    }
}

impl fmt::Display for StakeholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unregistered => "unregistered",
            Self::Farmer => "farmer",
            Self::Distributor => "distributor",
            Self::Retailer => "retailer",
            Self::Inspector => "inspector",
        };
        f.write_str(s)
    }
}

// =============================================================================
// CLUSTER C: PROVENANCE
// =============================================================================

/// A certification carried by a product batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Certification {
    Organic,
    FairTrade,
    NonGmo,
    GlobalGap,
    RainforestAlliance,
    Other(String),
}

impl Certification {
    /// Returns true for the organic certification.
    #[must_use]
    pub fn is_organic(&self) -> bool {
        matches!(self, Self::Organic)
    }
}
