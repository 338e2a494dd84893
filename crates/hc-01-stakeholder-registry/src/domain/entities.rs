//! Stakeholder records

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, ProductId, StakeholderKind, Timestamp};

/// Reputation assigned at registration.
pub const DEFAULT_REPUTATION: u8 = 50;

/// Upper bound of the reputation scale.
pub const MAX_REPUTATION: u8 = 100;

/// A registered supply-chain participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub address: Address,
    pub kind: StakeholderKind,
    pub name: String,
    /// Registered location; snapshotted into products a farmer creates.
    pub location: String,
    pub verified: bool,
    pub reputation: u8,
    pub registered_at: Timestamp,
    /// Products this stakeholder created or received, in order.
    pub products: Vec<ProductId>,
}

impl Stakeholder {
    pub fn new(
        address: Address,
        kind: StakeholderKind,
        name: impl Into<String>,
        location: impl Into<String>,
        registered_at: Timestamp,
    ) -> Self {
        Self {
            address,
            kind,
            name: name.into(),
            location: location.into(),
            verified: false,
            reputation: DEFAULT_REPUTATION,
            registered_at,
            products: Vec::new(),
        }
    }

    /// The read model handed to the lifecycle engine.
    pub fn profile(&self) -> StakeholderProfile {
        StakeholderProfile {
            kind: self.kind,
            verified: self.verified,
            reputation: self.reputation,
            location: self.location.clone(),
        }
    }
}

/// Everything the lifecycle engine needs to know about a party, fetched in
/// one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StakeholderProfile {
    pub kind: StakeholderKind,
    pub verified: bool,
    pub reputation: u8,
    pub location: String,
}

impl StakeholderProfile {
    /// Profile of an address the registry has never seen.
    pub fn unregistered() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.kind != StakeholderKind::Unregistered
    }

    /// Verified and at or above `threshold`.
    pub fn meets(&self, threshold: u8) -> bool {
        self.verified && self.reputation >= threshold
    }
}
