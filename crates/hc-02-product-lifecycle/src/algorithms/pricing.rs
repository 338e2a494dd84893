//! Transfer pricing
//!
//! Decides which price field a transfer writes.

use crate::config::PricingPolicy;
use crate::domain::entities::PriceInfo;
use shared_types::entities::{Stage, Timestamp};

/// Price field written by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Distributor,
    Retailer,
}

/// Tier for a transfer into `stage`.
pub fn tier_for(stage: Stage, policy: PricingPolicy) -> PriceTier {
    match policy {
        PricingPolicy::SingleCurrentTier => PriceTier::Distributor,
        PricingPolicy::TieredByStage if stage >= Stage::ReceivedByRetailer => PriceTier::Retailer,
        PricingPolicy::TieredByStage => PriceTier::Distributor,
    }
}

/// Stamp `amount` into the tier selected for `stage`.
pub fn apply_transfer_price(
    price: &mut PriceInfo,
    stage: Stage,
    amount: u64,
    policy: PricingPolicy,
    now: Timestamp,
) -> PriceTier {
    let tier = tier_for(stage, policy);
    match tier {
        PriceTier::Distributor => price.distributor_price = amount,
        PriceTier::Retailer => price.retailer_price = amount,
    }
    price.last_updated = now;
    tier
}
