//! Core entities for the Product Lifecycle engine
//!
//! A [`Product`] is one batch of produce. Its [`Transaction`] log and
//! [`QualityRecord`] history are append-only.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, Certification, ProductId, Stage, Timestamp};

/// Prices along the chain, in the smallest unit of `currency`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub farm_gate_price: u64,
    pub distributor_price: u64,
    pub retailer_price: u64,
    pub recommended_retail_price: u64,
    pub currency: String,
    pub last_updated: Timestamp,
}

/// How the batch was grown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmingPractices {
    pub is_organic: bool,
    pub pesticide_free: bool,
    pub fertilizers_used: Vec<String>,
    pub pesticides_used: Vec<String>,
    pub irrigation_method: String,
    pub water_source: String,
}

/// A product batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub variety: String,
    pub category: String,
    pub unit: String,
    pub quantity: u64,

    pub planted_date: Timestamp,
    /// Set at creation or by the first move to `Harvested`; never overwritten.
    pub harvest_date: Option<Timestamp>,
    pub expiry_date: Timestamp,
    pub last_updated: Timestamp,
    pub created_at: Timestamp,

    /// Original creator. Immutable.
    pub farmer: Address,
    /// Current custodian. Changes only through a transfer.
    pub current_owner: Address,
    /// Farmer's registered location at creation. Immutable.
    pub farm_location: String,
    pub current_location: String,

    pub stage: Stage,
    pub quality_history: Vec<QualityRecord>,
    pub certifications: Vec<Certification>,
    pub price: PriceInfo,
    pub practices: FarmingPractices,

    pub is_active: bool,
    pub carbon_footprint: u64,
    pub batch_number: String,
}

impl Product {
    /// Score of the most recent quality record.
    pub fn latest_quality_score(&self) -> Option<u8> {
        self.quality_history.last().map(|r| r.score)
    }

    /// True if any certification is organic. Duplicates count once.
    pub fn is_organic_certified(&self) -> bool {
        self.certifications.iter().any(Certification::is_organic)
    }
}

/// One entry in a product's custody log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub product_id: ProductId,
    /// `None` for the creation record.
    pub from: Option<Address>,
    pub to: Address,
    pub quantity: u64,
    pub price: u64,
    /// Stage at the time of recording.
    pub stage: Stage,
    pub timestamp: Timestamp,
    pub estimated_delivery: Option<Timestamp>,
    pub tx_reference: Option<String>,
    pub notes: String,
    /// Pointer to off-ledger location detail.
    pub location_ref: String,
}

/// An inspector's assessment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub grade: String,
    pub score: u8,
    pub inspector: Address,
    pub timestamp: Timestamp,
    pub test_results_ref: String,
    pub parameters: Vec<String>,
    pub parameter_scores: Vec<u8>,
}
