//! Value objects for the Product Lifecycle engine
//!
//! Request payloads, batch outcomes and analytics snapshots.

use super::entities::FarmingPractices;
use super::errors::LifecycleError;
use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, Certification, ProductId, Stage, Timestamp};

/// Input to `create_product`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreationData {
    pub name: String,
    pub variety: String,
    pub category: String,
    pub unit: String,
    pub quantity: u64,
    pub planted_date: Timestamp,
    pub harvest_date: Option<Timestamp>,
    pub expiry_date: Timestamp,
    pub farm_gate_price: u64,
    pub recommended_retail_price: u64,
    /// Empty selects the configured default currency.
    pub currency: String,
    pub practices: FarmingPractices,
    pub certifications: Vec<Certification>,
    pub carbon_footprint: u64,
    pub location_ref: String,
}

/// Input to `transfer_product`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub product_id: ProductId,
    pub recipient: Address,
    pub price: u64,
    pub new_stage: Stage,
    /// Externally supplied reference. Only an empty string is treated as absent.
    pub tx_reference: Option<String>,
    pub estimated_delivery: Option<Timestamp>,
    pub notes: String,
    pub location_ref: String,
}

impl TransferRequest {
    pub fn new(product_id: ProductId, recipient: Address, price: u64, new_stage: Stage) -> Self {
        Self {
            product_id,
            recipient,
            price,
            new_stage,
            tx_reference: None,
            estimated_delivery: None,
            notes: String::new(),
            location_ref: String::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.tx_reference = Some(reference.into());
        self
    }

    pub fn with_delivery(mut self, estimated_delivery: Timestamp) -> Self {
        self.estimated_delivery = Some(estimated_delivery);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_location_ref(mut self, location_ref: impl Into<String>) -> Self {
        self.location_ref = location_ref.into();
        self
    }

    /// The reference exactly as supplied. Only the empty string counts as
    /// absent.
    pub fn reference(&self) -> Option<&str> {
        self.tx_reference.as_deref().filter(|r| !r.is_empty())
    }
}

/// Input to `record_quality_assessment`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityData {
    pub grade: String,
    pub score: u8,
    pub test_results_ref: String,
    pub parameters: Vec<String>,
    pub parameter_scores: Vec<u8>,
}

impl QualityData {
    pub fn new(grade: impl Into<String>, score: u8) -> Self {
        Self {
            grade: grade.into(),
            score,
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, score: u8) -> Self {
        self.parameters.push(name.into());
        self.parameter_scores.push(score);
        self
    }
}

/// Input to `batch_record_quality`: `product_ids[i]` receives `assessments[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchQualityData {
    pub product_ids: Vec<ProductId>,
    pub assessments: Vec<QualityData>,
}

/// Outcome of a batch operation.
///
/// Skipped items do not fail the call; they are listed here with the reason.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: Vec<ProductId>,
    pub skipped: Vec<(ProductId, LifecycleError)>,
}

impl BatchReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// System-wide ledger statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatistics {
    pub total_products: u64,
    pub active_products: u64,
    pub total_transactions: u64,
    /// Mean of each product's latest quality score; products never assessed
    /// are excluded. Zero when nothing has been assessed.
    pub average_quality_score: u64,
    pub total_carbon_footprint: u64,
}

/// Sustainability indicators over the whole ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SustainabilityMetrics {
    pub total_carbon_footprint: u64,
    pub organic_certified_products: u64,
    /// Distinct farmers with at least one product grown organically.
    pub organic_farmers: u64,
    pub average_carbon_per_product: u64,
}
