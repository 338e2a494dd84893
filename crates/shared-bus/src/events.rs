//! # Supply Chain Events
//!
//! Defines all event types that flow through the shared bus.
//! Every successful ledger mutation emits exactly one of these for external
//! audit consumers; each variant carries the same fields as the record it
//! describes.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, Certification, ProductId, Stage, Timestamp};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyChainEvent {
    // =========================================================================
    // PRODUCT LEDGER
    // =========================================================================
    /// A product batch was registered by its farmer.
    ProductCreated {
        product_id: ProductId,
        farmer: Address,
        name: String,
        category: String,
        quantity: u64,
        batch_number: String,
        timestamp: Timestamp,
    },

    /// A certification was attached to a product.
    CertificationAdded {
        product_id: ProductId,
        certification: Certification,
        added_by: Address,
        timestamp: Timestamp,
    },

    /// A product was taken out of circulation. It stays readable.
    ProductDeactivated {
        product_id: ProductId,
        deactivated_by: Address,
        timestamp: Timestamp,
    },

    // =========================================================================
    // STAGE VALIDATOR
    // =========================================================================
    /// The custodian advanced a product to a later stage.
    StageUpdated {
        product_id: ProductId,
        previous_stage: Stage,
        new_stage: Stage,
        updated_by: Address,
        quantity: u64,
        notes: String,
        timestamp: Timestamp,
    },

    /// The custodian reported a new physical location.
    LocationUpdated {
        product_id: ProductId,
        location: String,
        updated_by: Address,
        timestamp: Timestamp,
    },

    // =========================================================================
    // TRANSFER ENGINE
    // =========================================================================
    /// Custody of a product moved to a new owner.
    ProductTransferred {
        product_id: ProductId,
        from: Address,
        to: Address,
        quantity: u64,
        price: u64,
        stage: Stage,
        tx_reference: Option<String>,
        estimated_delivery: Option<Timestamp>,
        notes: String,
        location_ref: String,
        timestamp: Timestamp,
    },

    // =========================================================================
    // QUALITY
    // =========================================================================
    /// An inspector appended a quality assessment.
    QualityRecorded {
        product_id: ProductId,
        inspector: Address,
        grade: String,
        score: u8,
        test_results_ref: String,
        parameters: Vec<String>,
        parameter_scores: Vec<u8>,
        timestamp: Timestamp,
    },

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================
    /// The engine was paused or resumed.
    PauseChanged { paused: bool, timestamp: Timestamp },

    /// A stakeholder was blocked or unblocked.
    StakeholderBlockChanged {
        stakeholder: Address,
        blocked: bool,
        timestamp: Timestamp,
    },

    /// A product was blocked or unblocked.
    ProductBlockChanged {
        product_id: ProductId,
        blocked: bool,
        timestamp: Timestamp,
    },
}

impl SupplyChainEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ProductCreated { .. }
            | Self::CertificationAdded { .. }
            | Self::ProductDeactivated { .. } => EventTopic::Ledger,
            Self::StageUpdated { .. } | Self::LocationUpdated { .. } => EventTopic::Lifecycle,
            Self::ProductTransferred { .. } => EventTopic::Custody,
            Self::QualityRecorded { .. } => EventTopic::Quality,
            Self::PauseChanged { .. }
            | Self::StakeholderBlockChanged { .. }
            | Self::ProductBlockChanged { .. } => EventTopic::Administration,
        }
    }

    /// The product this event concerns, if any.
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::ProductCreated { product_id, .. }
            | Self::CertificationAdded { product_id, .. }
            | Self::ProductDeactivated { product_id, .. }
            | Self::StageUpdated { product_id, .. }
            | Self::LocationUpdated { product_id, .. }
            | Self::ProductTransferred { product_id, .. }
            | Self::QualityRecorded { product_id, .. }
            | Self::ProductBlockChanged { product_id, .. } => Some(*product_id),
            Self::PauseChanged { .. } | Self::StakeholderBlockChanged { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Product creation, certification and deactivation.
    Ledger,
    /// Stage and location updates.
    Lifecycle,
    /// Ownership transfers.
    Custody,
    /// Quality assessments.
    Quality,
    /// Pause and blocking changes.
    Administration,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Products to include. Empty means all products.
    pub product_ids: Vec<ProductId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            product_ids: Vec::new(),
        }
    }

    /// Create a filter that follows specific products.
    #[must_use]
    pub fn for_products(product_ids: Vec<ProductId>) -> Self {
        Self {
            topics: Vec::new(),
            product_ids,
        }
    }

    /// Check if an event matches this filter.
    ///
    /// Product filters drop events that carry no product id.
    #[must_use]
    pub fn matches(&self, event: &SupplyChainEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let product_match = self.product_ids.is_empty()
            || event
                .product_id()
                .is_some_and(|id| self.product_ids.contains(&id));

        topic_match && product_match
    }
}
