//! Error types for the Product Lifecycle engine
//!
//! Every failure is terminal and returned before any state is touched.

use shared_types::entities::{short_address, Address, ProductId, Stage, StakeholderKind};
use thiserror::Error;

/// Broad class of a [`LifecycleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or out-of-range input
    Validation,
    /// Wrong role, not owner, not verified, insufficient reputation
    Authorization,
    /// Missing product, bad stage ordering, blocked or paused
    State,
    /// Reused transaction reference
    Uniqueness,
    /// Collaborator lookup failed
    Collaborator,
}

/// All errors that can occur in lifecycle operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    // =========================================================================
    // VALIDATION
    // =========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Quality score {score} below minimum {min}")]
    QualityScoreTooLow { score: u8, min: u8 },

    #[error("Batch size exceeded: {size} > {max}")]
    BatchTooLarge { size: usize, max: usize },

    // =========================================================================
    // AUTHORIZATION
    // =========================================================================
    #[error("Caller {} is not the owner of product {product_id}", short_address(.caller))]
    NotProductOwner { product_id: ProductId, caller: Address },

    #[error("Stakeholder {} is not verified", short_address(.0))]
    StakeholderNotVerified(Address),

    #[error("Stakeholder {} has insufficient reputation: {reputation} < {required}", short_address(.stakeholder))]
    InsufficientReputation {
        stakeholder: Address,
        reputation: u8,
        required: u8,
    },

    #[error("Only farmers may create products, caller is {0}")]
    NotFarmer(StakeholderKind),

    #[error("Only inspectors may record quality, caller is {0}")]
    NotInspector(StakeholderKind),

    #[error("{kind} may not move a product to {stage}")]
    UnauthorizedStageTransition { kind: StakeholderKind, stage: Stage },

    #[error("Caller is not the administrator")]
    NotAdmin,

    // =========================================================================
    // STATE
    // =========================================================================
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Product {0} is inactive")]
    ProductInactive(ProductId),

    #[error("Product {0} is blocked")]
    ProductBlocked(ProductId),

    #[error("Stakeholder {} is blocked", short_address(.0))]
    UserBlocked(Address),

    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidStageTransition { from: Stage, to: Stage },

    #[error("System is paused")]
    SystemPaused,

    // =========================================================================
    // UNIQUENESS
    // =========================================================================
    #[error("Transaction reference already used: {0}")]
    DuplicateTransactionReference(String),

    // =========================================================================
    // COLLABORATORS
    // =========================================================================
    #[error("Registry lookup failed: {0}")]
    Registry(String),
}

impl LifecycleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_)
            | Self::QualityScoreTooLow { .. }
            | Self::BatchTooLarge { .. } => ErrorCategory::Validation,

            Self::NotProductOwner { .. }
            | Self::StakeholderNotVerified(_)
            | Self::InsufficientReputation { .. }
            | Self::NotFarmer(_)
            | Self::NotInspector(_)
            | Self::UnauthorizedStageTransition { .. }
            | Self::NotAdmin => ErrorCategory::Authorization,

            Self::ProductNotFound(_)
            | Self::ProductInactive(_)
            | Self::ProductBlocked(_)
            | Self::UserBlocked(_)
            | Self::InvalidStageTransition { .. }
            | Self::SystemPaused => ErrorCategory::State,

            Self::DuplicateTransactionReference(_) => ErrorCategory::Uniqueness,

            Self::Registry(_) => ErrorCategory::Collaborator,
        }
    }
}

impl From<hc_01_stakeholder_registry::RegistryError> for LifecycleError {
    fn from(err: hc_01_stakeholder_registry::RegistryError) -> Self {
        Self::Registry(err.to_string())
    }
}

/// Failure to hand an event to the audit sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventSinkError {
    #[error("Event sink closed")]
    Closed,

    #[error("Event rejected: {0}")]
    Rejected(String),
}
