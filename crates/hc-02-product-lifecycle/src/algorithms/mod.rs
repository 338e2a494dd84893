//! Algorithms module for the Product Lifecycle engine
//!
//! Contains:
//! - Stage transition validation (monotonicity and role windows)
//! - Transfer pricing
//! - Ledger analytics
//! - Batch number derivation

pub mod analytics;
pub mod batch_number;
pub mod pricing;
pub mod stage_validator;

pub use analytics::{sustainability_metrics, system_statistics};
pub use batch_number::derive_batch_number;
pub use pricing::{apply_transfer_price, tier_for, PriceTier};
pub use stage_validator::{
    recipient_window, role_window, validate_stage_update, validate_transfer_stage,
};
