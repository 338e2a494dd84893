//! Error types for the stakeholder registry

use shared_types::entities::{short_address, Address};
use thiserror::Error;

/// All errors that can occur in registry operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Address has no registry record
    #[error("Stakeholder not registered: {}", short_address(.0))]
    NotRegistered(Address),

    /// Address is already registered
    #[error("Stakeholder already registered: {}", short_address(.0))]
    AlreadyRegistered(Address),

    /// Reputation outside 0..=100
    #[error("Invalid reputation: {0} > 100")]
    InvalidReputation(u8),

    /// Registration data rejected
    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    /// Registry could not be reached
    #[error("Registry unavailable")]
    Unavailable,
}
