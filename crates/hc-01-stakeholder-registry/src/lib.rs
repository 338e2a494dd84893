//! # HC-01: Stakeholder Registry
//!
//! Record store for supply-chain participants: their role, verification
//! status, reputation score and the products they have handled.
//!
//! The lifecycle engine treats this crate as an external collaborator. It
//! reads a [`StakeholderProfile`] once per operation and calls back only to
//! append a product to a stakeholder's history.
//!
//! ## Architecture
//!
//! - **Domain**: `Stakeholder`, `StakeholderProfile`, `RegistryError`
//! - **Registry**: `InMemoryStakeholderRegistry` behind a `parking_lot::RwLock`
//!
//! ## Reputation
//!
//! | Range | Meaning |
//! |-------|---------|
//! | 0-49 | Below the default transaction threshold |
//! | 50-69 | May trade |
//! | 70-100 | May also act as a verifying inspector |

pub mod domain;
pub mod registry;

pub use domain::entities::{Stakeholder, StakeholderProfile, DEFAULT_REPUTATION, MAX_REPUTATION};
pub use domain::errors::RegistryError;
pub use registry::InMemoryStakeholderRegistry;
