//! # Shared Types Crate
//!
//! This crate contains the identifiers and enumerations every Harvest-Chain
//! crate agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Closed Roles**: Stakeholder roles are a tagged enumeration, never strings.
//! - **Ordered Lifecycle**: `Stage` derives `Ord` in supply-chain order.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
