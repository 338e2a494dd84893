//! Domain module for the Product Lifecycle engine
//!
//! Contains entities, value objects, errors, invariants, the ledger store
//! and the administrative controls.

pub mod controls;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ledger;
pub mod value_objects;

pub use controls::SystemControls;
pub use entities::*;
pub use errors::*;
pub use ledger::ProductLedger;
pub use value_objects::*;
