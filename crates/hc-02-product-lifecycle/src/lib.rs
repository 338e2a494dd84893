//! # HC-02: Product Lifecycle Engine
//!
//! Tracks agricultural products from planting to sale: creation by verified
//! farmers, stage progression, custody transfers with tiered pricing, quality
//! assessments by inspectors, and the administrative pause/block controls.
//!
//! ## Architecture
//!
//! - **Domain**: Product, Transaction, QualityRecord, the `ProductLedger` store
//!   and `SystemControls`
//! - **Algorithms**: stage role windows, transfer pricing, analytics, batch
//!   number derivation
//! - **Ports**: Inbound (`ProductLifecycleApi`) and Outbound
//!   (`StakeholderDirectory`, `LifecycleEventSink`, `TimeSource`)
//! - **Adapters**: the in-memory stakeholder registry and the shared bus
//! - **Application**: `ProductLifecycleService` and the notification outbox
//!
//! ## Stage Progression
//!
//! ```text
//! Farmer:      Planted → Harvested
//! Distributor: ShippedToDistributor → ReceivedByDistributor → ShippedToRetailer
//! Retailer:    ReceivedByRetailer → AvailableForSale → SoldOut
//! ```
//!
//! A product's stage never decreases. Each role may only move a product
//! within its own window. Growing, Processed and PackedAtFarm exist in the
//! stage order but no role sets them through a stage update.
//!
//! ## Notifications
//!
//! Registry callbacks and audit events are delivered after the state lock is
//! released. A failed delivery is logged and counted, never rolled back.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{BusEventSink, NoOpEventSink, RegistryDirectory};
pub use application::ProductLifecycleService;
pub use config::{ConfigError, LifecycleConfig, PricingPolicy};
pub use domain::entities::*;
pub use domain::errors::{ErrorCategory, EventSinkError, LifecycleError};
pub use domain::value_objects::*;
pub use domain::{ProductLedger, SystemControls};
pub use ports::inbound::ProductLifecycleApi;
pub use ports::outbound::{
    LifecycleEventSink, ManualTimeSource, StakeholderDirectory, SystemTimeSource, TimeSource,
};

/// Service wired to the in-memory registry, the shared bus and the wall clock.
pub type DefaultLifecycleService =
    ProductLifecycleService<RegistryDirectory, BusEventSink, SystemTimeSource>;
