//! Ports module for the Product Lifecycle engine
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::ProductLifecycleApi;
pub use outbound::{
    LifecycleEventSink, ManualTimeSource, StakeholderDirectory, SystemTimeSource, TimeSource,
};
