//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::EventSinkError;
use async_trait::async_trait;
use hc_01_stakeholder_registry::{RegistryError, StakeholderProfile};
use shared_bus::SupplyChainEvent;
use shared_types::entities::{Address, ProductId, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Stakeholder lookups and the product-association callback.
#[async_trait]
pub trait StakeholderDirectory: Send + Sync {
    /// Kind, verification, reputation and location in one lookup.
    ///
    /// Unknown addresses resolve to [`StakeholderProfile::unregistered`].
    async fn profile(&self, address: &Address) -> Result<StakeholderProfile, RegistryError>;

    /// Record `product_id` in the stakeholder's history. Best effort.
    async fn record_product(
        &self,
        address: &Address,
        product_id: ProductId,
    ) -> Result<(), RegistryError>;
}

/// Destination for audit events.
#[async_trait]
pub trait LifecycleEventSink: Send + Sync {
    async fn emit(&self, event: SupplyChainEvent) -> Result<(), EventSinkError>;
}

/// Time source, Unix seconds.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Settable clock.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
