//! Event sink adapters.
//!
//! Publishes lifecycle events to the shared bus for audit consumers.

use crate::domain::errors::EventSinkError;
use crate::ports::outbound::LifecycleEventSink;
use async_trait::async_trait;
use shared_bus::{EventPublisher, InMemoryEventBus, SupplyChainEvent};
use std::sync::Arc;
use tracing::trace;

/// Forwards events to an [`InMemoryEventBus`].
///
/// Publishing with no subscribers is not an error; the bus counts and drops
/// the event.
#[derive(Clone)]
pub struct BusEventSink {
    bus: Arc<InMemoryEventBus>,
}

impl BusEventSink {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }
}

#[async_trait]
impl LifecycleEventSink for BusEventSink {
    async fn emit(&self, event: SupplyChainEvent) -> Result<(), EventSinkError> {
        let receivers = self.bus.publish(event).await;
        trace!(receivers, "Lifecycle event forwarded to bus");
        Ok(())
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl LifecycleEventSink for NoOpEventSink {
    async fn emit(&self, _event: SupplyChainEvent) -> Result<(), EventSinkError> {
        Ok(())
    }
}
