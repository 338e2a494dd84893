//! Post-commit notifications.
//!
//! Registry callbacks and audit events are queued while the ledger is being
//! mutated and delivered only after the mutation is complete. Delivery
//! failures are logged and counted; they never reach the caller.

use crate::ports::outbound::{LifecycleEventSink, StakeholderDirectory};
use hc_telemetry::NOTIFICATIONS_DROPPED;
use shared_bus::SupplyChainEvent;
use shared_types::entities::{short_address, Address, ProductId};
use tracing::{trace, warn};

/// A side effect owed to a collaborator after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingNotification {
    /// Append a product to a stakeholder's registry history.
    RecordProduct {
        stakeholder: Address,
        product_id: ProductId,
    },
    /// Publish an audit event.
    Event(SupplyChainEvent),
}

impl PendingNotification {
    /// Metric label for this notification's channel.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::RecordProduct { .. } => "registry",
            Self::Event(_) => "events",
        }
    }
}

/// Result of delivering one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered,
    Dropped(String),
}

/// Delivery totals for one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub delivered: usize,
    pub dropped: usize,
}

/// Ordered queue of notifications for one operation.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<PendingNotification>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_product(&mut self, stakeholder: Address, product_id: ProductId) {
        self.pending.push(PendingNotification::RecordProduct {
            stakeholder,
            product_id,
        });
    }

    pub fn event(&mut self, event: SupplyChainEvent) {
        self.pending.push(PendingNotification::Event(event));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[PendingNotification] {
        &self.pending
    }

    /// Deliver everything in order.
    pub async fn flush<R, P>(self, directory: &R, sink: &P) -> FlushSummary
    where
        R: StakeholderDirectory + ?Sized,
        P: LifecycleEventSink + ?Sized,
    {
        let mut summary = FlushSummary::default();
        for notification in self.pending {
            match deliver(notification, directory, sink).await {
                NotificationOutcome::Delivered => summary.delivered += 1,
                NotificationOutcome::Dropped(_) => summary.dropped += 1,
            }
        }
        summary
    }
}

/// Deliver one notification, absorbing any failure.
pub async fn deliver<R, P>(
    notification: PendingNotification,
    directory: &R,
    sink: &P,
) -> NotificationOutcome
where
    R: StakeholderDirectory + ?Sized,
    P: LifecycleEventSink + ?Sized,
{
    let channel = notification.channel();
    let result = match notification {
        PendingNotification::RecordProduct {
            stakeholder,
            product_id,
        } => directory
            .record_product(&stakeholder, product_id)
            .await
            .map_err(|e| {
                warn!(
                    stakeholder = %short_address(&stakeholder),
                    product_id,
                    error = %e,
                    "Registry product callback failed, continuing"
                );
                e.to_string()
            }),
        PendingNotification::Event(event) => {
            let topic = event.topic();
            sink.emit(event).await.map_err(|e| {
                warn!(topic = ?topic, error = %e, "Audit event dropped");
                e.to_string()
            })
        }
    };

    match result {
        Ok(()) => {
            trace!(channel, "Notification delivered");
            NotificationOutcome::Delivered
        }
        Err(reason) => {
            NOTIFICATIONS_DROPPED.with_label_values(&[channel]).inc();
            NotificationOutcome::Dropped(reason)
        }
    }
}
