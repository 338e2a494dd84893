//! Application layer: the lifecycle service and its notification outbox.

pub mod outbox;
pub mod service;

pub use outbox::{FlushSummary, NotificationOutcome, Outbox, PendingNotification};
pub use service::ProductLifecycleService;
