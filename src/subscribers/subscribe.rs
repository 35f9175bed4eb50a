//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! lot. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue that is owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (network pushes, batching); they do **not**
//!   block the scheduler tick nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** and a `SubscriberOverflow` event is published.

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
