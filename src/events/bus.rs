//! # Event bus for broadcasting lot events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the scheduler and subscriber workers.
//!
//! ## Architecture
//! ```text
//! Publishers:                         Subscriber (one):
//!   Scheduler tick ──┐
//!   SubscriberSet  ──┴──► Bus ───────► subscriber listener ────► SubscriberSet
//!                    (broadcast chan)    (in Scheduler)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; a tick never waits on a subscriber.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lot events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately (send clones internally).
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_published_after_subscribing() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::GateIdle));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::TicketOpened).with_slot(1));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TicketOpened);
        assert_eq!(ev.slot, Some(1));
    }
}
