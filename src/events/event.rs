//! # Lot events emitted by the scheduler and subscriber workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Ticket events**: occupancy transitions (opened, closed, rejected, debounce)
//! - **Gate events**: actuator transitions and refused triggers
//! - **Service events**: status requests and device reads
//! - **Runtime events**: subscriber health and shutdown
//!
//! The [`Event`] struct carries additional metadata such as timestamps, slot and
//! ticket numbers, duration, fee and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use lotkeeper::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TicketClosed)
//!     .with_slot(2)
//!     .with_minutes(12.6)
//!     .with_fee(6.3);
//!
//! assert_eq!(ev.kind, EventKind::TicketClosed);
//! assert_eq!(ev.slot, Some(2));
//! assert_eq!(ev.fee, Some(6.3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::Utc;

use crate::core::Timestamp;
use crate::lot::{ClosedTicket, TicketId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lot events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Ticket events ===
    /// A slot became occupied under a fresh ticket.
    ///
    /// Sets: `slot`, `ticket`
    TicketOpened,

    /// A confirmed departure closed a ticket.
    ///
    /// Sets: `slot`, `ticket`, `minutes`, `fee`
    TicketClosed,

    /// Presence detected but the identifier pool is exhausted; the slot stays free.
    ///
    /// Sets: `slot`
    ArrivalRejected,

    /// Absence seen on an occupied slot; settle deadline armed.
    ///
    /// Sets: `slot`, `ticket`
    DepartureSuspected,

    /// Presence returned before the settle deadline; no transition.
    ///
    /// Sets: `slot`, `ticket`
    DepartureCancelled,

    // === Gate events ===
    /// Trigger accepted, actuator commanded open.
    GateOpening,

    /// Gate held at the open angle.
    GateHolding,

    /// Dwell over, actuator commanded closed.
    GateClosing,

    /// Gate back to idle.
    GateIdle,

    /// Trigger refused because the lot is full.
    GateRefused,

    // === Service events ===
    /// A status connection was serviced.
    ///
    /// Sets: `source` (peer), `reason` (route)
    RequestServed,

    /// A status connection failed; it was closed and the tick continued.
    ///
    /// Sets: `source` (peer, if known), `reason` (error label and message)
    RequestFailed,

    /// A device read failed; the device was skipped for this tick.
    ///
    /// Sets: `slot` (presence sensors only), `reason`
    SensorFailed,

    // === Runtime events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `source` (subscriber name), `reason` (panic message)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `source` (subscriber name), `reason`
    SubscriberOverflow,

    /// Shutdown requested (OS signal or cancellation token).
    ShutdownRequested,

    /// Scheduler left its loop.
    ///
    /// Sets: `fee` (revenue since start), `reason` (`closed=<n> revenue=<r>`)
    SchedulerStopped,
}

/// Lot event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp; events published by the scheduler carry the
///   time of its [`Clock`](crate::Clock), the rest the system time
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: Timestamp,
    /// Event classification.
    pub kind: EventKind,

    /// Slot number, if applicable.
    pub slot: Option<u16>,
    /// Ticket identifier, if applicable.
    pub ticket: Option<TicketId>,
    /// Stay duration in minutes (closed tickets).
    pub minutes: Option<f64>,
    /// Fee charged (closed tickets).
    pub fee: Option<f64>,
    /// Origin of the event: subscriber name, peer address.
    pub source: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the system time and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: Utc::now(),
            kind,
            slot: None,
            ticket: None,
            minutes: None,
            fee: None,
            source: None,
            reason: None,
        }
    }

    /// Replaces the timestamp.
    #[inline]
    pub fn with_at(mut self, at: Timestamp) -> Self {
        self.at = at;
        self
    }

    /// Attaches a slot number.
    #[inline]
    pub fn with_slot(mut self, slot: u16) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a ticket identifier.
    #[inline]
    pub fn with_ticket(mut self, ticket: TicketId) -> Self {
        self.ticket = Some(ticket);
        self
    }

    /// Attaches a stay duration in minutes.
    #[inline]
    pub fn with_minutes(mut self, minutes: f64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    /// Attaches a fee.
    #[inline]
    pub fn with_fee(mut self, fee: f64) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Attaches the event origin.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a `TicketClosed` event from a ledger entry.
    pub fn ticket_closed(t: &ClosedTicket) -> Self {
        Event::new(EventKind::TicketClosed)
            .with_at(t.closed_at)
            .with_slot(t.slot)
            .with_ticket(t.id)
            .with_minutes(t.minutes)
            .with_fee(t.fee)
    }

    /// Creates a `SchedulerStopped` event carrying the ledger totals.
    pub fn scheduler_stopped(closed: u64, revenue: f64) -> Self {
        Event::new(EventKind::SchedulerStopped)
            .with_fee(revenue)
            .with_reason(format!("closed={closed} revenue={revenue:.2}"))
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
