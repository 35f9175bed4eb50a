//! Lot events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to the transitions the scheduler drives.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler` (slot, gate, request and sensor transitions),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the scheduler's subscriber listener, which fans out to the
//!   `SubscriberSet` (log writer, notifier, user subscribers).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
