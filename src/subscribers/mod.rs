//! # Event subscribers for the lot scheduler.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in subscribers fed from the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Scheduler tick ── publish(Event) ──► Bus ──► subscriber listener
//!                                                  │
//!                                                  ▼
//!                                            SubscriberSet
//!                                      ┌──────────┼──────────┐
//!                                      ▼          ▼          ▼
//!                                  LogWriter   Notifier   Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use lotkeeper::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct RevenueCounter;
//!
//! #[async_trait]
//! impl Subscribe for RevenueCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TicketClosed {
//!             // add event.fee to a running total
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod notifier;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use notifier::Notifier;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
