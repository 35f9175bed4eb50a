//! # lotkeeper
//!
//! **Lotkeeper** runs a small, fixed-capacity parking lot: it detects arrivals
//! and departures per slot, hands out and reclaims ticket identifiers, charges
//! time-based fees, drives the entrance gate and serves a live status snapshot.
//!
//! Everything happens on one cooperative scheduler loop. Lot state has exactly
//! one owner and one mutator, so there is no locking around it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌───────────────┐ ┌───────────────┐ ┌───────────────┐ ┌──────────────┐
//!  │PresenceSensor │ │  RangeSensor  │ │ GateActuator  │ │ DisplaySink  │
//!  │  (per slot)   │ │    (gate)     │ │    (servo)    │ │ (2×16 chars) │
//!  └───────┬───────┘ └───────┬───────┘ └───────▲───────┘ └──────▲───────┘
//!          ▼                 ▼                 │                │
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  Scheduler (cooperative tick loop)                                    │
//! │  - StatusServer      (one non-blocking accept per tick)               │
//! │  - GateController    (Idle → Opening → HoldOpen → Closing)            │
//! │  - DepartureDebouncer(per-slot settle deadlines)                      │
//! │  - SlotRegistry      (slots + TicketIdPool + TicketLedger)            │
//! └──────────────────────────────────┬────────────────────────────────────┘
//!                                    │ publishes
//!                                    │ - TicketOpened / TicketClosed
//!                                    │ - GateOpening / GateRefused / ...
//!                                    │ - RequestServed / SensorFailed / ...
//!                                    ▼
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                       Bus (broadcast channel)                         │
//! │                (capacity: LotConfig::bus_capacity)                    │
//! └──────────────────────────────────┬────────────────────────────────────┘
//!                                    ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       │    (in Scheduler)      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter   Notifier   custom
//!                                   │
//!                                   ▼
//!                           NotificationSink
//!                         (e.g. TelegramSink)
//! ```
//!
//! ### Ticket lifecycle
//! ```text
//! presence on a free slot
//!   └─► TicketIdPool::allocate()   lowest free identifier
//!         ├─ Some(id) ─► slot Occupied { id, entry }          ─► TicketOpened, display refresh
//!         └─ None     ─► slot stays Free                      ─► ArrivalRejected
//!
//! absence on an occupied slot
//!   └─► debounce deadline = now + settle
//!         ├─ presence back before the deadline ─► DepartureCancelled (entry untouched)
//!         └─ still absent at the deadline
//!               └─► minutes = round(Δt / 60, 1), fee = round(minutes × rate, 2)
//!               └─► TicketLedger::record, TicketIdPool::release(id), slot Free
//!               └─► TicketClosed ─► Notifier, display refresh
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **Lot state**     | Slots, identifier pool, bounded ledger, fee arithmetic.      | [`SlotRegistry`], [`TicketIdPool`], [`TicketLedger`] |
//! | **Control**       | Gate and departure timers, advanced once per tick.           | [`GateController`], [`DepartureDebouncer`]      |
//! | **Scheduling**    | Cooperative loop, device wiring, graceful shutdown.          | [`Scheduler`], [`SchedulerBuilder`]             |
//! | **Devices**       | Sensor/actuator/display seams plus simulated devices.        | [`hw`]                                          |
//! | **Reporting**     | JSON snapshot and HTML dashboard over TCP.                   | [`StatusServer`], [`LotSnapshot`]               |
//! | **Subscriber API**| Hook into lot events (logging, notifications, custom).       | [`Subscribe`], [`Notifier`]                     |
//! | **Errors**        | Typed errors with stable labels.                             | [`LotError`], [`ServeError`], [`SensorError`]   |
//! | **Configuration** | Centralized lot settings.                                    | [`LotConfig`]                                   |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber.
//! - `telegram`: exports [`TelegramSink`], a Telegram Bot API notification sink.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use lotkeeper::hw::{SimActuator, SimDisplay, SimPresence, SimRange};
//! use lotkeeper::{LotConfig, Scheduler, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = LotConfig::default();
//!
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(lotkeeper::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let slots: Vec<SimPresence> = (0..cfg.capacity).map(|_| SimPresence::new()).collect();
//!     let mut builder = Scheduler::builder(cfg)
//!         .with_range(SimRange::new())
//!         .with_actuator(SimActuator::new())
//!         .with_display(SimDisplay::default())
//!         .with_subscribers(subs);
//!     for s in &slots {
//!         builder = builder.with_slot_sensor(s.clone());
//!     }
//!     let sched = builder.build()?;
//!
//!     slots[0].set(true);
//!     let token = CancellationToken::new();
//!     token.cancel();
//!     sched.run(token).await;
//!     Ok(())
//! }
//! ```

mod control;
mod core;
mod error;
mod events;
pub mod hw;
mod lot;
mod notify;
mod server;
mod subscribers;

// ---- Public re-exports ----

pub use control::{DebounceOutcome, DepartureDebouncer, GateController, GateEvent, GateState};
pub use core::{Clock, LotConfig, ManualClock, Scheduler, SchedulerBuilder, SystemClock, Timestamp};
pub use error::{ConfigError, LotError, NotifyError, SensorError, ServeError};
pub use events::{Bus, Event, EventKind};
pub use hw::DisplayFrame;
pub use lot::{
    ActiveTicketView, Arrival, ClosedTicket, ClosedTicketView, LotSnapshot, LotStatus, Slot,
    SlotRegistry, SlotState, SlotStatus, SlotView, TicketId, TicketIdPool, TicketLedger, fee_for,
    minutes_between,
};
pub use notify::NotificationSink;
pub use server::{Exchange, Route, StatusServer};
pub use subscribers::{Notifier, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

// Optional: Telegram Bot API notification sink.
// Enable with: `--features telegram`
#[cfg(feature = "telegram")]
pub use notify::TelegramSink;
