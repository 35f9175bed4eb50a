//! Lot state: slots, ticket identifiers, closed-ticket ledger and the snapshot view.
//!
//! ## Contents
//! - [`TicketIdPool`] lowest-first reusable identifiers `1..=N`
//! - [`Slot`], [`SlotState`] per-slot occupancy
//! - [`TicketLedger`], [`ClosedTicket`] closed tickets and fee arithmetic
//! - [`SlotRegistry`] the owning context that ties the three together
//! - [`LotSnapshot`] read-only reporting view built by [`SlotRegistry::snapshot`]
//!
//! ## Wiring
//! ```text
//! Scheduler ──► SlotRegistry::arrive / depart ──► pool + slots + ledger
//!     │
//!     └──► SlotRegistry::snapshot(now) ──► LotSnapshot ──► status endpoint
//! ```

mod ledger;
mod pool;
mod registry;
mod slot;
mod snapshot;

pub use ledger::{ClosedTicket, TicketLedger, fee_for, minutes_between};
pub use pool::{TicketId, TicketIdPool};
pub use registry::{Arrival, SlotRegistry};
pub use slot::{Slot, SlotState};
pub use snapshot::{
    ActiveTicketView, ClosedTicketView, LotSnapshot, LotStatus, SlotStatus, SlotView,
};
