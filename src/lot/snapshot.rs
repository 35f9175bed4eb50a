//! # Read-only lot snapshot for reporting.
//!
//! [`aggregate`] folds the slot set and the ledger into a [`LotSnapshot`]. It
//! borrows everything immutably, so it can run on every status request without
//! touching lot state.
//!
//! The serialized form is what the dashboard polls:
//! ```text
//! {
//!   "total": 3, "free": 2, "occupied": 1, "status": "Available",
//!   "slots":          [{"slot":1,"status":"Occupied","id":1,"time_in":"08:15:02","elapsed":"3.4"}, ...],
//!   "active_tickets": [{"id":1,"slot":1,"time_in":"08:15:02","elapsed":"3.4"}],
//!   "closed_tickets": [{"id":2,"slot":3,"duration":"12.6","fee":"6.30","time_out":"08:11:40"}]
//! }
//! ```

use serde::Serialize;

use crate::core::{Timestamp, clock_time, elapsed_secs};
use crate::lot::ledger::{ClosedTicket, TicketLedger};
use crate::lot::pool::TicketId;
use crate::lot::slot::{Slot, SlotState};

/// Overall availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LotStatus {
    /// No free slot.
    #[serde(rename = "FULL")]
    Full,
    /// At least one free slot.
    Available,
}

/// Per-slot occupancy label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    /// Free slot.
    Free,
    /// Ticketed vehicle parked.
    Occupied,
}

/// One entry of `slots[]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotView {
    /// Slot number.
    pub slot: u16,
    /// Occupancy label.
    pub status: SlotStatus,
    /// Ticket identifier (occupied only).
    pub id: Option<TicketId>,
    /// Entry time `HH:MM:SS` (occupied only).
    pub time_in: Option<String>,
    /// Elapsed minutes, one decimal (occupied only).
    pub elapsed: Option<String>,
}

/// One entry of `active_tickets[]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActiveTicketView {
    /// Ticket identifier.
    pub id: TicketId,
    /// Slot holding the ticket.
    pub slot: u16,
    /// Entry time `HH:MM:SS`.
    pub time_in: String,
    /// Elapsed minutes, one decimal.
    pub elapsed: String,
}

/// One entry of `closed_tickets[]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClosedTicketView {
    /// Ticket identifier.
    pub id: TicketId,
    /// Slot the ticket was held by.
    pub slot: u16,
    /// Duration in minutes, one decimal.
    pub duration: String,
    /// Fee, two decimals.
    pub fee: String,
    /// Closing time `HH:MM:SS`.
    pub time_out: String,
}

impl From<&ClosedTicket> for ClosedTicketView {
    fn from(t: &ClosedTicket) -> Self {
        Self {
            id: t.id,
            slot: t.slot,
            duration: format!("{:.1}", t.minutes),
            fee: format!("{:.2}", t.fee),
            time_out: clock_time(t.closed_at),
        }
    }
}

/// Aggregated view of the lot at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LotSnapshot {
    /// Number of slots.
    pub total: usize,
    /// Free slots.
    pub free: usize,
    /// Occupied slots.
    pub occupied: usize,
    /// `FULL` when no slot is free.
    pub status: LotStatus,
    /// Every slot, ascending by number.
    pub slots: Vec<SlotView>,
    /// Open tickets, one per occupied slot.
    pub active_tickets: Vec<ActiveTicketView>,
    /// Most recent closed tickets, in closing order.
    pub closed_tickets: Vec<ClosedTicketView>,
}

impl LotSnapshot {
    /// Encodes the snapshot as a JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Builds a snapshot from slots (already in ascending order) and the ledger.
pub fn aggregate(
    slots: &[Slot],
    ledger: &TicketLedger,
    recent_closed: usize,
    now: Timestamp,
) -> LotSnapshot {
    let mut views = Vec::with_capacity(slots.len());
    let mut active = Vec::new();

    for slot in slots {
        match slot.state() {
            SlotState::Free => views.push(SlotView {
                slot: slot.number(),
                status: SlotStatus::Free,
                id: None,
                time_in: None,
                elapsed: None,
            }),
            SlotState::Occupied { ticket, entry } => {
                let time_in = clock_time(entry);
                let elapsed = format!("{:.1}", elapsed_secs(entry, now).max(0.0) / 60.0);
                views.push(SlotView {
                    slot: slot.number(),
                    status: SlotStatus::Occupied,
                    id: Some(ticket),
                    time_in: Some(time_in.clone()),
                    elapsed: Some(elapsed.clone()),
                });
                active.push(ActiveTicketView {
                    id: ticket,
                    slot: slot.number(),
                    time_in,
                    elapsed,
                });
            }
        }
    }

    let free = views
        .iter()
        .filter(|v| v.status == SlotStatus::Free)
        .count();
    LotSnapshot {
        total: slots.len(),
        free,
        occupied: slots.len() - free,
        status: if free == 0 {
            LotStatus::Full
        } else {
            LotStatus::Available
        },
        slots: views,
        active_tickets: active,
        closed_tickets: ledger.recent(recent_closed).map(Into::into).collect(),
    }
}
