//! # Per-slot occupancy state.
//!
//! A [`Slot`] is either [`SlotState::Free`] or [`SlotState::Occupied`]; the
//! ticket identifier and entry time live inside the `Occupied` variant, so a slot
//! can never carry one without the other.
//!
//! ```text
//!        arrive (pool yields id)
//!   Free ───────────────────────► Occupied { ticket, entry }
//!    ▲                                   │
//!    └────────── depart (confirmed) ─────┘
//! ```

use crate::core::Timestamp;
use crate::lot::pool::TicketId;

/// Occupancy of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing parked (or a vehicle that could not be ticketed).
    Free,
    /// A ticketed vehicle is parked.
    Occupied {
        /// Identifier taken from the pool on arrival.
        ticket: TicketId,
        /// Arrival time.
        entry: Timestamp,
    },
}

/// One physical parking space.
#[derive(Clone, Debug)]
pub struct Slot {
    number: u16,
    state: SlotState,
}

impl Slot {
    /// Creates a free slot with the given 1-based number.
    pub(crate) fn new(number: u16) -> Self {
        Self {
            number,
            state: SlotState::Free,
        }
    }

    /// Slot number (`1..=capacity`), fixed for the slot's lifetime.
    #[inline]
    pub fn number(&self) -> u16 {
        self.number
    }

    /// Current occupancy.
    #[inline]
    pub fn state(&self) -> SlotState {
        self.state
    }

    /// True if a ticketed vehicle is parked.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self.state, SlotState::Occupied { .. })
    }

    /// Ticket held by this slot, if occupied.
    pub fn ticket(&self) -> Option<TicketId> {
        match self.state {
            SlotState::Occupied { ticket, .. } => Some(ticket),
            SlotState::Free => None,
        }
    }

    /// Arrival time, if occupied.
    pub fn entry(&self) -> Option<Timestamp> {
        match self.state {
            SlotState::Occupied { entry, .. } => Some(entry),
            SlotState::Free => None,
        }
    }

    pub(crate) fn occupy(&mut self, ticket: TicketId, entry: Timestamp) {
        self.state = SlotState::Occupied { ticket, entry };
    }

    /// Clears the slot, returning what it held.
    pub(crate) fn vacate(&mut self) -> Option<(TicketId, Timestamp)> {
        match std::mem::replace(&mut self.state, SlotState::Free) {
            SlotState::Occupied { ticket, entry } => Some((ticket, entry)),
            SlotState::Free => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::Clock;

    #[test]
    fn ticket_and_entry_travel_together() {
        let now = ManualClock::epoch().now();
        let mut slot = Slot::new(2);
        assert_eq!(slot.number(), 2);
        assert!(!slot.is_occupied());
        assert_eq!((slot.ticket(), slot.entry()), (None, None));

        slot.occupy(TicketId::new_for_test(1), now);
        assert!(slot.is_occupied());
        assert_eq!(slot.ticket(), Some(TicketId::new_for_test(1)));
        assert_eq!(slot.entry(), Some(now));

        assert_eq!(slot.vacate(), Some((TicketId::new_for_test(1), now)));
        assert_eq!((slot.ticket(), slot.entry()), (None, None));
        assert_eq!(slot.vacate(), None);
    }
}
