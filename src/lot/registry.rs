//! # Slot registry: the lot's owning context.
//!
//! [`SlotRegistry`] owns every piece of mutable lot state (the slots, the
//! [`TicketIdPool`] and the [`TicketLedger`]) and is the only place where
//! occupancy changes. The scheduler holds exactly one and is its only mutator.
//!
//! ## Transitions
//! ```text
//! arrive(slot, now):
//!   Free ──► pool.allocate() ──► Some(id) ──► Occupied { id, now }     → Arrival::Opened(id)
//!                            └─► None     ──► stays Free               → Arrival::PoolExhausted
//!   Occupied ─────────────────────────────────────────────────────────► Arrival::AlreadyOccupied
//!
//! depart(slot, now):
//!   Occupied { id, entry } ──► minutes/fee ──► ledger.record ──► pool.release(id) ──► Free
//!   Free ─────────────────────────────────────────────────────────────► None
//! ```
//!
//! ## Rules
//! - An occupied slot always holds a ticket and an entry time; a free slot holds neither.
//! - A ticket is released to the pool before `depart` returns, so the very next
//!   arrival may reuse it; it is never held by two slots.
//! - `PoolExhausted` leaves the slot free even though a vehicle is present.

use crate::core::{LotConfig, Timestamp};
use crate::error::{ConfigError, LotError};
use crate::lot::ledger::{ClosedTicket, TicketLedger, fee_for, minutes_between};
use crate::lot::pool::{TicketId, TicketIdPool};
use crate::lot::slot::Slot;
use crate::lot::snapshot::{self, LotSnapshot};

/// Outcome of a presence report on a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrival {
    /// The slot is now occupied under this ticket.
    Opened(TicketId),
    /// No identifier was free; the slot stays free.
    PoolExhausted,
    /// The slot was already occupied; nothing changed.
    AlreadyOccupied,
}

/// Owns slots, identifier pool and ledger.
///
/// # Example
/// ```
/// use lotkeeper::{Arrival, Clock, LotConfig, ManualClock, SlotRegistry};
///
/// let clock = ManualClock::epoch();
/// let mut lot = SlotRegistry::new(&LotConfig::default()).unwrap();
///
/// let Arrival::Opened(id) = lot.arrive(2, clock.now()).unwrap() else { panic!() };
/// assert_eq!(id.get(), 1);
/// assert_eq!(lot.free_count(), 2);
///
/// let closed = lot.depart(2, clock.now()).unwrap().unwrap();
/// assert_eq!((closed.id, closed.slot, closed.fee), (id, 2, 0.0));
/// assert_eq!(lot.free_count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct SlotRegistry {
    slots: Vec<Slot>,
    pool: TicketIdPool,
    ledger: TicketLedger,
    rate_per_minute: f64,
    recent_closed: usize,
}

impl SlotRegistry {
    /// Creates a registry with `cfg.capacity` free slots numbered from 1.
    pub fn new(cfg: &LotConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        // validate() bounds capacity to u16.
        let capacity = cfg.capacity as u16;
        Ok(Self {
            slots: (1..=capacity).map(Slot::new).collect(),
            pool: TicketIdPool::new(capacity),
            ledger: TicketLedger::new(cfg.ledger_capacity),
            rate_per_minute: cfg.rate_per_minute,
            recent_closed: cfg.recent_closed,
        })
    }

    /// Handles "object present" on `slot`.
    pub fn arrive(&mut self, slot: u16, now: Timestamp) -> Result<Arrival, LotError> {
        let idx = self.index(slot)?;
        if self.slots[idx].is_occupied() {
            return Ok(Arrival::AlreadyOccupied);
        }
        match self.pool.allocate() {
            Some(id) => {
                self.slots[idx].occupy(id, now);
                Ok(Arrival::Opened(id))
            }
            None => Ok(Arrival::PoolExhausted),
        }
    }

    /// Handles a confirmed departure from `slot`.
    ///
    /// Returns the closed ticket, or `None` if the slot was already free.
    pub fn depart(&mut self, slot: u16, now: Timestamp) -> Result<Option<ClosedTicket>, LotError> {
        let idx = self.index(slot)?;
        let Some((id, entry)) = self.slots[idx].vacate() else {
            return Ok(None);
        };

        let minutes = minutes_between(entry, now);
        let closed = ClosedTicket {
            id,
            slot,
            minutes,
            fee: fee_for(minutes, self.rate_per_minute),
            closed_at: now,
        };
        self.ledger.record(closed.clone());
        self.pool.release(id);
        Ok(Some(closed))
    }

    /// Slot by number.
    pub fn slot(&self, slot: u16) -> Result<&Slot, LotError> {
        self.index(slot).map(|idx| &self.slots[idx])
    }

    /// All slots in ascending number order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots without a ticketed vehicle.
    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_occupied()).count()
    }

    /// Slots with a ticketed vehicle.
    pub fn occupied_count(&self) -> usize {
        self.capacity() - self.free_count()
    }

    /// True if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.free_count() == 0
    }

    /// Numbers of free slots, ascending.
    pub fn free_slots(&self) -> Vec<u16> {
        self.slots
            .iter()
            .filter(|s| !s.is_occupied())
            .map(Slot::number)
            .collect()
    }

    /// Identifier pool (read-only).
    pub fn pool(&self) -> &TicketIdPool {
        &self.pool
    }

    /// Closed-ticket ledger (read-only).
    pub fn ledger(&self) -> &TicketLedger {
        &self.ledger
    }

    /// Fee rate per minute.
    pub fn rate_per_minute(&self) -> f64 {
        self.rate_per_minute
    }

    /// Builds the read-only reporting view at `now`.
    pub fn snapshot(&self, now: Timestamp) -> LotSnapshot {
        snapshot::aggregate(&self.slots, &self.ledger, self.recent_closed, now)
    }

    fn index(&self, slot: u16) -> Result<usize, LotError> {
        let idx = usize::from(slot).wrapping_sub(1);
        if idx < self.slots.len() {
            Ok(idx)
        } else {
            Err(LotError::UnknownSlot {
                slot,
                capacity: self.slots.len(),
            })
        }
    }
}

#[cfg(test)]
impl SlotRegistry {
    pub(crate) fn pool_mut(&mut self) -> &mut TicketIdPool {
        &mut self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, ManualClock};
    use std::time::Duration;

    fn lot(capacity: usize) -> SlotRegistry {
        SlotRegistry::new(&LotConfig {
            capacity,
            ..LotConfig::default()
        })
        .unwrap()
    }

    fn assert_consistent(lot: &SlotRegistry) {
        let held: Vec<TicketId> = lot.slots().iter().filter_map(Slot::ticket).collect();
        for slot in lot.slots() {
            assert_eq!(slot.is_occupied(), slot.ticket().is_some());
            assert_eq!(slot.is_occupied(), slot.entry().is_some());
        }
        let mut dedup = held.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), held.len(), "ticket held by two slots");
        for id in &held {
            assert!(!lot.pool().is_free(*id));
        }
        assert_eq!(lot.pool().held(), held.len());
    }

    #[test]
    fn arrival_takes_lowest_identifier_regardless_of_slot() {
        let clock = ManualClock::epoch();
        let mut lot = lot(3);
        assert_eq!(lot.arrive(3, clock.now()).unwrap(), Arrival::Opened(TicketId::new_for_test(1)));
        assert_eq!(lot.arrive(1, clock.now()).unwrap(), Arrival::Opened(TicketId::new_for_test(2)));
        assert_eq!(lot.arrive(1, clock.now()).unwrap(), Arrival::AlreadyOccupied);
        assert_eq!(lot.free_slots(), vec![2]);
        assert_consistent(&lot);
    }

    #[test]
    fn departure_charges_and_releases() {
        let clock = ManualClock::epoch();
        let mut lot = SlotRegistry::new(&LotConfig {
            rate_per_minute: 0.5,
            ..LotConfig::default()
        })
        .unwrap();
        lot.arrive(1, clock.now()).unwrap();
        clock.advance(Duration::from_secs(150));
        let closed = lot.depart(1, clock.now()).unwrap().unwrap();
        assert_eq!(closed.minutes, 2.5);
        assert_eq!(closed.fee, 1.25);
        assert_eq!(closed.closed_at, clock.now());
        assert!(lot.pool().is_free(closed.id));
        assert_eq!(lot.ledger().last(), Some(&closed));
        assert_eq!(lot.depart(1, clock.now()).unwrap(), None);
        assert_consistent(&lot);
    }

    #[test]
    fn released_identifier_is_reused_immediately() {
        let clock = ManualClock::epoch();
        let mut lot = lot(3);
        lot.arrive(1, clock.now()).unwrap();
        lot.arrive(2, clock.now()).unwrap();
        let closed = lot.depart(1, clock.now()).unwrap().unwrap();
        assert_eq!(closed.id.get(), 1);
        assert_eq!(lot.arrive(3, clock.now()).unwrap(), Arrival::Opened(closed.id));
        assert_consistent(&lot);
    }

    #[test]
    fn exhausted_pool_leaves_slot_free() {
        let clock = ManualClock::epoch();
        let mut lot = lot(3);
        lot.arrive(1, clock.now()).unwrap();
        // Identifiers 2 and 3 held outside any slot.
        lot.pool_mut().allocate().unwrap();
        lot.pool_mut().allocate().unwrap();

        assert_eq!(lot.arrive(2, clock.now()).unwrap(), Arrival::PoolExhausted);
        let slot = lot.slot(2).unwrap();
        assert!(!slot.is_occupied());
        assert_eq!(slot.ticket(), None);
        assert_eq!(lot.free_count(), 2);
    }

    #[test]
    fn unknown_slots_are_rejected() {
        let clock = ManualClock::epoch();
        let mut lot = lot(3);
        assert!(matches!(
            lot.arrive(0, clock.now()),
            Err(LotError::UnknownSlot { slot: 0, capacity: 3 })
        ));
        assert!(matches!(
            lot.depart(4, clock.now()),
            Err(LotError::UnknownSlot { slot: 4, .. })
        ));
        assert!(lot.slot(4).is_err());
    }

    #[test]
    fn counts_track_occupancy() {
        let clock = ManualClock::epoch();
        let mut lot = lot(2);
        assert!(!lot.is_full());
        lot.arrive(1, clock.now()).unwrap();
        lot.arrive(2, clock.now()).unwrap();
        assert!(lot.is_full());
        assert_eq!((lot.free_count(), lot.occupied_count()), (0, 2));
        assert!(lot.free_slots().is_empty());
    }
}
