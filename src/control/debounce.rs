//! # Departure debouncer.
//!
//! An occupied slot whose sensor stops reporting presence is not vacated right
//! away: the absence must hold for the whole settle interval. Instead of
//! sleeping inside the tick, [`DepartureDebouncer`] arms a per-slot deadline and
//! re-checks the sensor reading on every later tick, so other slots and incoming
//! requests keep being served while one slot settles. Deadlines are monotonic
//! instants and do not move with the wall clock.
//!
//! ## Per-slot flow
//! ```text
//! occupied & absent, no deadline  ──► arm (now + settle)        → Armed
//! occupied & absent, before dl    ──► keep waiting              → Settling
//! occupied & absent, at/after dl  ──► clear                     → Confirmed (close the ticket)
//! occupied & present, deadline    ──► clear                     → Cancelled (entry time untouched)
//! anything else                   ──► clear stale deadline      → Steady
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::core::deadline;

/// Result of feeding one reading to the debouncer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceOutcome {
    /// Nothing pending.
    Steady,
    /// Absence first seen; the departure will be confirmed at `until`.
    Armed {
        /// Confirmation deadline.
        until: Instant,
    },
    /// Absence still holds but the deadline has not passed.
    Settling,
    /// Absence held for the whole interval.
    Confirmed,
    /// Presence came back before the deadline.
    Cancelled,
}

/// Tracks pending departures per slot.
#[derive(Clone, Debug)]
pub struct DepartureDebouncer {
    settle: Duration,
    pending: BTreeMap<u16, Instant>,
}

impl DepartureDebouncer {
    /// Creates a debouncer with the given settle interval.
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: BTreeMap::new(),
        }
    }

    /// Feeds one presence reading for `slot`.
    ///
    /// `occupied` is the slot's state before this reading is applied.
    pub fn observe(
        &mut self,
        slot: u16,
        present: bool,
        occupied: bool,
        now: Instant,
    ) -> DebounceOutcome {
        if !occupied {
            self.pending.remove(&slot);
            return DebounceOutcome::Steady;
        }
        if present {
            return match self.pending.remove(&slot) {
                Some(_) => DebounceOutcome::Cancelled,
                None => DebounceOutcome::Steady,
            };
        }

        match self.pending.get(&slot).copied() {
            Some(until) if now >= until => {
                self.pending.remove(&slot);
                DebounceOutcome::Confirmed
            }
            Some(_) => DebounceOutcome::Settling,
            None => {
                let until = deadline(now, self.settle);
                if now >= until {
                    DebounceOutcome::Confirmed
                } else {
                    self.pending.insert(slot, until);
                    DebounceOutcome::Armed { until }
                }
            }
        }
    }

    /// Confirmation deadline for `slot`, if a departure is pending.
    pub fn pending(&self, slot: u16) -> Option<Instant> {
        self.pending.get(&slot).copied()
    }

    /// Number of slots currently settling.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Settle interval.
    pub fn settle(&self) -> Duration {
        self.settle
    }
}
