//! # Closed-ticket ledger and fee arithmetic.
//!
//! [`TicketLedger`] keeps closed tickets in closing order. Internally it retains
//! up to `capacity` entries (oldest evicted first); reporting always reads the
//! last `recent_closed` of them through [`TicketLedger::recent`].
//!
//! ## Fee rules
//! - `minutes = round((close - entry) / 60, 1)`, clamped at `0.0`
//! - `fee = round(minutes × rate, 2)`
//!
//! The fee is charged on the already rounded minutes, so it always matches the
//! duration printed next to it. Charging the unrounded duration would differ by
//! a cent now and then: 755 s at 0.5/min is 6.29 that way and 6.30 here.
//!
//! ```rust
//! use lotkeeper::{fee_for, minutes_between, ManualClock, Clock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::epoch();
//! let entry = clock.now();
//! clock.advance(Duration::from_secs(754)); // 12.566… minutes
//! let minutes = minutes_between(entry, clock.now());
//! assert_eq!(minutes, 12.6);
//! assert_eq!(fee_for(minutes, 0.5), 6.3);
//! ```

use std::collections::VecDeque;

use crate::core::{Timestamp, elapsed_secs};
use crate::lot::pool::TicketId;

/// Immutable record of one completed stay.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosedTicket {
    /// Identifier the stay was ticketed under.
    pub id: TicketId,
    /// Slot the vehicle occupied.
    pub slot: u16,
    /// Duration in minutes, one decimal.
    pub minutes: f64,
    /// Fee, two decimals.
    pub fee: f64,
    /// Closing time.
    pub closed_at: Timestamp,
}

/// Minutes between `entry` and `close`, rounded to one decimal.
pub fn minutes_between(entry: Timestamp, close: Timestamp) -> f64 {
    let minutes = elapsed_secs(entry, close).max(0.0) / 60.0;
    round_to(minutes, 1)
}

/// Fee for `minutes` at `rate` per minute, rounded to two decimals.
pub fn fee_for(minutes: f64, rate: f64) -> f64 {
    round_to(minutes * rate, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Bounded history of closed tickets.
#[derive(Clone, Debug)]
pub struct TicketLedger {
    entries: VecDeque<ClosedTicket>,
    capacity: usize,
    closed_total: u64,
    revenue_total: f64,
}

impl TicketLedger {
    /// Creates an empty ledger retaining at most `capacity` entries (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            closed_total: 0,
            revenue_total: 0.0,
        }
    }

    /// Appends a closed ticket, evicting the oldest entry when full.
    pub fn record(&mut self, ticket: ClosedTicket) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.closed_total += 1;
        self.revenue_total = round_to(self.revenue_total + ticket.fee, 2);
        self.entries.push_back(ticket);
    }

    /// The last `n` closed tickets, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ClosedTicket> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// Most recently closed ticket.
    pub fn last(&self) -> Option<&ClosedTicket> {
        self.entries.back()
    }

    /// Entries currently retained.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tickets closed since start, including evicted ones.
    pub fn closed_total(&self) -> u64 {
        self.closed_total
    }

    /// Fees charged since start, including evicted tickets.
    pub fn revenue_total(&self) -> f64 {
        self.revenue_total
    }
}
