//! # Ticket identifier pool.
//!
//! [`TicketIdPool`] hands out identifiers `1..=N` lowest-first and takes them
//! back when a ticket closes. Lowest-first keeps the numbers on display small
//! and stable: with one car parked, its ticket is always `1`.
//!
//! ## Rules
//! - `free ∪ held = {1..=N}` and `free ∩ held = ∅` at all times
//! - `allocate()` returns the numerically lowest free identifier, or `None` when exhausted
//! - `release(id)` is idempotent; releasing a free or out-of-range identifier is a no-op

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Identifier of an open ticket (`1..=capacity`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketId(u16);

impl TicketId {
    /// Returns the raw identifier.
    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Finite, reusable identifier allocator.
///
/// # Example
/// ```
/// use lotkeeper::TicketIdPool;
///
/// let mut pool = TicketIdPool::new(3);
/// let a = pool.allocate().unwrap();
/// let b = pool.allocate().unwrap();
/// assert_eq!((a.get(), b.get()), (1, 2));
///
/// pool.release(a);
/// assert_eq!(pool.allocate().unwrap().get(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TicketIdPool {
    capacity: u16,
    free: BTreeSet<u16>,
}

impl TicketIdPool {
    /// Creates a pool with every identifier in `1..=capacity` free.
    pub fn new(capacity: u16) -> Self {
        Self {
            capacity,
            free: (1..=capacity).collect(),
        }
    }

    /// Takes the lowest free identifier, or `None` if every identifier is held.
    pub fn allocate(&mut self) -> Option<TicketId> {
        self.free.pop_first().map(TicketId)
    }

    /// Returns `id` to the pool.
    ///
    /// Returns `true` if the identifier was held and is now free.
    pub fn release(&mut self, id: TicketId) -> bool {
        if id.0 == 0 || id.0 > self.capacity {
            return false;
        }
        self.free.insert(id.0)
    }

    /// True if `id` is currently free.
    pub fn is_free(&self, id: TicketId) -> bool {
        self.free.contains(&id.0)
    }

    /// Number of free identifiers.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Number of held identifiers.
    pub fn held(&self) -> usize {
        usize::from(self.capacity) - self.free.len()
    }

    /// Total number of identifiers.
    pub fn capacity(&self) -> usize {
        usize::from(self.capacity)
    }

    /// True if no identifier is free.
    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty()
    }
}

#[cfg(test)]
impl TicketId {
    pub(crate) fn new_for_test(raw: u16) -> Self {
        TicketId(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_first() {
        let mut pool = TicketIdPool::new(3);
        let ids: Vec<u16> = std::iter::from_fn(|| pool.allocate()).map(TicketId::get).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(pool.is_exhausted());
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn released_gap_is_refilled_first() {
        let mut pool = TicketIdPool::new(4);
        let one = pool.allocate().unwrap();
        let two = pool.allocate().unwrap();
        let _three = pool.allocate().unwrap();

        assert!(pool.release(two));
        assert!(pool.release(one));
        assert_eq!(pool.allocate().unwrap().get(), 1);
        assert_eq!(pool.allocate().unwrap().get(), 2);
        assert_eq!(pool.allocate().unwrap().get(), 4);
    }

    #[test]
    fn double_release_is_a_no_op() {
        let mut pool = TicketIdPool::new(2);
        let id = pool.allocate().unwrap();
        assert!(pool.release(id));
        assert!(!pool.release(id));
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.held(), 0);
    }

    #[test]
    fn foreign_identifiers_are_ignored() {
        let mut pool = TicketIdPool::new(2);
        assert!(!pool.release(TicketId::new_for_test(0)));
        assert!(!pool.release(TicketId::new_for_test(3)));
        assert_eq!(pool.available(), 2);
    }

    /// Free and held sets partition `1..=N` under an arbitrary op sequence.
    #[test]
    fn free_and_held_partition_the_range() {
        let mut pool = TicketIdPool::new(5);
        let mut held: Vec<TicketId> = Vec::new();
        // Deterministic pseudo-random walk over allocate/release.
        let mut x: u32 = 0x2545_f491;
        for _ in 0..500 {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            if x % 3 == 0 && !held.is_empty() {
                let idx = (x as usize / 3) % held.len();
                let id = held.swap_remove(idx);
                assert!(pool.release(id));
            } else if let Some(id) = pool.allocate() {
                assert!(!held.contains(&id), "identifier {id} handed out twice");
                let lowest_free = (1..=5u16)
                    .find(|n| !held.iter().any(|h| h.get() == *n))
                    .unwrap();
                assert_eq!(id.get(), lowest_free);
                held.push(id);
            }

            assert_eq!(pool.held(), held.len());
            assert_eq!(pool.available() + held.len(), 5);
            for n in 1..=5u16 {
                let id = TicketId::new_for_test(n);
                assert_ne!(pool.is_free(id), held.contains(&id));
            }
        }
    }
}
