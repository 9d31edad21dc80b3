//! Bin Allocator - Contiguous Run Assignment
//!
//! First-fit allocation of contiguous active-slot runs to users. Slot 0
//! never belongs to the search domain (it carries the control code), so
//! grants always start at slot 1 or later. The station additionally
//! reserves the identifying-field slots at construction via
//! [`BinAllocator::with_reserved`]; the allocator itself starts with
//! every slot in `1..ACTIVE_BINS` free.
//!
//! Requests are clamped to `1..=MAX_REQUEST_BINS`. The search tries the
//! clamped length first and then degrades one slot at a time, scanning
//! ascending from slot 1 at each length, and returns the first run
//! found. When not even a single slot is free the request fails and no
//! state changes.
//!
//! A user that requests again without deallocating gets a fresh run and
//! the previous run stays marked used with no owner. That slow leak
//! mirrors the deployed station behavior and is logged when it happens.
//!
//! ## Example
//!
//! ```rust
//! use olink_core::{BinAllocator, Lease};
//!
//! let mut alloc = BinAllocator::new();
//! assert_eq!(alloc.allocate(0, 3), Some(Lease { start: 1, count: 3 }));
//! assert_eq!(alloc.allocate(1, 3), Some(Lease { start: 4, count: 3 }));
//! // Only slot 7 is left, so the request degrades to a single slot.
//! assert_eq!(alloc.allocate(2, 3), Some(Lease { start: 7, count: 1 }));
//! assert_eq!(alloc.allocate(3, 1), None);
//! ```

use std::collections::HashMap;

use tracing::warn;

use crate::ACTIVE_BINS;

/// Largest run a single request may claim.
pub const MAX_REQUEST_BINS: usize = 3;

/// A granted run of contiguous active slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    /// First active slot of the run, always in `1..ACTIVE_BINS`.
    pub start: usize,
    /// Number of slots, in `1..=MAX_REQUEST_BINS`.
    pub count: usize,
}

impl Lease {
    /// Largest payload value this run can carry, two bits per slot.
    pub fn max_payload(&self) -> u32 {
        (1u32 << (2 * self.count)) - 1
    }
}

/// Tracks slot occupancy and the lease held by each user.
#[derive(Debug, Default)]
pub struct BinAllocator {
    used: [bool; ACTIVE_BINS],
    leases: HashMap<u8, Lease>,
}

impl BinAllocator {
    /// An allocator with every allocatable slot free.
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator with the given slots pre-marked used. Slots outside
    /// the grid are ignored. Reserved slots are never granted and never
    /// freed.
    pub fn with_reserved(slots: &[usize]) -> Self {
        let mut alloc = Self::new();
        for &slot in slots {
            if slot < ACTIVE_BINS {
                alloc.used[slot] = true;
            }
        }
        alloc
    }

    /// The lease currently held by `user_id`, if any.
    pub fn lease(&self, user_id: u8) -> Option<Lease> {
        self.leases.get(&user_id).copied()
    }

    /// Whether a slot is currently unoccupied.
    pub fn is_free(&self, slot: usize) -> bool {
        slot < ACTIVE_BINS && !self.used[slot]
    }

    /// Number of users currently holding a lease.
    pub fn lease_count(&self) -> usize {
        self.leases.len()
    }

    /// Grant a contiguous run to `user_id`, degrading the requested
    /// length as needed. Returns `None` when no slot at all is free, in
    /// which case nothing changes.
    pub fn allocate(&mut self, user_id: u8, requested: usize) -> Option<Lease> {
        let requested = requested.clamp(1, MAX_REQUEST_BINS);
        for count in (1..=requested).rev() {
            if let Some(start) = self.find_run(count) {
                for slot in start..start + count {
                    self.used[slot] = true;
                }
                let lease = Lease { start, count };
                if let Some(previous) = self.leases.insert(user_id, lease) {
                    // The old run keeps its used marks and now has no
                    // owner; only a full reset reclaims it.
                    warn!(
                        user_id,
                        orphaned_start = previous.start,
                        orphaned_count = previous.count,
                        "re-allocation without deallocate leaks previous run"
                    );
                }
                return Some(lease);
            }
        }
        None
    }

    /// Release the run held by `user_id`. Returns the freed lease, or
    /// `None` when the user held nothing (a no-op).
    pub fn deallocate(&mut self, user_id: u8) -> Option<Lease> {
        let lease = self.leases.remove(&user_id)?;
        for slot in lease.start..lease.start + lease.count {
            self.used[slot] = false;
        }
        Some(lease)
    }

    /// First slot of the lowest free run of exactly `count` slots, or
    /// `None` when no such run exists. Slot 0 is outside the domain.
    fn find_run(&self, count: usize) -> Option<usize> {
        for start in 1..=(ACTIVE_BINS - count) {
            if (start..start + count).all(|slot| !self.used[slot]) {
                return Some(start);
            }
        }
        None
    }
}
