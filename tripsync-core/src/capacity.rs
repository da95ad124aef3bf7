//! The per-slot capacity rule.

use crate::slot::Slot;

/// Places allowed in one slot unless configured otherwise.
pub const DEFAULT_SLOT_LIMIT: usize = 3;

/// Gate additions so no slot holds more than `limit` places.
///
/// Slots are compared by exact `HH:mm` equality; neighbouring or overlapping
/// times are unrelated.
///
/// # Examples
///
/// ```
/// use tripsync_core::{Slot, SlotCapacity};
///
/// let two: Slot = "14:00".parse()?;
/// let occupied = vec![two, two, two];
/// let policy = SlotCapacity::default();
/// assert!(!policy.admits(&occupied, &two));
/// let three: Slot = "15:00".parse()?;
/// assert!(policy.admits(&occupied, &three));
/// # Ok::<(), tripsync_core::SlotError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCapacity {
    limit: usize,
}

impl Default for SlotCapacity {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SLOT_LIMIT,
        }
    }
}

impl SlotCapacity {
    /// Construct a policy with an explicit limit.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Configured limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of occupied slots equal to `slot`.
    pub fn count<'a, I>(occupied: I, slot: &Slot) -> usize
    where
        I: IntoIterator<Item = &'a Slot>,
    {
        occupied.into_iter().filter(|s| *s == slot).count()
    }

    /// Whether another place may join `slot`.
    pub fn admits<'a, I>(&self, occupied: I, slot: &Slot) -> bool
    where
        I: IntoIterator<Item = &'a Slot>,
    {
        Self::count(occupied, slot) < self.limit
    }
}
