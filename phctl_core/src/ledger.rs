//! Lifetime dose counters, one slot per channel.

use std::sync::Mutex;

use crate::decider::Direction;

/// Monotonically non-decreasing per-channel totals of issued dose pulses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentCounters {
    pub dose_up: u64,
    pub dose_down: u64,
}

impl AdjustmentCounters {
    pub fn for_direction(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Up => self.dose_up,
            Direction::Down => self.dose_down,
        }
    }
}

/// Channel-indexed counter storage. Each slot has its own lock, so channels
/// mutate independently; there is no global lock to contend on.
#[derive(Debug)]
pub struct AdjustmentLedger {
    slots: Vec<Mutex<AdjustmentCounters>>,
}

impl AdjustmentLedger {
    /// One zeroed slot per channel in the configured set.
    pub fn new(channels: usize) -> Self {
        Self {
            slots: (0..channels).map(|_| Mutex::new(AdjustmentCounters::default())).collect(),
        }
    }

    /// Startup-only: overwrite a slot with recovered counters. Must not be
    /// called once workers have begun recording.
    pub fn seed(&self, idx: usize, counters: AdjustmentCounters) {
        if let Some(slot) = self.slots.get(idx) {
            *lock(slot) = counters;
        } else {
            debug_assert!(false, "ledger seed out of range: {idx}");
        }
    }

    /// Add `pulses` to the counter matching `direction` and return the
    /// updated snapshot. The counter tracks total pulses issued, not
    /// sequences.
    pub fn record(&self, idx: usize, direction: Direction, pulses: u32) -> AdjustmentCounters {
        let Some(slot) = self.slots.get(idx) else {
            debug_assert!(false, "ledger record out of range: {idx}");
            return AdjustmentCounters::default();
        };
        let mut counters = lock(slot);
        match direction {
            Direction::Up => counters.dose_up += u64::from(pulses),
            Direction::Down => counters.dose_down += u64::from(pulses),
        }
        *counters
    }

    /// Read-only view of one channel's counters.
    pub fn snapshot(&self, idx: usize) -> AdjustmentCounters {
        self.slots.get(idx).map_or_else(
            || {
                debug_assert!(false, "ledger snapshot out of range: {idx}");
                AdjustmentCounters::default()
            },
            |slot| *lock(slot),
        )
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// A poisoned slot still holds valid counter data; keep counting.
fn lock(slot: &Mutex<AdjustmentCounters>) -> std::sync::MutexGuard<'_, AdjustmentCounters> {
    slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
