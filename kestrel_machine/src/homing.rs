//! Homing requirement mask.
//!
//! One bit per axis, set when that axis has a homing section and has
//! completed `AxisGroup::init()`. Writers: `AxisGroup::init()` (set only) and
//! the bootstrap sequence (clear on configuration load). Everything else
//! reads.

use std::sync::atomic::{AtomicU32, Ordering};

use kestrel_common::machine::axis::AxisMask;

/// Axes that require a homing cycle before motion is permitted.
#[derive(Debug, Default)]
pub struct HomingMask(AtomicU32);

impl HomingMask {
    /// Empty mask.
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Mark `axis` as requiring homing.
    #[inline]
    pub fn set_bit(&self, axis: usize) {
        self.0.fetch_or(AxisMask::bit(axis).bits(), Ordering::AcqRel);
    }

    #[inline]
    pub fn is_set(&self, axis: usize) -> bool {
        self.mask().has_axis(axis)
    }

    /// Whether any axis requires homing.
    #[inline]
    pub fn any(&self) -> bool {
        self.0.load(Ordering::Acquire) != 0
    }

    /// Clear every bit. Called before the mask is rebuilt from a fresh configuration.
    #[inline]
    pub fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }

    /// Snapshot of the mask.
    #[inline]
    pub fn mask(&self) -> AxisMask {
        AxisMask::from_bits_retain(self.0.load(Ordering::Acquire))
    }
}
