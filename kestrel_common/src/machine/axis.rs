//! Axis identification and the per-axis bit-set.

use bitflags::bitflags;

use crate::consts::MAX_AXES;

/// Axis letters in index order.
pub const AXIS_LETTERS: [char; MAX_AXES] = ['X', 'Y', 'Z', 'A', 'B', 'C'];

/// Letter for an axis index, `'?'` when out of range.
#[inline]
pub fn axis_letter(axis: usize) -> char {
    AXIS_LETTERS.get(axis).copied().unwrap_or('?')
}

bitflags! {
    /// One bit per axis, keyed by axis index.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AxisMask: u32 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const Z = 1 << 2;
        const A = 1 << 3;
        const B = 1 << 4;
        const C = 1 << 5;
    }
}

impl AxisMask {
    /// Mask with only `axis` set. Out-of-range indices give an empty mask.
    #[inline]
    pub const fn bit(axis: usize) -> Self {
        if axis < MAX_AXES {
            Self::from_bits_retain(1 << axis)
        } else {
            Self::empty()
        }
    }

    /// Whether `axis` is set.
    #[inline]
    pub const fn has_axis(&self, axis: usize) -> bool {
        axis < MAX_AXES && self.bits() & (1 << axis) != 0
    }
}
