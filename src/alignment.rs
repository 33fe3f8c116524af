//! Extent alignment for vectorized and device access.

use crate::{LayoutError, Result};

/// Boundary, in elements, to which the padded extent of the contiguous
/// dimension is rounded up. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alignment(usize);

impl Alignment {
    /// No alignment (boundary of one element).
    pub const NONE: Alignment = Alignment(1);

    /// # Panics
    /// Panics (a compile error in const context) if `elements == 0`.
    ///
    /// ```compile_fail
    /// use grid_storage::Alignment;
    /// const ZERO: Alignment = Alignment::new(0);
    /// assert_eq!(ZERO.get(), 0);
    /// ```
    pub const fn new(elements: usize) -> Self {
        assert!(elements > 0, "alignment must be positive");
        Self(elements)
    }

    pub fn try_new(elements: usize) -> Result<Self> {
        if elements == 0 {
            return Err(LayoutError::ZeroAlignment);
        }
        Ok(Self(elements))
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Smallest multiple of the alignment that is `>= extent`.
    ///
    /// # Panics
    /// Panics on overflow; see [`Alignment::checked_round_up`].
    #[inline]
    pub const fn round_up(self, extent: usize) -> usize {
        extent.div_ceil(self.0) * self.0
    }

    pub const fn checked_round_up(self, extent: usize) -> Option<usize> {
        let rem = extent % self.0;
        if rem == 0 {
            Some(extent)
        } else {
            extent.checked_add(self.0 - rem)
        }
    }

    #[inline]
    pub const fn is_aligned(self, extent: usize) -> bool {
        extent % self.0 == 0
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::NONE
    }
}
