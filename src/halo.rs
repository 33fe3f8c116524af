//! Per-dimension boundary padding.

/// Number of extra addressable elements before and after the core domain
/// in each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Halo<const D: usize> {
    before: [usize; D],
    after: [usize; D],
}

impl<const D: usize> Halo<D> {
    /// No padding in any dimension.
    pub const fn zero() -> Self {
        Self {
            before: [0; D],
            after: [0; D],
        }
    }

    /// `width` elements on both sides of every dimension.
    pub const fn symmetric(width: usize) -> Self {
        Self {
            before: [width; D],
            after: [width; D],
        }
    }

    pub const fn new(before: [usize; D], after: [usize; D]) -> Self {
        Self { before, after }
    }

    /// Builds a halo from `(before, after)` pairs.
    pub const fn from_pairs(pairs: [(usize, usize); D]) -> Self {
        let mut before = [0; D];
        let mut after = [0; D];
        let mut dim = 0;
        while dim < D {
            before[dim] = pairs[dim].0;
            after[dim] = pairs[dim].1;
            dim += 1;
        }
        Self { before, after }
    }

    #[inline]
    pub const fn before(&self, dim: usize) -> usize {
        self.before[dim]
    }

    #[inline]
    pub const fn after(&self, dim: usize) -> usize {
        self.after[dim]
    }

    /// Padding added to the extent of `dim`.
    #[inline]
    pub const fn total(&self, dim: usize) -> usize {
        self.before[dim] + self.after[dim]
    }

    /// Like [`total`](Self::total), returning `None` on overflow.
    #[inline]
    pub const fn checked_total(&self, dim: usize) -> Option<usize> {
        self.before[dim].checked_add(self.after[dim])
    }

    pub fn is_zero(&self) -> bool {
        self.before.iter().chain(self.after.iter()).all(|&w| w == 0)
    }
}

impl<const D: usize> Default for Halo<D> {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        let halo: Halo<3> = Halo::default();
        assert!(halo.is_zero());
        assert_eq!(halo, Halo::zero());
    }

    #[test]
    fn test_asymmetric_pairs() {
        const HALO: Halo<2> = Halo::from_pairs([(1, 2), (0, 3)]);
        assert_eq!(HALO.before(0), 1);
        assert_eq!(HALO.after(0), 2);
        assert_eq!(HALO.total(1), 3);
        assert!(!HALO.is_zero());
        assert_eq!(HALO, Halo::new([1, 0], [2, 3]));
    }

    #[test]
    fn test_symmetric() {
        let halo: Halo<3> = Halo::symmetric(2);
        assert!((0..3).all(|d| halo.before(d) == 2 && halo.after(d) == 2));
    }

    #[test]
    fn test_checked_total_overflow() {
        let halo: Halo<2> = Halo::new([usize::MAX, 3], [1, 4]);
        assert_eq!(halo.checked_total(0), None);
        assert_eq!(halo.checked_total(1), Some(7));
    }
}
