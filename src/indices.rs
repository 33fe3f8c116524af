//! Iteration over rectangular multi-index boxes in storage order.

use std::iter::FusedIterator;

/// Iterator over every multi-index in `lo..hi` (per dimension), advancing
/// the fastest-varying dimension first so that offsets increase
/// monotonically.
#[derive(Debug, Clone)]
pub struct CoreIndices<const D: usize> {
    lo: [isize; D],
    hi: [isize; D],
    order: [usize; D],
    current: [isize; D],
    remaining: usize,
}

impl<const D: usize> CoreIndices<D> {
    /// `order` lists dimensions from fastest to slowest.
    pub(crate) fn new(lo: [isize; D], hi: [isize; D], order: [usize; D]) -> Self {
        let remaining = lo
            .iter()
            .zip(hi.iter())
            .map(|(&l, &h)| (h - l).max(0) as usize)
            .product();
        Self {
            lo,
            hi,
            order,
            current: lo,
            remaining,
        }
    }

    fn advance(&mut self) {
        for &dim in &self.order {
            self.current[dim] += 1;
            if self.current[dim] < self.hi[dim] {
                return;
            }
            self.current[dim] = self.lo[dim];
        }
    }
}

impl<const D: usize> Iterator for CoreIndices<D> {
    type Item = [isize; D];

    fn next(&mut self) -> Option<[isize; D]> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.current;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const D: usize> ExactSizeIterator for CoreIndices<D> {}

impl<const D: usize> FusedIterator for CoreIndices<D> {}
