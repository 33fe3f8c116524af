//! Dimension-to-storage-order permutations.
//!
//! A [`LayoutMap`] assigns every logical dimension a storage rank: rank 0 is
//! the contiguous (fastest varying) dimension, the highest rank varies
//! slowest. Dimensions marked [`MASKED`] take no part in addressing.
//!
//! `LayoutMap::new` is a `const fn`, so a malformed map bound to a constant
//! is rejected by the compiler:
//!
//! ```compile_fail
//! use grid_storage::LayoutMap;
//! const BAD: LayoutMap<3> = LayoutMap::new([0, 0, 1]);
//! assert_eq!(BAD.masked_length(), 3);
//! ```

use crate::{LayoutError, Result};

/// Rank marker for a dimension excluded from linear addressing.
pub const MASKED: i32 = -1;

/// Why a rank array is not a valid layout; `Copy` so const fns can return it.
#[derive(Debug, Clone, Copy)]
enum RankDefect {
    OutOfRange { dim: usize, rank: i32 },
    Duplicate { rank: usize },
    Missing { rank: usize },
}

impl RankDefect {
    fn into_error(self, ndim: usize) -> LayoutError {
        match self {
            RankDefect::OutOfRange { dim, rank } => LayoutError::RankOutOfRange { dim, rank, ndim },
            RankDefect::Duplicate { rank } => LayoutError::DuplicateRank { rank },
            RankDefect::Missing { rank } => LayoutError::MissingRank { rank },
        }
    }
}

/// Returns the number of non-masked dimensions if the ranks of those
/// dimensions are exactly `0..n`.
const fn check_ranks<const D: usize>(ranks: &[i32; D]) -> std::result::Result<usize, RankDefect> {
    let mut seen = [false; D];
    let mut count = 0;
    let mut dim = 0;
    while dim < D {
        let rank = ranks[dim];
        if rank != MASKED {
            if rank < 0 || rank as usize >= D {
                return Err(RankDefect::OutOfRange { dim, rank });
            }
            if seen[rank as usize] {
                return Err(RankDefect::Duplicate {
                    rank: rank as usize,
                });
            }
            seen[rank as usize] = true;
            count += 1;
        }
        dim += 1;
    }
    let mut rank = 0;
    while rank < count {
        if !seen[rank] {
            return Err(RankDefect::Missing { rank });
        }
        rank += 1;
    }
    Ok(count)
}

/// Immutable mapping from logical dimension to storage rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutMap<const D: usize> {
    ranks: [i32; D],
    masked_length: usize,
}

impl<const D: usize> LayoutMap<D> {
    /// Creates a layout from per-dimension ranks.
    ///
    /// # Panics
    /// Panics (a compile error in const context) if the non-masked ranks are
    /// not a permutation of `0..n`.
    pub const fn new(ranks: [i32; D]) -> Self {
        match check_ranks(&ranks) {
            Ok(masked_length) => Self {
                ranks,
                masked_length,
            },
            Err(RankDefect::OutOfRange { .. }) => panic!("layout rank out of range"),
            Err(RankDefect::Duplicate { .. }) => panic!("layout contains a duplicate rank"),
            Err(RankDefect::Missing { .. }) => panic!("layout ranks are not contiguous from 0"),
        }
    }

    /// Creates a layout from ranks only known at run time.
    pub fn try_new(ranks: [i32; D]) -> Result<Self> {
        let masked_length = check_ranks(&ranks).map_err(|defect| defect.into_error(D))?;
        Ok(Self {
            ranks,
            masked_length,
        })
    }

    /// Dimension 0 is contiguous, dimension `D - 1` varies slowest.
    pub const fn first_fastest() -> Self {
        let mut ranks = [0i32; D];
        let mut dim = 0;
        while dim < D {
            ranks[dim] = dim as i32;
            dim += 1;
        }
        Self::new(ranks)
    }

    /// Dimension `D - 1` is contiguous, dimension 0 varies slowest.
    pub const fn last_fastest() -> Self {
        let mut ranks = [0i32; D];
        let mut dim = 0;
        while dim < D {
            ranks[dim] = (D - 1 - dim) as i32;
            dim += 1;
        }
        Self::new(ranks)
    }

    #[inline]
    pub const fn ranks(&self) -> &[i32; D] {
        &self.ranks
    }

    /// Number of dimensions that take part in addressing.
    #[inline]
    pub const fn masked_length(&self) -> usize {
        self.masked_length
    }

    /// Storage rank of `dim`, or `None` if it is masked.
    #[inline]
    pub const fn rank(&self, dim: usize) -> Option<usize> {
        let rank = self.ranks[dim];
        if rank == MASKED {
            None
        } else {
            Some(rank as usize)
        }
    }

    #[inline]
    pub const fn is_masked(&self, dim: usize) -> bool {
        self.ranks[dim] == MASKED
    }

    /// The dimension stored at `rank`, if any.
    pub fn dim_at_rank(&self, rank: usize) -> Option<usize> {
        self.ranks
            .iter()
            .position(|&r| r != MASKED && r as usize == rank)
    }

    /// The contiguous dimension. `None` when every dimension is masked.
    pub fn fastest_dim(&self) -> Option<usize> {
        self.dim_at_rank(0)
    }

    /// The slowest varying non-masked dimension.
    pub fn slowest_dim(&self) -> Option<usize> {
        self.masked_length
            .checked_sub(1)
            .and_then(|rank| self.dim_at_rank(rank))
    }

    /// Logical dimensions ordered from fastest to slowest; masked
    /// dimensions follow in ascending order.
    pub fn storage_order(&self) -> [usize; D] {
        let mut order = [0usize; D];
        let mut next = self.masked_length;
        for (dim, &rank) in self.ranks.iter().enumerate() {
            if rank == MASKED {
                order[next] = dim;
                next += 1;
            } else {
                order[rank as usize] = dim;
            }
        }
        order
    }
}
