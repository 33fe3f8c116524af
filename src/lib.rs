//! Memory layouts and O(1) offset arithmetic for halo-padded stencil grids.
//!
//! Grid and stencil codes store logically N-dimensional fields in flat
//! buffers. This crate computes, once per configuration, how such a buffer
//! is laid out: which dimension is contiguous, how much boundary padding
//! ("halo") surrounds the core domain, and how the contiguous extent is
//! rounded up for vectorized access. After that, translating a multi-index
//! into a linear offset is a fixed-length multiply-add.
//!
//! # Core Types
//!
//! - [`FixedArray`]: fixed-length value array for coordinates, extents and strides
//! - [`LayoutMap`]: dimension-to-storage-rank permutation, with [`MASKED`] dimensions
//! - [`Halo`]: per-dimension `(before, after)` padding
//! - [`Alignment`]: rounding of the contiguous extent
//! - [`StorageKind`]: type-level bundle of identity, layout, halo and alignment
//! - [`StorageInfo`]: strides, total length and offsets for concrete extents
//! - [`Field`]: owned buffer addressed through a shared `StorageInfo`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use grid_storage::{Field, Halo, LayoutMap, StorageInfo, StorageKind};
//!
//! // k is contiguous, one halo cell on every side.
//! struct Ijk;
//! impl StorageKind<3> for Ijk {
//!     const ID: u32 = 0;
//!     const LAYOUT: LayoutMap<3> = LayoutMap::new([2, 1, 0]);
//!     const HALO: Halo<3> = Halo::symmetric(1);
//! }
//!
//! let info = Arc::new(StorageInfo::<Ijk, 3>::new([4, 4, 2]).unwrap());
//! assert_eq!(info.total_length(), 6 * 6 * 4);
//! assert_eq!(info.strides().as_array(), &[24, 4, 1]);
//!
//! // The interior starts one cell into every dimension.
//! assert_eq!(info.offset([0, 0, 0]), 24 + 4 + 1);
//!
//! let mut u: Field<f64, Ijk, 3> = Field::new(info.clone());
//! u[[-1, 0, 0]] = 1.0;
//! assert_eq!(u.as_slice()[4 + 1], 1.0);
//! ```
//!
//! # Static checks
//!
//! Extents and indices are `[_; D]` arrays, so a wrong dimensionality is a
//! type error. Malformed layouts and zero alignments declared as constants
//! fail const evaluation. Only values that are genuinely runtime data
//! (extents, indices into [`StorageInfo::checked_offset`]) are validated
//! at run time and reported as [`LayoutError`].

mod alignment;
mod field;
mod fixed_array;
mod halo;
mod indices;
mod layout_map;
mod storage_info;

// ============================================================================
// Configuration
// ============================================================================
pub use alignment::Alignment;
pub use halo::Halo;
pub use layout_map::{LayoutMap, MASKED};

// ============================================================================
// Layout engine
// ============================================================================
pub use fixed_array::FixedArray;
pub use indices::CoreIndices;
pub use storage_info::{kinds_compatible, StorageInfo, StorageKind};

// ============================================================================
// Field storage
// ============================================================================
pub use field::Field;

// ============================================================================
// Error types
// ============================================================================

/// Errors reported while building layouts from runtime values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A sequence had the wrong number of dimensions.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// A layout rank is negative (and not the mask marker) or too large.
    #[error("rank {rank} of dim {dim} out of range for a {ndim}-dimensional layout")]
    RankOutOfRange { dim: usize, rank: i32, ndim: usize },

    /// Two dimensions were given the same storage rank.
    #[error("duplicate storage rank {rank}")]
    DuplicateRank { rank: usize },

    /// The non-masked ranks skip a value.
    #[error("storage rank {rank} is missing from the layout")]
    MissingRank { rank: usize },

    /// Alignment of zero elements.
    #[error("alignment must be positive")]
    ZeroAlignment,

    /// A core extent of zero.
    #[error("extent of dim {dim} must be positive")]
    ZeroExtent { dim: usize },

    /// The padded allocation does not fit in `isize`.
    #[error("allocation size overflow")]
    SizeOverflow,

    /// A multi-index component outside the addressable range.
    #[error("index {index} out of range {begin}..{end} for dim {dim}")]
    IndexOutOfRange {
        dim: usize,
        index: isize,
        begin: isize,
        end: isize,
    },
}

/// Result type for layout construction.
pub type Result<T> = std::result::Result<T, LayoutError>;
