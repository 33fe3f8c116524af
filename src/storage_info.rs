//! The layout/offset engine.
//!
//! A [`StorageInfo`] combines a [`StorageKind`] (layout permutation, halo and
//! alignment, fixed at compile time) with concrete core extents. At
//! construction it derives, once:
//!
//! - the padded extent of every dimension: `extent + before + after`, with
//!   the contiguous dimension rounded up to the alignment,
//! - the stride of every dimension, accumulated in storage-rank order,
//! - the total allocation length.
//!
//! After that every query is a pure function of this state. [`offset`] is
//! the hot path: a fixed-length multiply-add over `D` dimensions with no
//! branching and no allocation.
//!
//! [`offset`]: StorageInfo::offset

use std::marker::PhantomData;
use std::ops::Range;

use crate::alignment::Alignment;
use crate::fixed_array::FixedArray;
use crate::halo::Halo;
use crate::indices::CoreIndices;
use crate::layout_map::LayoutMap;
use crate::{LayoutError, Result};

/// Type-level storage configuration.
///
/// Each implementing type describes one layout configuration. Two kinds with
/// equal `ID`, `LAYOUT`, `HALO` and `ALIGNMENT` are interchangeable, even if
/// declared separately. Reusing an `ID` for a different configuration is
/// not detected.
///
/// # Example
/// ```
/// use grid_storage::{Alignment, Halo, LayoutMap, StorageInfo, StorageKind};
///
/// struct Ijk;
///
/// impl StorageKind<3> for Ijk {
///     const ID: u32 = 0;
///     const LAYOUT: LayoutMap<3> = LayoutMap::new([2, 1, 0]);
///     const HALO: Halo<3> = Halo::symmetric(1);
///     const ALIGNMENT: Alignment = Alignment::new(4);
/// }
///
/// let info = StorageInfo::<Ijk, 3>::new([8, 8, 4]).unwrap();
/// assert_eq!(info.padded_extent(2), 8);
/// assert_eq!(info.stride(2), 1);
/// assert_eq!(info.total_length(), 10 * 10 * 8);
/// ```
pub trait StorageKind<const D: usize>: 'static {
    /// Identity tag shared by interchangeable storages.
    const ID: u32;
    const LAYOUT: LayoutMap<D>;
    const HALO: Halo<D> = Halo::zero();
    const ALIGNMENT: Alignment = Alignment::NONE;
}

/// Returns true if storages of kinds `A` and `B` are interchangeable.
pub fn kinds_compatible<A, B, const D: usize>() -> bool
where
    A: StorageKind<D>,
    B: StorageKind<D>,
{
    A::ID == B::ID && A::LAYOUT == B::LAYOUT && A::HALO == B::HALO && A::ALIGNMENT == B::ALIGNMENT
}

/// Immutable layout descriptor for a `D`-dimensional storage of kind `K`.
pub struct StorageInfo<K: StorageKind<D>, const D: usize> {
    extents: FixedArray<usize, D>,
    padded: FixedArray<usize, D>,
    strides: FixedArray<usize, D>,
    total_length: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: StorageKind<D>, const D: usize> StorageInfo<K, D> {
    /// Derives padded extents, strides and total length from the core extents.
    ///
    /// # Errors
    /// - [`LayoutError::ZeroExtent`] if any extent is zero.
    /// - [`LayoutError::SizeOverflow`] if the allocation does not fit in `isize`.
    pub fn new(extents: [usize; D]) -> Result<Self> {
        Self::from_extents(FixedArray::new(extents))
    }

    /// Same as [`new`](Self::new), taking the extents as a [`FixedArray`].
    pub fn from_extents(extents: FixedArray<usize, D>) -> Result<Self> {
        let layout = K::LAYOUT;
        let halo = K::HALO;

        let mut padded = FixedArray::new([1usize; D]);
        for dim in 0..D {
            if extents[dim] == 0 {
                return Err(LayoutError::ZeroExtent { dim });
            }
            let Some(rank) = layout.rank(dim) else {
                continue;
            };
            let mut extent = halo
                .checked_total(dim)
                .and_then(|padding| extents[dim].checked_add(padding))
                .ok_or(LayoutError::SizeOverflow)?;
            if rank == 0 {
                extent = K::ALIGNMENT
                    .checked_round_up(extent)
                    .ok_or(LayoutError::SizeOverflow)?;
            }
            padded[dim] = extent;
        }

        let mut strides = FixedArray::new([0usize; D]);
        let mut total_length = 1usize;
        for &dim in &layout.storage_order()[..layout.masked_length()] {
            strides[dim] = total_length;
            total_length = total_length
                .checked_mul(padded[dim])
                .ok_or(LayoutError::SizeOverflow)?;
        }
        if total_length > isize::MAX as usize {
            return Err(LayoutError::SizeOverflow);
        }

        tracing::debug!(
            id = K::ID,
            extents = ?extents,
            padded = ?padded,
            strides = ?strides,
            total_length,
            "derived storage layout"
        );

        Ok(Self {
            extents,
            padded,
            strides,
            total_length,
            _kind: PhantomData,
        })
    }

    #[inline]
    pub fn id() -> u32 {
        K::ID
    }

    #[inline]
    pub fn layout() -> LayoutMap<D> {
        K::LAYOUT
    }

    #[inline]
    pub fn halo() -> Halo<D> {
        K::HALO
    }

    #[inline]
    pub fn alignment() -> Alignment {
        K::ALIGNMENT
    }

    /// Number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        D
    }

    /// Core extent of `dim`, as passed at construction.
    #[inline]
    pub fn extent(&self, dim: usize) -> usize {
        self.extents[dim]
    }

    #[inline]
    pub fn extents(&self) -> &FixedArray<usize, D> {
        &self.extents
    }

    /// Allocated extent of `dim`, including halo and alignment padding.
    /// Masked dimensions have a padded extent of one.
    #[inline]
    pub fn padded_extent(&self, dim: usize) -> usize {
        self.padded[dim]
    }

    #[inline]
    pub fn padded_extents(&self) -> &FixedArray<usize, D> {
        &self.padded
    }

    /// Stride of `dim` in elements; zero for masked dimensions.
    #[inline]
    pub fn stride(&self, dim: usize) -> usize {
        self.strides[dim]
    }

    #[inline]
    pub fn strides(&self) -> &FixedArray<usize, D> {
        &self.strides
    }

    /// Number of elements a buffer for this layout must hold.
    #[inline]
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Alias of [`total_length`](Self::total_length).
    #[inline]
    pub fn padded_length(&self) -> usize {
        self.total_length
    }

    /// Number of elements in the core domain (masked dimensions count once).
    pub fn core_length(&self) -> usize {
        (0..D)
            .filter(|&dim| !K::LAYOUT.is_masked(dim))
            .map(|dim| self.extents[dim])
            .product()
    }

    /// Valid core indices of `dim`. A masked dimension only has index 0.
    pub fn core_range(&self, dim: usize) -> Range<isize> {
        if K::LAYOUT.is_masked(dim) {
            return 0..1;
        }
        0..self.extents[dim] as isize
    }

    /// Addressable indices of `dim`, halo included.
    pub fn total_range(&self, dim: usize) -> Range<isize> {
        if K::LAYOUT.is_masked(dim) {
            return 0..1;
        }
        let halo = K::HALO;
        -(halo.before(dim) as isize)..(self.extents[dim] + halo.after(dim)) as isize
    }

    /// Linear offset of a multi-index. Indices may reach into the halo
    /// (down to `-before`); the index of a masked dimension is ignored.
    ///
    /// No range check is made in release builds. Use
    /// [`checked_offset`](Self::checked_offset) for untrusted indices.
    #[inline]
    pub fn offset(&self, index: [isize; D]) -> usize {
        let halo = K::HALO;
        let mut offset = 0isize;
        for dim in 0..D {
            debug_assert!(
                self.index_in_range(dim, index[dim]),
                "index {} out of range {:?} for dim {dim}",
                index[dim],
                self.total_range(dim)
            );
            offset += (index[dim] + halo.before(dim) as isize) * self.strides[dim] as isize;
        }
        offset as usize
    }

    /// Like [`offset`](Self::offset), rejecting indices outside
    /// [`total_range`](Self::total_range). As in `offset`, the index of a
    /// masked dimension is ignored and never rejected.
    pub fn checked_offset(&self, index: [isize; D]) -> Result<usize> {
        for (dim, &i) in index.iter().enumerate() {
            if !self.index_in_range(dim, i) {
                let range = self.total_range(dim);
                return Err(LayoutError::IndexOutOfRange {
                    dim,
                    index: i,
                    begin: range.start,
                    end: range.end,
                });
            }
        }
        Ok(self.offset(index))
    }

    /// Offset of the all-zero index: the start of the core region.
    pub fn first_offset(&self) -> usize {
        self.offset([0; D])
    }

    /// Inverse of [`offset`](Self::offset). Returns `None` for offsets past
    /// the buffer or inside alignment padding.
    pub fn coordinates(&self, offset: usize) -> Option<[isize; D]> {
        if offset >= self.total_length {
            return None;
        }
        let halo = K::HALO;
        let mut index = [0isize; D];
        for dim in 0..D {
            if K::LAYOUT.is_masked(dim) {
                continue;
            }
            let position = (offset / self.strides[dim]) % self.padded[dim];
            if position >= self.extents[dim] + halo.total(dim) {
                return None;
            }
            index[dim] = position as isize - halo.before(dim) as isize;
        }
        Some(index)
    }

    /// Iterates over the core domain in storage order.
    pub fn core_indices(&self) -> CoreIndices<D> {
        let mut hi = [0isize; D];
        for (dim, h) in hi.iter_mut().enumerate() {
            *h = self.core_range(dim).end;
        }
        CoreIndices::new([0; D], hi, K::LAYOUT.storage_order())
    }

    /// Returns true if `other` has an interchangeable kind. Extents are not
    /// compared.
    pub fn is_compatible_with<K2: StorageKind<D>>(&self, _other: &StorageInfo<K2, D>) -> bool {
        kinds_compatible::<K, K2, D>()
    }

    #[inline]
    fn index_in_range(&self, dim: usize, index: isize) -> bool {
        if K::LAYOUT.is_masked(dim) {
            return true;
        }
        let halo = K::HALO;
        index >= -(halo.before(dim) as isize)
            && index < (self.extents[dim] + halo.after(dim)) as isize
    }
}

impl<K: StorageKind<D>, const D: usize> Clone for StorageInfo<K, D> {
    fn clone(&self) -> Self {
        Self {
            extents: self.extents,
            padded: self.padded,
            strides: self.strides,
            total_length: self.total_length,
            _kind: PhantomData,
        }
    }
}

impl<K: StorageKind<D>, const D: usize> PartialEq for StorageInfo<K, D> {
    fn eq(&self, other: &Self) -> bool {
        self.extents == other.extents
    }
}

impl<K: StorageKind<D>, const D: usize> Eq for StorageInfo<K, D> {}

impl<K: StorageKind<D>, const D: usize> std::fmt::Debug for StorageInfo<K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageInfo")
            .field("id", &K::ID)
            .field("extents", &self.extents)
            .field("padded", &self.padded)
            .field("strides", &self.strides)
            .field("total_length", &self.total_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_map::MASKED;

    struct FirstFastest;
    impl StorageKind<3> for FirstFastest {
        const ID: u32 = 0;
        const LAYOUT: LayoutMap<3> = LayoutMap::first_fastest();
    }

    struct Haloed;
    impl StorageKind<3> for Haloed {
        const ID: u32 = 1;
        const LAYOUT: LayoutMap<3> = LayoutMap::first_fastest();
        const HALO: Halo<3> = Halo::symmetric(1);
    }

    struct Aligned;
    impl StorageKind<2> for Aligned {
        const ID: u32 = 2;
        const LAYOUT: LayoutMap<2> = LayoutMap::new([1, 0]);
        const ALIGNMENT: Alignment = Alignment::new(8);
    }

    struct Planar;
    impl StorageKind<3> for Planar {
        const ID: u32 = 3;
        const LAYOUT: LayoutMap<3> = LayoutMap::new([0, 1, MASKED]);
        const HALO: Halo<3> = Halo::from_pairs([(1, 1), (0, 2), (5, 5)]);
    }

    #[test]
    fn test_first_fastest_strides() {
        let info = StorageInfo::<FirstFastest, 3>::new([4, 5, 6]).unwrap();
        assert_eq!(info.strides().as_array(), &[1, 4, 20]);
        assert_eq!(info.total_length(), 120);
        assert_eq!(info.offset([1, 2, 3]), 1 + 8 + 60);
        assert_eq!(info.first_offset(), 0);
    }

    #[test]
    fn test_halo_interior_start() {
        let info = StorageInfo::<Haloed, 3>::new([2, 2, 2]).unwrap();
        assert_eq!(info.total_length(), 64);
        assert_eq!(info.strides().as_array(), &[1, 4, 16]);
        assert_eq!(info.offset([0, 0, 0]), 1 + 4 + 16);
        assert_eq!(info.offset([-1, -1, -1]), 0);
        assert_eq!(info.offset([2, 2, 2]), 63);
    }

    #[test]
    fn test_alignment_rounds_fastest_dim() {
        let info = StorageInfo::<Aligned, 2>::new([3, 5]).unwrap();
        assert_eq!(info.padded_extent(1), 8);
        assert_eq!(info.padded_extent(0), 3);
        assert_eq!(info.strides().as_array(), &[8, 1]);
        assert_eq!(info.total_length(), 24);
        // alignment padding is not addressable
        assert_eq!(info.coordinates(6), None);
        assert_eq!(info.coordinates(9), Some([1, 1]));
    }

    #[test]
    fn test_masked_dimension_is_ignored() {
        let info = StorageInfo::<Planar, 3>::new([4, 3, 7]).unwrap();
        assert_eq!(info.padded_extents().as_array(), &[6, 5, 1]);
        assert_eq!(info.strides().as_array(), &[1, 6, 0]);
        assert_eq!(info.total_length(), 30);
        assert_eq!(info.offset([0, 0, 0]), info.offset([0, 0, 42]));
        assert_eq!(info.core_range(2), 0..1);
        assert_eq!(info.total_range(1), 0..5);
        assert_eq!(info.core_length(), 12);
        assert_eq!(info.core_indices().count(), 12);
    }

    #[test]
    fn test_zero_extent_rejected() {
        let err = StorageInfo::<FirstFastest, 3>::new([4, 0, 6]).unwrap_err();
        assert_eq!(err, LayoutError::ZeroExtent { dim: 1 });
    }

    #[test]
    fn test_overflow_rejected() {
        let err = StorageInfo::<FirstFastest, 3>::new([usize::MAX / 2, 4, 4]).unwrap_err();
        assert_eq!(err, LayoutError::SizeOverflow);
    }

    #[test]
    fn test_halo_overflow_rejected() {
        struct HugeHalo;
        impl StorageKind<2> for HugeHalo {
            const ID: u32 = 4;
            const LAYOUT: LayoutMap<2> = LayoutMap::first_fastest();
            const HALO: Halo<2> = Halo::new([usize::MAX, 0], [1, 0]);
        }

        let err = StorageInfo::<HugeHalo, 2>::new([3, 4]).unwrap_err();
        assert_eq!(err, LayoutError::SizeOverflow);
    }

    #[test]
    fn test_checked_offset_ignores_masked_index() {
        let info = StorageInfo::<Planar, 3>::new([4, 3, 7]).unwrap();
        assert_eq!(info.total_range(2), 0..1);
        assert_eq!(info.checked_offset([1, 2, 42]), Ok(info.offset([1, 2, 0])));
        assert!(info.checked_offset([1, 5, 0]).is_err());
    }

    #[test]
    fn test_checked_offset() {
        let info = StorageInfo::<Haloed, 3>::new([2, 2, 2]).unwrap();
        assert_eq!(info.checked_offset([-1, 0, 2]), Ok(info.offset([-1, 0, 2])));
        assert_eq!(
            info.checked_offset([0, 3, 0]),
            Err(LayoutError::IndexOutOfRange {
                dim: 1,
                index: 3,
                begin: -1,
                end: 3
            })
        );
    }

    #[test]
    fn test_coordinates_round_trip() {
        let info = StorageInfo::<Haloed, 3>::new([3, 2, 4]).unwrap();
        for index in info.core_indices() {
            assert_eq!(info.coordinates(info.offset(index)), Some(index));
        }
        assert_eq!(info.coordinates(info.total_length()), None);
    }

    #[test]
    fn test_core_indices_in_storage_order() {
        let info = StorageInfo::<Aligned, 2>::new([3, 5]).unwrap();
        let offsets: Vec<usize> = info.core_indices().map(|i| info.offset(i)).collect();
        assert_eq!(offsets.len(), 15);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_compatibility() {
        struct FirstFastestAgain;
        impl StorageKind<3> for FirstFastestAgain {
            const ID: u32 = 0;
            const LAYOUT: LayoutMap<3> = LayoutMap::new([0, 1, 2]);
        }

        let a = StorageInfo::<FirstFastest, 3>::new([4, 5, 6]).unwrap();
        let b = StorageInfo::<FirstFastestAgain, 3>::new([7, 7, 7]).unwrap();
        let c = StorageInfo::<Haloed, 3>::new([4, 5, 6]).unwrap();
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&c));
        assert!(kinds_compatible::<Haloed, Haloed, 3>());
    }

    #[test]
    fn test_shared_across_threads() {
        let info = std::sync::Arc::new(StorageInfo::<Haloed, 3>::new([8, 8, 8]).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|k| {
                let info = info.clone();
                std::thread::spawn(move || info.offset([k, k, k]))
            })
            .collect();
        for (k, handle) in handles.into_iter().enumerate() {
            let k = k as isize;
            assert_eq!(handle.join().unwrap(), info.offset([k, k, k]));
        }
    }
}
