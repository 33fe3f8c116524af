//! Owned field data laid out by a shared [`StorageInfo`].
//!
//! Several fields over the same grid hold clones of one
//! `Arc<StorageInfo>`; the storage info never owns field data.

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use crate::storage_info::{StorageInfo, StorageKind};

/// A buffer of `total_length` elements addressed by multi-index.
pub struct Field<T, K: StorageKind<D>, const D: usize> {
    info: Arc<StorageInfo<K, D>>,
    data: Vec<T>,
}

impl<T, K: StorageKind<D>, const D: usize> Field<T, K, D> {
    /// Allocates a field with every element (halo and padding included) set
    /// to `value`.
    pub fn filled(info: Arc<StorageInfo<K, D>>, value: T) -> Self
    where
        T: Clone,
    {
        tracing::debug!(
            id = K::ID,
            total_length = info.total_length(),
            "allocating field"
        );
        let data = vec![value; info.total_length()];
        Self { info, data }
    }

    /// Allocates a default-initialized field.
    pub fn new(info: Arc<StorageInfo<K, D>>) -> Self
    where
        T: Clone + Default,
    {
        Self::filled(info, T::default())
    }

    /// Allocates a field and fills the core region from `f`.
    pub fn from_fn<F>(info: Arc<StorageInfo<K, D>>, f: F) -> Self
    where
        T: Clone + Default,
        F: FnMut([isize; D]) -> T,
    {
        let mut field = Self::new(info);
        field.fill_with(f);
        field
    }

    #[inline]
    pub fn info(&self) -> &Arc<StorageInfo<K, D>> {
        &self.info
    }

    /// Returns true if both fields use the same storage info instance.
    pub fn shares_info_with<U>(&self, other: &Field<U, K, D>) -> bool {
        Arc::ptr_eq(&self.info, &other.info)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Element at `index`, or `None` if outside the addressable range.
    pub fn get(&self, index: [isize; D]) -> Option<&T> {
        let offset = self.info.checked_offset(index).ok()?;
        self.data.get(offset)
    }

    pub fn get_mut(&mut self, index: [isize; D]) -> Option<&mut T> {
        let offset = self.info.checked_offset(index).ok()?;
        self.data.get_mut(offset)
    }

    /// Element at `index` without range checks.
    ///
    /// # Safety
    /// `index` must lie within [`StorageInfo::total_range`] in every
    /// non-masked dimension.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: [isize; D]) -> &T {
        self.data.get_unchecked(self.info.offset(index))
    }

    /// Overwrites the core region with `f(index)`, visiting indices in
    /// storage order. Halo and padding elements are left untouched.
    pub fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut([isize; D]) -> T,
    {
        let info = &self.info;
        for index in info.core_indices() {
            self.data[info.offset(index)] = f(index);
        }
    }

    /// Parallel version of [`fill_with`](Self::fill_with), splitting the
    /// buffer into slabs along the slowest varying dimension. Without the
    /// `parallel` feature this runs sequentially.
    pub fn par_fill_with<F>(&mut self, f: F)
    where
        T: Send,
        F: Fn([isize; D]) -> T + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            if let Some(slowest) = K::LAYOUT.slowest_dim() {
                self.par_fill_slabs(slowest, f);
                return;
            }
        }
        self.fill_with(f);
    }

    #[cfg(feature = "parallel")]
    fn par_fill_slabs<F>(&mut self, slowest: usize, f: F)
    where
        T: Send,
        F: Fn([isize; D]) -> T + Sync,
    {
        use rayon::prelude::*;

        let info = &self.info;
        let slab_len = info.stride(slowest);
        let before = K::HALO.before(slowest) as isize;
        let order = K::LAYOUT.storage_order();
        let mut hi = [0isize; D];
        for (dim, h) in hi.iter_mut().enumerate() {
            *h = info.core_range(dim).end;
        }

        self.data
            .par_chunks_mut(slab_len)
            .enumerate()
            .for_each(|(slab, chunk)| {
                let position = slab as isize - before;
                if !info.core_range(slowest).contains(&position) {
                    return;
                }
                let base = slab * slab_len;
                let mut lo = [0isize; D];
                let mut slab_hi = hi;
                lo[slowest] = position;
                slab_hi[slowest] = position + 1;
                for index in crate::indices::CoreIndices::new(lo, slab_hi, order) {
                    chunk[info.offset(index) - base] = f(index);
                }
            });
    }
}

impl<T: Clone, K: StorageKind<D>, const D: usize> Clone for Field<T, K, D> {
    fn clone(&self) -> Self {
        Self {
            info: Arc::clone(&self.info),
            data: self.data.clone(),
        }
    }
}

impl<T: std::fmt::Debug, K: StorageKind<D>, const D: usize> std::fmt::Debug for Field<T, K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("info", &self.info)
            .field("len", &self.data.len())
            .finish()
    }
}

impl<T, K: StorageKind<D>, const D: usize> Index<[isize; D]> for Field<T, K, D> {
    type Output = T;

    /// # Panics
    /// Panics if `index` is outside the addressable range.
    fn index(&self, index: [isize; D]) -> &T {
        match self.info.checked_offset(index) {
            Ok(offset) => &self.data[offset],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, K: StorageKind<D>, const D: usize> IndexMut<[isize; D]> for Field<T, K, D> {
    fn index_mut(&mut self, index: [isize; D]) -> &mut T {
        match self.info.checked_offset(index) {
            Ok(offset) => &mut self.data[offset],
            Err(err) => panic!("{err}"),
        }
    }
}
