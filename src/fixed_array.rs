//! Fixed-capacity, value-semantic arrays used for coordinates, extents and strides.
//!
//! `FixedArray<T, D>` is a thin wrapper around `[T; D]`. Its length is part of
//! the type, so passing the wrong number of coordinates or extents is a
//! compile error rather than a runtime failure. Length-changing operations
//! (`append_dim`, `prepend_dim`, `convert_from`) take the target length as a
//! const parameter and reject a wrong one during monomorphization.
//!
//! Rust arrays never default-initialize their slots, so elements with and
//! without a trivial default share a single representation: every
//! constructor writes each slot exactly once.

use std::ops::{Add, Index, IndexMut, Mul};

use num_traits::{One, Zero};

use crate::{LayoutError, Result};

/// A fixed-capacity sequence of exactly `D` elements.
///
/// # Example
/// ```
/// use grid_storage::FixedArray;
///
/// let a = FixedArray::new([1, 2, 3]);
/// let b: FixedArray<i32, 4> = a.append_dim(4);
/// assert_eq!(b.as_array(), &[1, 2, 3, 4]);
/// assert_eq!(FixedArray::<i32, 4>::size(), 4);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedArray<T, const D: usize> {
    data: [T; D],
}

impl<T, const D: usize> FixedArray<T, D> {
    /// Creates an array from exactly `D` values.
    #[inline]
    pub const fn new(data: [T; D]) -> Self {
        Self { data }
    }

    /// Number of elements, available without an instance.
    #[inline]
    pub const fn size() -> usize {
        D
    }

    /// Number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        D
    }

    /// Returns true if `D == 0`.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        D == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub const fn as_array(&self) -> &[T; D] {
        &self.data
    }

    #[inline]
    pub fn into_array(self) -> [T; D] {
        self.data
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Returns element `i`, or `None` if `i >= D`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// Returns element `i` without bounds checking.
    ///
    /// # Safety
    /// The caller must ensure `i < D`.
    #[inline]
    pub unsafe fn get_unchecked(&self, i: usize) -> &T {
        debug_assert!(i < D, "index {i} out of range for FixedArray of length {D}");
        self.data.get_unchecked(i)
    }

    /// Applies `f` to every element, producing a new array of the same length.
    pub fn map<U, F>(self, f: F) -> FixedArray<U, D>
    where
        F: FnMut(T) -> U,
    {
        FixedArray {
            data: self.data.map(f),
        }
    }
}

impl<T: Clone, const D: usize> FixedArray<T, D> {
    /// Copies another array element-wise, converting each element to `T`.
    ///
    /// The source length `E` must equal `D`; a mismatch fails to compile.
    pub fn convert_from<U, const E: usize>(other: &FixedArray<U, E>) -> Self
    where
        U: Clone,
        T: From<U>,
    {
        const { assert!(E == D, "convert_from requires arrays of equal length") };
        Self {
            data: std::array::from_fn(|i| T::from(other.data[i].clone())),
        }
    }

    /// Returns a new array with `value` inserted after the last element.
    ///
    /// The target length `E` must be `D + 1`; anything else fails to compile.
    pub fn append_dim<const E: usize>(&self, value: T) -> FixedArray<T, E> {
        const { assert!(E == D + 1, "append_dim grows the array by exactly one element") };
        FixedArray {
            data: std::array::from_fn(|i| {
                if i < D {
                    self.data[i].clone()
                } else {
                    value.clone()
                }
            }),
        }
    }

    /// Returns a new array with `value` inserted before the first element.
    ///
    /// The target length `E` must be `D + 1`; anything else fails to compile.
    pub fn prepend_dim<const E: usize>(&self, value: T) -> FixedArray<T, E> {
        const { assert!(E == D + 1, "prepend_dim grows the array by exactly one element") };
        FixedArray {
            data: std::array::from_fn(|i| {
                if i == 0 {
                    value.clone()
                } else {
                    self.data[i - 1].clone()
                }
            }),
        }
    }

    /// Overwrites every element from `src`.
    ///
    /// # Panics
    /// Panics if `src.len() != D`.
    pub fn assign_from(&mut self, src: &[T]) {
        assert_eq!(
            src.len(),
            D,
            "cannot assign {} elements to FixedArray of length {D}",
            src.len()
        );
        self.data.clone_from_slice(src);
    }
}

impl<T, const D: usize> FixedArray<T, D>
where
    T: Copy + Zero + Mul<Output = T> + Add<Output = T>,
{
    /// Sum of element-wise products.
    pub fn dot(&self, other: &Self) -> T {
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
    }
}

impl<T, const D: usize> FixedArray<T, D>
where
    T: Copy + One + Mul<Output = T>,
{
    /// Product of all elements (one for an empty array).
    pub fn product(&self) -> T {
        self.data.iter().fold(T::one(), |acc, &x| acc * x)
    }
}

impl<T: Default, const D: usize> Default for FixedArray<T, D> {
    fn default() -> Self {
        Self {
            data: std::array::from_fn(|_| T::default()),
        }
    }
}

impl<T: std::fmt::Debug, const D: usize> std::fmt::Debug for FixedArray<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

// ============================================================================
// Indexing
// ============================================================================

impl<T, const D: usize> Index<usize> for FixedArray<T, D> {
    type Output = T;

    /// # Panics
    /// Panics if `i >= D`.
    #[inline]
    fn index(&self, i: usize) -> &T {
        assert!(i < D, "index {i} out of range for FixedArray of length {D}");
        &self.data[i]
    }
}

impl<T, const D: usize> IndexMut<usize> for FixedArray<T, D> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        assert!(i < D, "index {i} out of range for FixedArray of length {D}");
        &mut self.data[i]
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl<T, const D: usize> From<[T; D]> for FixedArray<T, D> {
    #[inline]
    fn from(data: [T; D]) -> Self {
        Self { data }
    }
}

impl<T, const D: usize> From<FixedArray<T, D>> for [T; D] {
    #[inline]
    fn from(array: FixedArray<T, D>) -> Self {
        array.data
    }
}

impl<T: Clone, const D: usize> TryFrom<&[T]> for FixedArray<T, D> {
    type Error = LayoutError;

    fn try_from(slice: &[T]) -> Result<Self> {
        if slice.len() != D {
            return Err(LayoutError::RankMismatch(slice.len(), D));
        }
        Ok(Self {
            data: std::array::from_fn(|i| slice[i].clone()),
        })
    }
}

impl<T, const D: usize> AsRef<[T]> for FixedArray<T, D> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T, const D: usize> IntoIterator for FixedArray<T, D> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T, const D: usize> IntoIterator for &'a FixedArray<T, D> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_and_size() {
        let a = FixedArray::new([3usize, 4, 5]);
        assert_eq!(a.len(), 3);
        assert_eq!(FixedArray::<usize, 3>::size(), 3);
        assert_eq!(a[0], 3);
        assert_eq!(a[2], 5);
    }

    #[test]
    fn test_append_prepend_round_trip() {
        let a = FixedArray::new([1, 2, 3]);
        let b: FixedArray<i32, 5> = a.append_dim::<4>(9).prepend_dim(7);
        assert_eq!(b.len(), 5);
        assert_eq!(b[0], 7);
        assert_eq!(b[4], 9);
        assert_eq!(&b.as_slice()[1..4], a.as_slice());
        // value semantics: source is untouched
        assert_eq!(a.as_array(), &[1, 2, 3]);
    }

    #[test]
    fn test_extend_non_copy_elements() {
        let a = FixedArray::new([String::from("i"), String::from("j")]);
        let b: FixedArray<String, 3> = a.append_dim(String::from("k"));
        assert_eq!(b.as_array(), &["i", "j", "k"]);
        let c: FixedArray<String, 3> = a.prepend_dim(String::from("t"));
        assert_eq!(c.as_array(), &["t", "i", "j"]);
    }

    #[test]
    fn test_convert_from_widens() {
        let a = FixedArray::new([1u8, 2, 250]);
        let b: FixedArray<u32, 3> = FixedArray::convert_from(&a);
        assert_eq!(b.as_array(), &[1u32, 2, 250]);
    }

    #[test]
    fn test_try_from_slice() {
        let ok: FixedArray<i64, 2> = FixedArray::try_from(&[4i64, 5][..]).unwrap();
        assert_eq!(ok.as_array(), &[4, 5]);

        let err = FixedArray::<i64, 2>::try_from(&[1i64, 2, 3][..]).unwrap_err();
        assert_eq!(err, LayoutError::RankMismatch(3, 2));
    }

    #[test]
    fn test_dot_and_product() {
        let a = FixedArray::new([1.5f64, 2.0, -1.0]);
        let b = FixedArray::new([2.0f64, 0.25, 4.0]);
        assert_relative_eq!(a.dot(&b), 3.0 + 0.5 - 4.0, epsilon = 1e-12);

        let e = FixedArray::new([4usize, 5, 6]);
        assert_eq!(e.product(), 120);
        assert_eq!(FixedArray::<usize, 0>::new([]).product(), 1);
    }

    #[test]
    fn test_assign_from() {
        let mut a = FixedArray::new([0i32; 3]);
        a.assign_from(&[7, 8, 9]);
        assert_eq!(a.as_array(), &[7, 8, 9]);
    }

    #[test]
    #[should_panic(expected = "cannot assign")]
    fn test_assign_from_wrong_length() {
        let mut a = FixedArray::new([0i32; 3]);
        a.assign_from(&[1, 2]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_checked_index_panics() {
        let a = FixedArray::new([1, 2, 3]);
        let i = a.len();
        let _ = a[i];
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_checked_index_mut_panics() {
        let mut a = FixedArray::new([1, 2, 3]);
        a[3] = 0;
    }

    #[test]
    fn test_get_and_unchecked() {
        let a = FixedArray::new([10, 20]);
        assert_eq!(a.get(1), Some(&20));
        assert_eq!(a.get(2), None);
        assert_eq!(unsafe { *a.get_unchecked(0) }, 10);
    }

    #[test]
    fn test_map_and_iter() {
        let a = FixedArray::new([1, 2, 3]).map(|x| x * 10);
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
        let total: i32 = a.into_iter().sum();
        assert_eq!(total, 60);
        assert_eq!(format!("{:?}", a), "[10, 20, 30]");
    }

    #[test]
    fn test_default() {
        let a: FixedArray<String, 40> = FixedArray::default();
        assert!(a.iter().all(String::is_empty));
    }
}
