use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};
use std::slice::{self, SliceIndex};

use super::deleter::{DefaultArrayDeleter, Deleter};
use crate::alloc::{AllocError, DefaultAllocator};
use crate::contiguous::darray::guard::InitGuard;
use crate::contiguous::darray::storage::RawStorage;

/// A fixed-count owning pointer to a heap slice, with a pluggable [`Deleter`]. The length is fixed
/// at construction; elements are reachable by index, never by value deref, since the pointee is a
/// slice rather than a single value.
///
/// Unlike [`DArray`](crate::contiguous::DArray), an `OwnedArray` can neither grow nor shrink; it
/// is the slice analog of [`OwnedValue`](super::OwnedValue).
pub struct OwnedArray<T, D: Deleter<[T]> = DefaultArrayDeleter> {
    ptr: NonNull<[T]>,
    deleter: D,
    _marker: PhantomData<T>,
}

impl<T> OwnedArray<T> {
    /// Creates an owned slice of `count` default values under the default deleter.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated. A count of 0 never allocates.
    ///
    /// # Examples
    /// ```
    /// # use darray::owned::OwnedArray;
    /// let arr: OwnedArray<u8> = OwnedArray::repeat_default(3).unwrap();
    /// assert_eq!(arr.as_slice(), &[0, 0, 0]);
    /// ```
    pub fn repeat_default(count: usize) -> Result<OwnedArray<T>, AllocError>
    where
        T: Default,
    {
        Self::build(count, |_| T::default())
    }

    /// Creates an owned slice of `count` values produced by `fill`, called with each index in
    /// order. A panicking `fill` destroys the previously produced elements in reverse order and
    /// releases the block before the panic continues.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::owned::OwnedArray;
    /// let arr = OwnedArray::from_fn(4, |i| i * i).unwrap();
    /// assert_eq!(arr.as_slice(), &[0, 1, 4, 9]);
    /// ```
    pub fn from_fn(count: usize, fill: impl FnMut(usize) -> T) -> Result<OwnedArray<T>, AllocError> {
        Self::build(count, fill)
    }

    fn build(count: usize, mut fill: impl FnMut(usize) -> T) -> Result<OwnedArray<T>, AllocError> {
        let buf = RawStorage::<T, DefaultAllocator>::allocate_in(DefaultAllocator, count)?;

        // SAFETY: The fresh block has room for exactly `count` elements.
        let mut guard = unsafe { InitGuard::new(buf.ptr) };
        for index in 0..count {
            guard.push(fill(index));
        }
        guard.complete();

        // SAFETY: The block (now fully initialized) moves to the owner, whose default deleter
        // returns it through the same allocator.
        unsafe {
            let (ptr, cap) = buf.into_raw_parts();
            Ok(OwnedArray::from_parts(
                NonNull::slice_from_raw_parts(ptr, cap),
                DefaultArrayDeleter,
            ))
        }
    }
}

impl<T, D: Deleter<[T]>> OwnedArray<T, D> {
    /// Assembles an owner from a raw slice pointer and the deleter which knows how to dispose of
    /// it.
    ///
    /// # Safety
    /// `ptr` must reference live elements which nothing else owns, and `deleter` must be able to
    /// dispose of them.
    pub const unsafe fn from_parts(ptr: NonNull<[T]>, deleter: D) -> OwnedArray<T, D> {
        OwnedArray {
            ptr,
            deleter,
            _marker: PhantomData,
        }
    }

    /// Disassembles the owner into its raw slice pointer and deleter without disposing of the
    /// elements.
    pub fn into_parts(self) -> (NonNull<[T]>, D) {
        let this = ManuallyDrop::new(self);
        // SAFETY: self's drop is suppressed, so the deleter is moved out exactly once.
        (this.ptr, unsafe { ptr::read(&this.deleter) })
    }

    /// The number of elements. Fixed for the owner's whole lifetime.
    pub const fn len(&self) -> usize {
        self.ptr.len()
    }

    /// Returns true if the owned slice has no elements.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A reference to the element at `index`, or [`None`] when out of bounds.
    ///
    /// # Examples
    /// ```
    /// # use darray::owned::OwnedArray;
    /// let arr = OwnedArray::from_fn(3, |i| i).unwrap();
    /// assert_eq!(arr.get(2), Some(&2));
    /// assert_eq!(arr.get(3), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// A mutable reference to the element at `index`, or [`None`] when out of bounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Borrows the whole pointee as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The elements are live for as long as the owner, and the borrow checker keeps
        // the reference within that.
        unsafe { slice::from_raw_parts(self.ptr.cast::<T>().as_ptr(), self.len()) }
    }

    /// Mutably borrows the whole pointee as a slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As for as_slice, with exclusivity from the mutable borrow of the single owner.
        unsafe { slice::from_raw_parts_mut(self.ptr.cast::<T>().as_ptr(), self.len()) }
    }

    /// Iterates over the elements by reference.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates over the elements by mutable reference.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Exchanges the pointees (and deleters) of two owners in O(1).
    pub fn swap_with(&mut self, other: &mut OwnedArray<T, D>) {
        std::mem::swap(self, other);
    }

    /// Borrows the deleter.
    pub const fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Mutably borrows the deleter.
    pub const fn deleter_mut(&mut self) -> &mut D {
        &mut self.deleter
    }

    /// Converts into an owner with a more general deleter. See
    /// [`OwnedValue::with_deleter`](super::OwnedValue::with_deleter).
    pub fn with_deleter<D2>(self) -> OwnedArray<T, D2>
    where
        D2: Deleter<[T]> + From<D>,
    {
        let (ptr, deleter) = self.into_parts();
        // SAFETY: Ownership moves straight across; the converted deleter takes over disposal.
        unsafe { OwnedArray::from_parts(ptr, D2::from(deleter)) }
    }
}

impl<T, D: Deleter<[T]>> Drop for OwnedArray<T, D> {
    fn drop(&mut self) {
        // SAFETY: The elements are live, uniquely owned and never used again.
        unsafe { self.deleter.delete(self.ptr) }
    }
}

impl<T, D: Deleter<[T]>, I: SliceIndex<[T]>> Index<I> for OwnedArray<T, D> {
    type Output = I::Output;

    fn index(&self, index: I) -> &I::Output {
        &self.as_slice()[index]
    }
}

impl<T, D: Deleter<[T]>, I: SliceIndex<[T]>> IndexMut<I> for OwnedArray<T, D> {
    fn index_mut(&mut self, index: I) -> &mut I::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, T, D: Deleter<[T]>> IntoIterator for &'a OwnedArray<T, D> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, D: Deleter<[T]>> IntoIterator for &'a mut OwnedArray<T, D> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// SAFETY: The owner is the only handle to the elements, so sending it sends them and the deleter.
unsafe impl<T: Send, D: Deleter<[T]> + Send> Send for OwnedArray<T, D> {}
// SAFETY: Shared access to the owner only ever hands out shared references to the elements.
unsafe impl<T: Sync, D: Deleter<[T]> + Sync> Sync for OwnedArray<T, D> {}

impl<T: PartialEq, D: Deleter<[T]>> PartialEq for OwnedArray<T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, D: Deleter<[T]>> Eq for OwnedArray<T, D> {}

impl<T: Debug, D: Deleter<[T]>> Debug for OwnedArray<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
