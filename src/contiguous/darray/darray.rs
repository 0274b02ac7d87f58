use std::borrow::{Borrow, BorrowMut};
use std::cmp;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Deref, DerefMut, Range};
use std::ptr;
use std::slice;

use super::error::{CapacityOverflow, IndexOutOfBounds, ReserveError};
use super::guard::{GapGuard, InitGuard};
use super::storage::RawStorage;
use crate::alloc::{AllocError, DefaultAllocator, RawAllocator};
use crate::util::result::ResultExtension;

/// A contiguous, owning, growable array, parameterized by element type and a pluggable
/// [`RawAllocator`]. Similar in spirit to [`Vec`], but with a hand-rolled storage layer, explicit
/// allocation errors and transactional rollback on every fallible mutation.
///
/// Every mutating operation either fully succeeds or leaves the array exactly as it was, with one
/// documented exception: [`shrink_to_fit`](DArray::shrink_to_fit) is advisory and swallows
/// allocation failure. Element-level failures (a panicking [`Clone`], [`Default`] or closure) are
/// unwound past with the same guarantee: partially constructed ranges are destroyed in reverse
/// order and shifted tails are shifted back before the panic continues.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the array.
/// - `i`: The index of the item in question.
/// - `m`: The number of items being inserted.
///
/// | Method | Complexity |
/// |-|-|
/// | `len` / `capacity` | `O(1)` |
/// | `push` | `O(1)`*, `O(n)` |
/// | `pop` | `O(1)` |
/// | `insert` | `O(n-i)` |
/// | `insert_slice` | `O(n-i+m)` |
/// | `remove` | `O(n-i)` |
/// | `reserve` | `O(n)`**, `O(1)` |
/// | `shrink_to_fit` | `O(n)` |
/// | `swap_with` | `O(1)` |
///
/// \* Amortized; a push without spare capacity relocates, taking `O(n)`.
///
/// \** If the array already has the requested capacity, `reserve` is `O(1)`.
pub struct DArray<T, A: RawAllocator = DefaultAllocator> {
    pub(crate) buf: RawStorage<T, A>,
    pub(crate) len: usize,
}

impl<T> DArray<T> {
    /// Creates a new empty array with length and capacity 0. Memory is first allocated when the
    /// capacity changes.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr: DArray<u8> = DArray::new();
    /// assert_eq!(arr.len(), 0);
    /// assert_eq!(arr.capacity(), 0);
    /// ```
    pub const fn new() -> DArray<T> {
        Self::new_in(DefaultAllocator)
    }

    /// Creates a new empty array with capacity exactly equal to the provided value, allowing that
    /// many values to be added without reallocation.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr: DArray<u8> = DArray::with_capacity(5).unwrap();
    /// assert_eq!(arr.capacity(), 5);
    /// assert_eq!(arr.len(), 0);
    /// ```
    pub fn with_capacity(cap: usize) -> Result<DArray<T>, AllocError> {
        Self::with_capacity_in(cap, DefaultAllocator)
    }

    /// Creates an array of `count` default values.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated, in which case no element was
    /// ever constructed.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr: DArray<u8> = DArray::repeat_default(3).unwrap();
    /// assert_eq!(&*arr, &[0, 0, 0]);
    /// ```
    pub fn repeat_default(count: usize) -> Result<DArray<T>, AllocError>
    where
        T: Default,
    {
        Self::repeat_default_in(count, DefaultAllocator)
    }

    /// Creates an array of `count` clones of `item`.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr = DArray::repeat_item(&42, 3).unwrap();
    /// assert_eq!(&*arr, &[42, 42, 42]);
    /// ```
    pub fn repeat_item(item: &T, count: usize) -> Result<DArray<T>, AllocError>
    where
        T: Clone,
    {
        Self::repeat_item_in(item, count, DefaultAllocator)
    }

    /// Creates an array by cloning a slice, with capacity exactly equal to its length.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr = DArray::from_slice(&[1, 2, 3]).unwrap();
    /// assert_eq!(&*arr, &[1, 2, 3]);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn from_slice(items: &[T]) -> Result<DArray<T>, AllocError>
    where
        T: Clone,
    {
        Self::from_slice_in(items, DefaultAllocator)
    }
}

impl<T, A: RawAllocator> DArray<T, A> {
    /// The largest element count this array can ever hold, bounded by the maximum representable
    /// byte count of an allocation divided by one element's size.
    pub const MAX_LEN: usize = RawStorage::<T, A>::MAX_LEN;

    /// Creates a new empty array which will allocate from `alloc`.
    pub const fn new_in(alloc: A) -> DArray<T, A> {
        DArray {
            buf: RawStorage::empty_in(alloc),
            len: 0,
        }
    }

    /// Creates a new empty array with the provided capacity, allocating from `alloc`. See
    /// [`DArray::with_capacity`].
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated. A capacity of 0 never allocates.
    pub fn with_capacity_in(cap: usize, alloc: A) -> Result<DArray<T, A>, AllocError> {
        Ok(DArray {
            buf: RawStorage::allocate_in(alloc, cap)?,
            len: 0,
        })
    }

    /// Creates an array of `count` default values, allocating from `alloc`. See
    /// [`DArray::repeat_default`].
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    pub fn repeat_default_in(count: usize, alloc: A) -> Result<DArray<T, A>, AllocError>
    where
        T: Default,
    {
        Self::build_in(count, alloc, |_| T::default())
    }

    /// Creates an array of `count` clones of `item`, allocating from `alloc`. See
    /// [`DArray::repeat_item`].
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    pub fn repeat_item_in(item: &T, count: usize, alloc: A) -> Result<DArray<T, A>, AllocError>
    where
        T: Clone,
    {
        Self::build_in(count, alloc, |_| item.clone())
    }

    /// Creates an array by cloning a slice, allocating from `alloc`. See [`DArray::from_slice`].
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    pub fn from_slice_in(items: &[T], alloc: A) -> Result<DArray<T, A>, AllocError>
    where
        T: Clone,
    {
        Self::build_in(items.len(), alloc, |index| items[index].clone())
    }

    /// The construction backbone: allocate exactly `count` slots, then fill them left to right.
    /// If `fill` panics on the k-th element, the previous `k - 1` are destroyed in reverse order
    /// by the guard and the candidate block is released as it drops, so a failed construction
    /// leaves nothing behind.
    fn build_in(
        count: usize,
        alloc: A,
        mut fill: impl FnMut(usize) -> T,
    ) -> Result<DArray<T, A>, AllocError> {
        let buf = RawStorage::allocate_in(alloc, count)?;

        // SAFETY: The fresh block has room for exactly `count` elements.
        let mut guard = unsafe { InitGuard::new(buf.ptr) };
        for index in 0..count {
            guard.push(fill(index));
        }

        let len = guard.complete();
        Ok(DArray { buf, len })
    }

    /// Returns the number of live elements in the array.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr = DArray::from([1, 2, 3]);
    /// assert_eq!(arr.len(), 3);
    /// ```
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the current capacity: the number of allocated slots, whether live or not. The
    /// capacity is exactly the value produced by the documented capacity rules, never rounded up.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr: DArray<u8> = DArray::with_capacity(5).unwrap();
    /// assert_eq!(arr.capacity(), 5);
    /// ```
    pub const fn capacity(&self) -> usize {
        self.buf.cap
    }

    /// Returns true if the array contains no elements.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr: DArray<u8> = DArray::new();
    /// assert!(arr.is_empty());
    /// arr.push(1).unwrap();
    /// assert!(!arr.is_empty());
    /// ```
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrows the allocator this array allocates from.
    pub const fn allocator(&self) -> &A {
        &self.buf.alloc
    }

    /// Returns a raw pointer to the start of the block. Dangling (but aligned) when the capacity
    /// is 0.
    pub const fn as_ptr(&self) -> *const T {
        self.buf.ptr.as_ptr()
    }

    /// Returns a raw mutable pointer to the start of the block. Dangling (but aligned) when the
    /// capacity is 0.
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr.as_ptr()
    }

    /// Checked element access: a reference to the element at `index`, or [`IndexOutOfBounds`]
    /// when `index` is not less than the length. For access where the index is already known to
    /// be in bounds, index through the slice deref instead.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr = DArray::from([1, 2, 3]);
    /// assert_eq!(arr.at(1), Ok(&2));
    /// assert!(arr.at(3).is_err());
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, IndexOutOfBounds> {
        if index < self.len {
            Ok(&self[index])
        } else {
            Err(IndexOutOfBounds {
                index,
                len: self.len,
            })
        }
    }

    /// Checked mutable element access. See [`DArray::at`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, IndexOutOfBounds> {
        let len = self.len;
        if index < len {
            Ok(&mut self[index])
        } else {
            Err(IndexOutOfBounds { index, len })
        }
    }

    /// Ensures capacity for at least `new_cap` elements. A no-op when the capacity is already
    /// sufficient; otherwise allocates a block of exactly `new_cap` slots, relocates every element
    /// into it in order and releases the old block.
    ///
    /// # Errors
    /// Fails with [`CapacityOverflow`] when `new_cap` exceeds [`DArray::MAX_LEN`], or with
    /// [`AllocError`] when the allocator refuses; either way the array is untouched.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3]);
    /// arr.reserve(10).unwrap();
    /// assert_eq!(arr.capacity(), 10);
    /// assert_eq!(&*arr, &[1, 2, 3]);
    /// ```
    pub fn reserve(&mut self, new_cap: usize) -> Result<(), ReserveError> {
        if new_cap <= self.capacity() {
            return Ok(());
        }
        if new_cap > Self::MAX_LEN {
            return Err(CapacityOverflow.into());
        }
        self.relocate(new_cap)?;
        Ok(())
    }

    /// Reduces the capacity to match the length. Advisory: when the replacement block can't be
    /// allocated this does nothing at all, rather than failing - the array is merely left
    /// unshrunk. Shrinking an empty array releases its block entirely.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr: DArray<u8> = DArray::with_capacity(10).unwrap();
    /// arr.push(1).unwrap();
    /// arr.shrink_to_fit();
    /// assert_eq!(arr.capacity(), 1);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len {
            if self.len == 0 {
                self.buf.reset();
            } else {
                let _ = self.relocate(self.len);
            }
        }
    }

    /// Moves every element into a freshly allocated block of exactly `new_cap` slots and adopts
    /// it. Relocation is a bitwise move, so once the allocation has succeeded nothing can fail.
    fn relocate(&mut self, new_cap: usize) -> Result<(), AllocError> {
        debug_assert!(new_cap >= self.len);
        let new_buf = RawStorage::allocate_in(self.buf.alloc.clone(), new_cap)?;

        // SAFETY: Both blocks cover at least `len` slots and can't overlap. The old block is left
        // holding no live elements, so dropping it only releases memory.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.ptr.as_ptr(), new_buf.ptr.as_ptr(), self.len);
        }
        drop(mem::replace(&mut self.buf, new_buf));
        Ok(())
    }

    /// The growth policy for insertions: at least double the capacity, at least the required
    /// count, never beyond [`DArray::MAX_LEN`] - and saturate to `MAX_LEN` outright once doubling
    /// could overflow it. Gives amortized constant-time appends.
    fn extended_capacity(&self, required: usize) -> Result<usize, CapacityOverflow> {
        if required > Self::MAX_LEN {
            return Err(CapacityOverflow);
        }
        if self.capacity() >= Self::MAX_LEN / 2 {
            return Ok(Self::MAX_LEN);
        }
        Ok(cmp::max(self.capacity() * 2, required))
    }

    /// Appends a value to the end of the array, growing if required.
    ///
    /// # Errors
    /// Fails with [`ReserveError`] if growth is needed and fails; the array is untouched.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::new();
    /// for i in 0..=5 {
    ///     arr.push(i).unwrap();
    /// }
    /// assert_eq!(&*arr, &[0, 1, 2, 3, 4, 5]);
    /// ```
    pub fn push(&mut self, value: T) -> Result<(), ReserveError> {
        self.push_with(|| value)
    }

    /// Appends an element constructed in place at the end of the array: `construct` runs after
    /// any growth, writing straight into the final slot. If `construct` panics, the array is
    /// untouched (a candidate block from a triggered growth is discarded).
    ///
    /// # Errors
    /// Fails with [`ReserveError`] if growth is needed and fails.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2]);
    /// arr.push_with(|| 1 + 2).unwrap();
    /// assert_eq!(&*arr, &[1, 2, 3]);
    /// ```
    pub fn push_with(&mut self, construct: impl FnOnce() -> T) -> Result<(), ReserveError> {
        if self.len < self.capacity() {
            // SAFETY: The slot at `len` is in-bounds raw storage. `construct` is evaluated before
            // the write and before the length changes, so a panic alters nothing.
            unsafe { self.buf.ptr.add(self.len).write(construct()) };
            self.len += 1;
            Ok(())
        } else {
            self.grow_and_insert_with(self.len, construct)
        }
    }

    /// Pops the last value off the end of the array, if any. Capacity is unaffected.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3]);
    /// assert_eq!(arr.pop(), Some(3));
    /// assert_eq!(arr.pop(), Some(2));
    /// assert_eq!(arr.pop(), Some(1));
    /// assert_eq!(arr.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: The slot at the decremented length holds a live element which the array no
            // longer considers its own; this is a bitwise move off of the heap.
            Some(unsafe { self.buf.ptr.add(self.len).read() })
        }
    }

    /// Inserts a value at `index`, shifting everything from `index` onwards one slot to the
    /// right.
    ///
    /// # Errors
    /// Fails with [`ReserveError`] if growth is needed and fails; the array is untouched.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([0, 1, 2]);
    /// arr.insert(1, 100).unwrap();
    /// arr.insert(4, 300).unwrap();
    /// assert_eq!(&*arr, &[0, 100, 1, 2, 300]);
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ReserveError> {
        self.insert_with(index, || value)
    }

    /// Inserts an element constructed in place at `index`. Like [`DArray::push_with`], but for an
    /// arbitrary position: the gap is opened first and `construct` writes straight into it. If
    /// `construct` panics, the shifted tail is shifted back and the array is untouched.
    ///
    /// # Errors
    /// Fails with [`ReserveError`] if growth is needed and fails.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn insert_with(
        &mut self,
        index: usize,
        construct: impl FnOnce() -> T,
    ) -> Result<(), ReserveError> {
        self.check_insert_index(index);

        if self.len >= self.capacity() {
            return self.grow_and_insert_with(index, construct);
        }
        if index == self.len {
            // SAFETY: Spare capacity exists and `construct` runs before anything changes.
            unsafe { self.buf.ptr.add(self.len).write(construct()) };
            self.len += 1;
            return Ok(());
        }

        // SAFETY: Spare capacity exists, so shifting the tail right by one stays in bounds. The
        // guard restores the tail if `construct` panics.
        unsafe {
            let gap = self.buf.ptr.add(index);
            ptr::copy(gap.as_ptr(), gap.add(1).as_ptr(), self.len - index);
            let mut guard = GapGuard::new(gap, 1, self.len - index);
            guard.push(construct());
            guard.complete();
        }
        self.len += 1;
        Ok(())
    }

    /// Inserts `count` clones of `item` at `index`.
    ///
    /// # Errors
    /// Fails with [`ReserveError`] if growth is needed and fails; the array is untouched.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2]);
    /// arr.insert_fill(1, &9, 3).unwrap();
    /// assert_eq!(&*arr, &[1, 9, 9, 9, 2]);
    /// ```
    pub fn insert_fill(&mut self, index: usize, item: &T, count: usize) -> Result<(), ReserveError>
    where
        T: Clone,
    {
        self.insert_each(index, count, |_| item.clone())
    }

    /// Inserts clones of a whole slice at `index`.
    ///
    /// # Errors
    /// Fails with [`ReserveError`] if growth is needed and fails; the array is untouched.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 5]);
    /// arr.insert_slice(1, &[2, 3, 4]).unwrap();
    /// assert_eq!(&*arr, &[1, 2, 3, 4, 5]);
    /// ```
    pub fn insert_slice(&mut self, index: usize, items: &[T]) -> Result<(), ReserveError>
    where
        T: Clone,
    {
        self.insert_each(index, items.len(), |offset| items[offset].clone())
    }

    /// Bulk insertion: open a gap of `count` slots at `index` (shifting or relocating as
    /// required) and fill it left to right from `fill`. Any panic out of `fill` rolls the array
    /// back to its pre-call arrangement before continuing to unwind.
    fn insert_each(
        &mut self,
        index: usize,
        count: usize,
        mut fill: impl FnMut(usize) -> T,
    ) -> Result<(), ReserveError> {
        self.check_insert_index(index);
        if count == 0 {
            return Ok(());
        }

        if count > self.capacity() - self.len {
            return self.grow_and_insert_each(index, count, fill);
        }
        if index == self.len {
            // SAFETY: Spare capacity covers the appended range; the guard destroys a partial
            // suffix in reverse order and the length still excludes it.
            let mut guard = unsafe { InitGuard::new(self.buf.ptr.add(self.len)) };
            for offset in 0..count {
                guard.push(fill(offset));
            }
            self.len += guard.complete();
            return Ok(());
        }

        // SAFETY: Spare capacity covers the shifted tail. The guard destroys a partially filled
        // gap and shifts the tail back if `fill` panics.
        unsafe {
            let gap = self.buf.ptr.add(index);
            ptr::copy(gap.as_ptr(), gap.add(count).as_ptr(), self.len - index);
            let mut guard = GapGuard::new(gap, count, self.len - index);
            for offset in 0..count {
                guard.push(fill(offset));
            }
            guard.complete();
        }
        self.len += count;
        Ok(())
    }

    /// The single-element growth path, shared by push and insert: allocate the extended block,
    /// construct the new element into its final position first, then relocate the prefix and
    /// suffix around it in one pass and commit. A failure before the commit discards only the
    /// candidate block.
    fn grow_and_insert_with(
        &mut self,
        index: usize,
        construct: impl FnOnce() -> T,
    ) -> Result<(), ReserveError> {
        let required = self.len.checked_add(1).ok_or(CapacityOverflow)?;
        let new_cap = self.extended_capacity(required)?;
        let new_buf = RawStorage::allocate_in(self.buf.alloc.clone(), new_cap)
            .map_err(ReserveError::from)?;

        // SAFETY: The candidate block covers `len + 1 <= new_cap` slots. The new element is
        // guarded until it's in place; the relocations after it are bitwise moves which can't
        // fail, after which the old block holds no live elements.
        unsafe {
            let gap = new_buf.ptr.add(index);
            let mut guard = InitGuard::new(gap);
            guard.push(construct());
            guard.complete();

            ptr::copy_nonoverlapping(self.buf.ptr.as_ptr(), new_buf.ptr.as_ptr(), index);
            ptr::copy_nonoverlapping(
                self.buf.ptr.add(index).as_ptr(),
                gap.add(1).as_ptr(),
                self.len - index,
            );
        }
        drop(mem::replace(&mut self.buf, new_buf));
        self.len += 1;
        Ok(())
    }

    /// The bulk growth path; identical to [`DArray::grow_and_insert_with`] but with a gap of
    /// `count` slots accounted for directly in the new block's layout, avoiding a second shift.
    fn grow_and_insert_each(
        &mut self,
        index: usize,
        count: usize,
        mut fill: impl FnMut(usize) -> T,
    ) -> Result<(), ReserveError> {
        let required = self.len.checked_add(count).ok_or(CapacityOverflow)?;
        let new_cap = self.extended_capacity(required)?;
        let new_buf = RawStorage::allocate_in(self.buf.alloc.clone(), new_cap)
            .map_err(ReserveError::from)?;

        // SAFETY: As in grow_and_insert_with, with a `count`-slot gap at `index`.
        unsafe {
            let gap = new_buf.ptr.add(index);
            let mut guard = InitGuard::new(gap);
            for offset in 0..count {
                guard.push(fill(offset));
            }
            guard.complete();

            ptr::copy_nonoverlapping(self.buf.ptr.as_ptr(), new_buf.ptr.as_ptr(), index);
            ptr::copy_nonoverlapping(
                self.buf.ptr.add(index).as_ptr(),
                gap.add(count).as_ptr(),
                self.len - index,
            );
        }
        drop(mem::replace(&mut self.buf, new_buf));
        self.len += count;
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting everything after it one slot to the
    /// left. Capacity is unaffected.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3, 4, 5]);
    /// assert_eq!(arr.remove(1), 2);
    /// assert_eq!(&*arr, &[1, 3, 4, 5]);
    /// assert_eq!(arr.capacity(), 5);
    /// ```
    pub fn remove(&mut self, index: usize) -> T {
        self.check_index(index);

        // SAFETY: The element at `index` is live and moved out exactly once; the tail memmove
        // leaves the vacated trailing slot logically uninitialized before the length drops.
        unsafe {
            let slot = self.buf.ptr.add(index);
            let value = slot.read();
            ptr::copy(slot.add(1).as_ptr(), slot.as_ptr(), self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Removes the elements in `range`, destroying them in reverse order and closing the gap.
    /// A range reaching the end just destroys the trailing elements. Capacity is unaffected.
    ///
    /// # Panics
    /// Panics if the range is decreasing or ends beyond the length.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3, 4, 5]);
    /// arr.remove_range(1..3);
    /// assert_eq!(&*arr, &[1, 4, 5]);
    /// ```
    pub fn remove_range(&mut self, range: Range<usize>) {
        let Range { start, end } = range;
        assert!(
            start <= end && end <= self.len,
            "range {}..{} out of bounds for collection with {} elements",
            start,
            end,
            self.len
        );
        if start == end {
            return;
        }

        // SAFETY: Everything in `start..end` is live exactly once, and the memmove closes over
        // slots whose contents were just destroyed.
        unsafe {
            for index in (start..end).rev() {
                ptr::drop_in_place(self.buf.ptr.add(index).as_ptr());
            }
            ptr::copy(
                self.buf.ptr.add(end).as_ptr(),
                self.buf.ptr.add(start).as_ptr(),
                self.len - end,
            );
        }
        self.len -= end - start;
    }

    /// Shortens the array to at most `new_len` elements, destroying the surplus in reverse
    /// order. Does nothing when the array is already short enough. Capacity is unaffected.
    pub fn truncate(&mut self, new_len: usize) {
        while self.len > new_len {
            self.len -= 1;
            // SAFETY: The slot at the decremented length held the last live element.
            unsafe { ptr::drop_in_place(self.buf.ptr.add(self.len).as_ptr()) }
        }
    }

    /// Destroys every element in reverse order. The capacity is retained.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3]);
    /// arr.clear();
    /// assert!(arr.is_empty());
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Replaces the contents with `count` clones of `item`, in a freshly allocated block of
    /// exactly `count` slots. The old elements are destroyed only after every clone succeeded, so
    /// a failure of any kind leaves the array untouched. A count of 0 just clears.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the replacement block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3]);
    /// arr.assign_fill(&7, 2).unwrap();
    /// assert_eq!(&*arr, &[7, 7]);
    /// ```
    pub fn assign_fill(&mut self, item: &T, count: usize) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.assign_each(count, |_| item.clone())
    }

    /// Replaces the contents with clones of a slice. See [`DArray::assign_fill`] for the
    /// transactional contract.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the replacement block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut arr = DArray::from([1, 2, 3]);
    /// arr.assign_slice(&[4, 5]).unwrap();
    /// assert_eq!(&*arr, &[4, 5]);
    /// assert_eq!(arr.capacity(), 2);
    /// ```
    pub fn assign_slice(&mut self, items: &[T]) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.assign_each(items.len(), |index| items[index].clone())
    }

    fn assign_each(
        &mut self,
        count: usize,
        fill: impl FnMut(usize) -> T,
    ) -> Result<(), AllocError> {
        if count == 0 {
            self.clear();
            return Ok(());
        }

        // Build the replacement completely before the old content is touched.
        let fresh = Self::build_in(count, self.buf.alloc.clone(), fill)?;
        *self = fresh;
        Ok(())
    }

    /// Takes the whole contents, leaving this array empty with capacity 0 - the explicit form of
    /// ownership transfer out of a place that can't be moved from.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut src = DArray::from([1, 2, 3]);
    /// let dst = src.take();
    /// assert_eq!(&*dst, &[1, 2, 3]);
    /// assert_eq!(src.len(), 0);
    /// assert_eq!(src.capacity(), 0);
    /// ```
    pub fn take(&mut self) -> DArray<T, A> {
        let alloc = self.buf.alloc.clone();
        mem::replace(self, DArray::new_in(alloc))
    }

    /// Exchanges the entire contents of two arrays in O(1), swapping blocks, lengths and
    /// allocators.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut a = DArray::from([1]);
    /// let mut b = DArray::from([2, 3]);
    /// a.swap_with(&mut b);
    /// assert_eq!(&*a, &[2, 3]);
    /// assert_eq!(&*b, &[1]);
    /// ```
    pub fn swap_with(&mut self, other: &mut DArray<T, A>) {
        mem::swap(self, other);
    }

    /// Copies the array into a fresh block of exactly `len` slots - capacity equals length after
    /// a copy, with no extra headroom.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated.
    pub fn try_clone(&self) -> Result<DArray<T, A>, AllocError>
    where
        T: Clone,
    {
        Self::build_in(self.len, self.buf.alloc.clone(), |index| self[index].clone())
    }

    pub(crate) fn check_index(&self, index: usize) {
        assert!(
            index < self.len,
            "index {} out of bounds for collection with {} elements",
            index,
            self.len
        );
    }

    pub(crate) fn check_insert_index(&self, index: usize) {
        assert!(
            index <= self.len,
            "insertion index {} out of bounds for collection with {} elements",
            index,
            self.len
        );
    }
}

impl<T, A: RawAllocator> Drop for DArray<T, A> {
    fn drop(&mut self) {
        // Destroy the live elements in reverse order; buf's own drop returns the block.
        self.clear();
    }
}

impl<T, A: RawAllocator + Default> Default for DArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: RawAllocator> Clone for DArray<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().throw()
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_slice(source).throw()
    }
}

impl<T, const N: usize> From<[T; N]> for DArray<T> {
    /// Creates an array from a literal list of elements, with capacity exactly `N`.
    ///
    /// # Panics
    /// Panics if the block can't be allocated.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr = DArray::from([1, 2, 3]);
    /// assert_eq!(arr.len(), 3);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    fn from(items: [T; N]) -> Self {
        let mut arr = DArray::with_capacity(N).throw();
        for item in items {
            arr.push(item).throw();
        }
        arr
    }
}

impl<T> FromIterator<T> for DArray<T> {
    /// # Panics
    /// Panics if an allocation fails while collecting.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut arr = DArray::with_capacity(iter.size_hint().0).throw();
        for item in iter {
            arr.push(item).throw();
        }
        arr
    }
}

impl<T, A: RawAllocator> Extend<T> for DArray<T, A> {
    /// # Panics
    /// Panics if an allocation fails while extending.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item).throw();
        }
    }
}

impl<T, A: RawAllocator> Deref for DArray<T, A> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        // SAFETY: The first `len` slots are live, contiguous and valid for `len * size_of::<T>()`
        // bytes; the safe API hands out no raw pointers, so the borrow checker prevents mutation
        // for the borrow's lifetime.
        unsafe { slice::from_raw_parts(self.buf.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator> DerefMut for DArray<T, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As for Deref, with exclusivity guaranteed by the mutable borrow of self.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr.as_ptr(), self.len) }
    }
}

impl<T, A: RawAllocator> AsRef<[T]> for DArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.deref()
    }
}

impl<T, A: RawAllocator> AsMut<[T]> for DArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.deref_mut()
    }
}

impl<T, A: RawAllocator> Borrow<[T]> for DArray<T, A> {
    fn borrow(&self) -> &[T] {
        self.as_ref()
    }
}

impl<T, A: RawAllocator> BorrowMut<[T]> for DArray<T, A> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut()
    }
}

// SAFETY: A DArray exclusively owns its block through a unique pointer, so it is Send whenever
// its element and allocator are.
unsafe impl<T: Send, A: RawAllocator + Send> Send for DArray<T, A> {}
// SAFETY: The safe API performs no interior mutation, so shared references are as safe as shared
// references to the elements and allocator themselves.
unsafe impl<T: Sync, A: RawAllocator + Sync> Sync for DArray<T, A> {}

impl<T: PartialEq, A: RawAllocator> PartialEq for DArray<T, A> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq, A: RawAllocator> Eq for DArray<T, A> {}

impl<T: Hash, A: RawAllocator> Hash for DArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T: Debug, A: RawAllocator> Debug for DArray<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DArray")
            .field("contents", &&**self)
            .field("len", &self.len)
            .field("cap", &self.capacity())
            .finish()
    }
}

impl<T: Debug, A: RawAllocator> Display for DArray<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
