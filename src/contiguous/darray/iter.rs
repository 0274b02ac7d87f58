use std::fmt::{self, Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::ManuallyDrop;
use std::ptr;
use std::slice;

use super::darray::DArray;
use super::storage::RawStorage;
use crate::alloc::{DefaultAllocator, RawAllocator};

/// An owning iterator over the elements of a [`DArray`], produced by its [`IntoIterator`] impl.
/// Yields elements front to back (or back to front via [`DoubleEndedIterator`]) by moving them out
/// of the block; whatever hasn't been yielded when the iterator drops is destroyed in order, and
/// the block goes back to the array's allocator.
pub struct IntoIter<T, A: RawAllocator = DefaultAllocator> {
    buf: RawStorage<T, A>,
    index: usize,
    len: usize,
}

impl<T, A: RawAllocator> IntoIter<T, A> {
    /// Borrows the remaining elements as a slice.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let mut iter = DArray::from([1, 2, 3]).into_iter();
    /// iter.next();
    /// assert_eq!(iter.as_slice(), &[2, 3]);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The slots in index..len hold the elements not yet moved out.
        unsafe { slice::from_raw_parts(self.buf.ptr.add(self.index).as_ptr(), self.len - self.index) }
    }
}

impl<T, A: RawAllocator> IntoIterator for DArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// Converts the array into an owning iterator over its elements.
    ///
    /// # Examples
    /// ```
    /// # use darray::contiguous::DArray;
    /// let arr = DArray::from([1, 2, 3]);
    /// let doubled: Vec<i32> = arr.into_iter().map(|i| i * 2).collect();
    /// assert_eq!(doubled, [2, 4, 6]);
    /// ```
    fn into_iter(self) -> IntoIter<T, A> {
        let this = ManuallyDrop::new(self);
        // SAFETY: self's drop is suppressed, so the storage (and the elements in it) have exactly
        // one owner again: the iterator.
        let buf = unsafe { ptr::read(&this.buf) };
        IntoIter {
            buf,
            index: 0,
            len: this.len,
        }
    }
}

impl<T, A: RawAllocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.index == self.len {
            None
        } else {
            self.index += 1;
            // SAFETY: The slot below the incremented index held the frontmost remaining element,
            // which is now moved out exactly once.
            Some(unsafe { self.buf.ptr.add(self.index - 1).read() })
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl<T, A: RawAllocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.index == self.len {
            None
        } else {
            self.len -= 1;
            // SAFETY: The slot at the decremented length held the backmost remaining element.
            Some(unsafe { self.buf.ptr.add(self.len).read() })
        }
    }
}

impl<T, A: RawAllocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAllocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        for index in self.index..self.len {
            // SAFETY: The slots between the cursors still hold unyielded elements; buf's own drop
            // then returns the block.
            unsafe { ptr::drop_in_place(self.buf.ptr.add(index).as_ptr()) }
        }
    }
}

impl<T: Debug, A: RawAllocator> Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
