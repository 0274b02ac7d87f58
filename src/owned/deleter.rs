use std::alloc::Layout;
use std::ptr::NonNull;

use crate::alloc::{DefaultAllocator, RawAllocator};

/// The destruction capability of an owned pointer: how to dispose of the pointee once the owner is
/// done with it. Parameterized over the pointee so that one deleter type can serve both sized
/// values and slices.
///
/// # Safety
/// [`delete`](Deleter::delete) takes over full responsibility for the pointee: it must destroy the
/// value(s) behind the pointer and release whatever resources back them, exactly once, and must
/// not fail.
pub unsafe trait Deleter<P: ?Sized> {
    /// Disposes of the pointee.
    ///
    /// # Safety
    /// `pointer` must reference a live, uniquely owned pointee that this deleter knows how to
    /// dispose of, and must not be used afterwards.
    unsafe fn delete(&mut self, pointer: NonNull<P>);
}

/// The default [`Deleter`] for single values: drop in place, then return the block to
/// [`DefaultAllocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultDeleter;

// SAFETY: The value is dropped exactly once and the block is returned with the layout it was
// obtained with.
unsafe impl<T> Deleter<T> for DefaultDeleter {
    unsafe fn delete(&mut self, pointer: NonNull<T>) {
        // SAFETY: Per this method's contract the pointee is live, uniquely owned and was allocated
        // through DefaultAllocator with T's layout.
        unsafe {
            pointer.drop_in_place();
            DefaultAllocator.deallocate(pointer.cast(), Layout::new::<T>());
        }
    }
}

/// The default [`Deleter`] for owned slices: drop every element in place, then return the block to
/// [`DefaultAllocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultArrayDeleter;

// SAFETY: Every element is dropped exactly once and the block is returned with the layout it was
// obtained with.
unsafe impl<T> Deleter<[T]> for DefaultArrayDeleter {
    unsafe fn delete(&mut self, pointer: NonNull<[T]>) {
        let len = pointer.len();
        // SAFETY: Per this method's contract the elements are live, uniquely owned and the block
        // was allocated through DefaultAllocator for exactly `len` elements. A layout that was
        // allocated always reconstructs.
        unsafe {
            pointer.drop_in_place();
            if let Ok(layout) = Layout::array::<T>(len) {
                DefaultAllocator.deallocate(pointer.cast(), layout);
            }
        }
    }
}
