use std::alloc;
use std::alloc::Layout;
use std::error::Error;
use std::fmt::{self, Formatter};
use std::ptr::NonNull;

/// The error produced when an allocation request can't be satisfied, either because the allocator
/// refused it or because the requested element count isn't representable as a byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Allocation failed!")
    }
}

impl Error for AllocError {}

/// A minimal allocation capability: allocate by [`Layout`] (size and alignment together), fallibly,
/// and deallocate, infallibly. Any source of memory satisfying this contract - the system heap, an
/// arena, a pool - is a legal substitution for the default.
///
/// Implementations must be [`Clone`] because containers hold their allocator by value and copy it
/// into transactions, iterators and clones of themselves. Allocators are expected to be stateless
/// or cheaply copyable, and clones must be able to free each other's blocks.
///
/// # Safety
/// A successful [`allocate`](RawAllocator::allocate) must return a pointer which is non-null,
/// aligned to `layout.align()` and valid for reads and writes of `layout.size()` bytes until it is
/// passed to [`deallocate`](RawAllocator::deallocate). Blocks must remain valid when the allocator
/// (or a clone of it) is moved.
pub unsafe trait RawAllocator: Clone {
    /// Allocates a block for `layout`, or fails with [`AllocError`]. Never returns a null pointer
    /// on success. A zero-sized `layout` must succeed without touching any real memory source.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Returns a block to the allocator. Must not fail.
    ///
    /// # Safety
    /// `pointer` must have been returned by a call to [`allocate`](RawAllocator::allocate) on this
    /// allocator (or a clone of it) with the same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout);
}

/// The default [`RawAllocator`], backed by [`std::alloc`]. A stateless unit type, so holding one
/// by value costs nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAllocator;

// SAFETY: std::alloc::alloc returns blocks valid for the requested layout until freed, and null on
// failure, which is mapped to AllocError. Zero-sized requests are served with an aligned dangling
// pointer and never reach the global allocator.
unsafe impl RawAllocator for DefaultAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            // The global allocator doesn't accept zero-sized layouts; any aligned pointer is valid
            // for zero bytes.
            // SAFETY: Alignments are non-zero powers of two.
            return Ok(unsafe { NonNull::new_unchecked(layout.align() as *mut u8) });
        }

        // SAFETY: Zero-sized layouts have been guarded against.
        NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: Zero-sized blocks were never really allocated. Everything else was obtained
            // from alloc::alloc with this layout, per this method's contract.
            unsafe { alloc::dealloc(pointer.as_ptr(), layout) }
        }
    }
}
