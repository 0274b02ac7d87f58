use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::alloc::{AllocError, RawAllocator};

/// The owner of the raw block behind a [`DArray`](super::DArray): a pointer, a slot count and the
/// allocator the block came from. Slots are raw storage - constructing and destroying elements in
/// them is entirely the container's business, which is what makes a fresh `RawStorage` usable as
/// an allocation transaction: drop it before committing (swapping it into the container) and the
/// untouched block simply goes back to the allocator.
///
/// The pointer is dangling exactly when no allocation exists, i.e. when `cap == 0` or `T` is
/// zero-sized.
pub(crate) struct RawStorage<T, A: RawAllocator> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) cap: usize,
    pub(crate) alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: RawAllocator> RawStorage<T, A> {
    /// The largest representable slot count: the maximum byte count of an allocation divided by
    /// one element's size. Zero-sized elements never allocate, so any count of them fits.
    pub(crate) const MAX_LEN: usize = if size_of::<T>() == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size_of::<T>()
    };

    /// A storage with no block: dangling pointer, zero capacity. Doesn't touch the allocator.
    pub(crate) const fn empty_in(alloc: A) -> RawStorage<T, A> {
        RawStorage {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Allocates a block of exactly `cap` raw slots. A `cap` of zero, or a zero-sized `T`, records
    /// the capacity without allocating anything.
    ///
    /// Counts beyond [`RawStorage::MAX_LEN`] fail with [`AllocError`]: for allocation purposes an
    /// unrepresentable count is just a request which can never be satisfied.
    pub(crate) fn allocate_in(alloc: A, cap: usize) -> Result<RawStorage<T, A>, AllocError> {
        if cap == 0 || size_of::<T>() == 0 {
            let mut storage = RawStorage::empty_in(alloc);
            storage.cap = cap;
            return Ok(storage);
        }

        if cap > Self::MAX_LEN {
            return Err(AllocError);
        }
        let layout = Layout::array::<T>(cap).map_err(|_| AllocError)?;

        let ptr = alloc.allocate(layout)?.cast::<T>();
        Ok(RawStorage {
            ptr,
            cap,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Releases the block (if any) and returns to the empty state.
    pub(crate) fn reset(&mut self) {
        let alloc = self.alloc.clone();
        // The replaced storage deallocates as it drops.
        drop(mem::replace(self, RawStorage::empty_in(alloc)));
    }

    /// Decomposes the storage into its pointer and capacity without releasing the block.
    ///
    /// # Safety
    /// The caller takes over the block, including returning it to an allocator compatible with
    /// this one.
    pub(crate) unsafe fn into_raw_parts(self) -> (NonNull<T>, usize) {
        let this = mem::ManuallyDrop::new(self);
        (this.ptr, this.cap)
    }
}

impl<T, A: RawAllocator> Drop for RawStorage<T, A> {
    fn drop(&mut self) {
        // Live elements are the container's responsibility; only the block is returned here.
        if self.cap != 0 && size_of::<T>() != 0 {
            if let Ok(layout) = Layout::array::<T>(self.cap) {
                // SAFETY: A non-zero cap for a sized T means the block was obtained from this
                // allocator with exactly this layout, and nothing else will free it.
                unsafe { self.alloc.deallocate(self.ptr.cast(), layout) }
            }
        }
    }
}
