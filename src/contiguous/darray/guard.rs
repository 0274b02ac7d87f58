use std::mem;
use std::ptr::{self, NonNull};

/// A rollback guard over a range of just-constructed elements. Slots are filled left to right via
/// [`InitGuard::push`]; if the guard is dropped without [`InitGuard::complete`] - i.e. a
/// construction panicked - every element constructed so far is destroyed again in reverse order.
///
/// The guard never touches the block itself, so it composes with whatever owns the slots: a
/// candidate [`RawStorage`](super::storage::RawStorage) dropping right after the guard finishes
/// the transaction rollback.
pub(crate) struct InitGuard<T> {
    first: NonNull<T>,
    initialized: usize,
}

impl<T> InitGuard<T> {
    /// Starts guarding an empty range beginning at `first`.
    ///
    /// # Safety
    /// `first` must point at raw storage with room for every element subsequently pushed, and that
    /// storage must stay untouched by others for the guard's lifetime.
    pub(crate) const unsafe fn new(first: NonNull<T>) -> InitGuard<T> {
        InitGuard {
            first,
            initialized: 0,
        }
    }

    /// Constructs `value` into the next slot and extends the guarded range over it.
    pub(crate) fn push(&mut self, value: T) {
        // SAFETY: In bounds of the raw storage promised to InitGuard::new.
        unsafe { self.first.add(self.initialized).write(value) };
        self.initialized += 1;
    }

    /// Defuses the guard, returning how many elements were constructed. The elements are now owed
    /// to whoever owns the slots.
    pub(crate) fn complete(self) -> usize {
        let initialized = self.initialized;
        mem::forget(self);
        initialized
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        for index in (0..self.initialized).rev() {
            // SAFETY: Exactly the elements below `initialized` were constructed, and nobody else
            // drops them on this path.
            unsafe { ptr::drop_in_place(self.first.add(index).as_ptr()) }
        }
    }
}

/// A rollback guard for filling a gap opened inside live storage by shifting the tail right. On an
/// unwind before [`GapGuard::complete`], the partially filled gap is destroyed in reverse order
/// and the tail is shifted back left over it, restoring the original arrangement - both steps are
/// non-failing, as a rollback must be.
pub(crate) struct GapGuard<T> {
    gap: NonNull<T>,
    gap_len: usize,
    filled: usize,
    tail_len: usize,
}

impl<T> GapGuard<T> {
    /// Starts guarding a gap of `gap_len` raw slots at `gap`, with `tail_len` live elements
    /// sitting immediately after the gap.
    ///
    /// # Safety
    /// The tail must have just been shifted `gap_len` slots to the right, leaving
    /// `gap .. gap + gap_len` as raw storage and `gap + gap_len .. gap + gap_len + tail_len` as
    /// live elements, all within one allocation which stays untouched by others for the guard's
    /// lifetime.
    pub(crate) const unsafe fn new(gap: NonNull<T>, gap_len: usize, tail_len: usize) -> GapGuard<T> {
        GapGuard {
            gap,
            gap_len,
            filled: 0,
            tail_len,
        }
    }

    /// Constructs `value` into the next gap slot.
    pub(crate) fn push(&mut self, value: T) {
        debug_assert!(self.filled < self.gap_len);
        // SAFETY: In bounds of the gap promised to GapGuard::new.
        unsafe { self.gap.add(self.filled).write(value) };
        self.filled += 1;
    }

    /// Defuses the guard; the gap is full and the array's length may now cover it.
    pub(crate) fn complete(self) {
        debug_assert!(self.filled == self.gap_len);
        mem::forget(self);
    }
}

impl<T> Drop for GapGuard<T> {
    fn drop(&mut self) {
        // SAFETY: Slots below `filled` hold elements constructed by push and owned here on this
        // path; the tail range is live per GapGuard::new and ptr::copy handles the overlap.
        unsafe {
            for index in (0..self.filled).rev() {
                ptr::drop_in_place(self.gap.add(index).as_ptr());
            }
            ptr::copy(
                self.gap.add(self.gap_len).as_ptr(),
                self.gap.as_ptr(),
                self.tail_len,
            );
        }
    }
}
