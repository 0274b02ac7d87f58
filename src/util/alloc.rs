//! Instrumented element and allocator types for exercising construction, destruction and
//! allocation balance in tests.
#![allow(dead_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;
use std::rc::Rc;

use crate::alloc::{AllocError, DefaultAllocator, RawAllocator};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZeroSizedType;

thread_local! {
    static CONSTRUCTIONS: Cell<usize> = const { Cell::new(0) };
    static DESTRUCTIONS: Cell<usize> = const { Cell::new(0) };
    static CONSTRUCTION_FAILS_AT: Cell<usize> = const { Cell::new(0) };
    static DROP_ORDER: RefCell<Vec<i32>> = const { RefCell::new(Vec::new()) };
}

/// An element type which tallies its constructions and destructions in thread local state, and can
/// be told to panic on the n-th construction. Each test runs on its own thread, so tests don't
/// observe each other's tallies, but [`Probe::reset`] should still be called up front.
///
/// [`Probe::new`] itself is untallied, so that test fixtures can be prepared without disturbing
/// the numbers; only [`Clone`] and [`Default`] count as constructions.
#[derive(Debug)]
pub struct Probe {
    pub id: i32,
}

impl Probe {
    pub fn new(id: i32) -> Probe {
        Probe { id }
    }

    /// Clears all tallies and disables the construction failure.
    pub fn reset() {
        CONSTRUCTIONS.with(|c| c.set(0));
        DESTRUCTIONS.with(|c| c.set(0));
        CONSTRUCTION_FAILS_AT.with(|c| c.set(0));
        DROP_ORDER.with(|o| o.borrow_mut().clear());
    }

    /// Makes the `nth` tallied construction (1-based) panic instead of completing.
    pub fn fail_construction_at(nth: usize) {
        CONSTRUCTION_FAILS_AT.with(|c| c.set(nth));
    }

    pub fn constructions() -> usize {
        CONSTRUCTIONS.with(Cell::get)
    }

    pub fn destructions() -> usize {
        DESTRUCTIONS.with(Cell::get)
    }

    /// The ids of every dropped Probe, oldest drop first.
    pub fn drop_order() -> Vec<i32> {
        DROP_ORDER.with(|o| o.borrow().clone())
    }

    fn construct() {
        let next = Self::constructions() + 1;
        if next == CONSTRUCTION_FAILS_AT.with(Cell::get) {
            panic!("Probe construction {} failed", next);
        }
        CONSTRUCTIONS.with(|c| c.set(next));
    }
}

impl Default for Probe {
    fn default() -> Probe {
        Self::construct();
        Probe { id: 0 }
    }
}

impl Clone for Probe {
    fn clone(&self) -> Probe {
        Self::construct();
        Probe { id: self.id }
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        DESTRUCTIONS.with(|c| c.set(c.get() + 1));
        DROP_ORDER.with(|o| o.borrow_mut().push(self.id));
    }
}

impl PartialEq for Probe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Probe {}

#[derive(Debug, Default)]
pub struct AllocStats {
    pub allocations: Cell<usize>,
    pub deallocations: Cell<usize>,
    pub fails_at: Cell<usize>,
}

/// A [`RawAllocator`] which counts every allocation and deallocation it serves, and can be told to
/// refuse the n-th allocation. Clones share one tally, mirroring how an array copies its allocator
/// into transactions and iterators.
#[derive(Debug, Default, Clone)]
pub struct CountingAllocator {
    stats: Rc<AllocStats>,
}

impl CountingAllocator {
    pub fn new() -> CountingAllocator {
        CountingAllocator::default()
    }

    pub fn stats(&self) -> Rc<AllocStats> {
        Rc::clone(&self.stats)
    }

    /// Makes the `nth` allocation (1-based) fail with [`AllocError`].
    pub fn fail_allocation_at(&self, nth: usize) {
        self.stats.fails_at.set(nth);
    }

    pub fn allocations(&self) -> usize {
        self.stats.allocations.get()
    }

    pub fn deallocations(&self) -> usize {
        self.stats.deallocations.get()
    }
}

// SAFETY: Delegates to DefaultAllocator, which upholds the full contract; the tallies don't
// influence the returned blocks.
unsafe impl RawAllocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if self.stats.allocations.get() + 1 == self.stats.fails_at.get() {
            return Err(AllocError);
        }
        let ptr = DefaultAllocator.allocate(layout)?;
        self.stats.allocations.set(self.stats.allocations.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, pointer: NonNull<u8>, layout: Layout) {
        self.stats.deallocations.set(self.stats.deallocations.get() + 1);
        // SAFETY: The pointer was produced by the delegated allocate call with the same layout.
        unsafe { DefaultAllocator.deallocate(pointer, layout) }
    }
}
