//! Containers which store their elements in one contiguous allocation.

/// A growable array with a pluggable allocator and transactional mutations.
pub mod darray;

#[doc(inline)]
pub use darray::DArray;
