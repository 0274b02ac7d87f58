//! The allocation capability underpinning every owning type in this crate. Contains the
//! [`RawAllocator`] trait, the [`DefaultAllocator`] implementation over the global heap and the
//! [`AllocError`] type.
#![warn(missing_docs)]

mod allocator;

pub use allocator::*;
