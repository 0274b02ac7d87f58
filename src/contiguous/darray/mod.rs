//! A growable, contiguous, allocator-aware array: [`DArray`].

mod darray;
mod error;
mod iter;

pub(crate) mod guard;
pub(crate) mod storage;

mod tests;

pub use darray::*;
pub use error::*;
pub use iter::*;
