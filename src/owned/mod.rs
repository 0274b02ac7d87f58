//! Unique-ownership heap pointers with pluggable destruction: [`OwnedValue`] for single values and
//! [`OwnedArray`] for fixed-count slices, both disposing of their pointee through a [`Deleter`].

mod array;
mod deleter;
mod value;

mod tests;

pub use array::*;
pub use deleter::*;
pub use value::*;
