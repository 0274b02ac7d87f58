use std::error::Error;
use std::fmt::{self, Formatter};

use derive_more::{Display, Error as ErrorDerive, From, IsVariant, TryInto};

use crate::alloc::AllocError;

/// The error produced by checked element access when the index is not less than the current
/// length. Unchecked access with a bad index is a precondition violation instead, not a reported
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    /// The offending index.
    pub index: usize,
    /// The length of the array at the time of the access.
    pub len: usize,
}

impl fmt::Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index {} out of bounds for collection with {} elements!",
            self.index, self.len
        )
    }
}

impl Error for IndexOutOfBounds {}

/// The error produced when a requested capacity exceeds the maximum representable element count,
/// in contexts distinct from raw allocation (e.g. `reserve` with an absurd argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityOverflow;

impl fmt::Display for CapacityOverflow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Capacity overflow!")
    }
}

impl Error for CapacityOverflow {}

/// Either of the two ways a capacity-extending operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ErrorDerive, From, TryInto, IsVariant)]
pub enum ReserveError {
    /// The allocator refused the request.
    Alloc(AllocError),
    /// The required capacity isn't representable.
    CapacityOverflow(CapacityOverflow),
}
