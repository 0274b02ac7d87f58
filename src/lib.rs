//! This crate is my attempt at writing some of the standard library's most fundamental building
//! blocks from scratch: a growable array, owning pointers and a compile-time list of types.
//!
//! # Purpose
//! This is a learning project, with no expectation of production use. The interesting part is not
//! the API surface (which deliberately echoes [`std`]) but the machinery underneath: every
//! container here sits on a hand-rolled allocation layer, and every fallible operation is written
//! to be transactional - it either completes, or it unwinds having put everything back the way it
//! was. Getting that right without a garbage collector, and without leaking on the unwind paths,
//! is the whole exercise.
//!
//! The centerpiece is [`DArray`](contiguous::DArray), a [`Vec`]-alike over a pluggable
//! [`RawAllocator`](alloc::RawAllocator). Allocation failure is an ordinary [`Result`] rather than
//! an abort, so every growth and assignment path has to be honest about what happens when memory
//! runs out. Element-level failures (a panicking [`Clone`], say) unwind through rollback guards
//! instead. The [`owned`] module applies the same allocation layer to single values and fixed
//! slices, with the destruction strategy lifted into a [`Deleter`](owned::Deleter) parameter, and
//! [`type_list`] is a purely compile-time aside that costs nothing at runtime.
//!
//! # Error Handling
//! Errors are strongly typed: small structs (mostly ZSTs) implementing
//! [`Error`](std::error::Error), combined into enums for static dispatch where an operation can
//! fail more than one way. Out-of-bounds arguments to operations like
//! [`remove`](contiguous::DArray::remove) are caller bugs and panic, the way [`std`] treats them;
//! out-of-memory is never a caller bug and is always a [`Result`]. Trait implementations with no
//! room for a [`Result`] in their signatures ([`Clone`], [`Extend`]) surface allocation failure as
//! a panic carrying the error's own message.
//!
//! # Dependencies
//! This crate uses `std`, but no `std` containers anywhere in library paths: no [`Vec`], no
//! [`Box`]. The allocation layer bottoms out in [`std::alloc`] behind
//! [`DefaultAllocator`](alloc::DefaultAllocator), and everything above it manages its own memory.
//!
//! It also depends on some derive macros because they're helpful and remove the need for some very
//! repetitive programming.

#![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod alloc;
pub mod contiguous;
pub mod owned;
pub mod type_list;

pub(crate) mod util;
