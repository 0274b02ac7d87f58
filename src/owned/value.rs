use std::alloc::Layout;
use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use super::deleter::{DefaultDeleter, Deleter};
use crate::alloc::{AllocError, DefaultAllocator, RawAllocator};

/// A single-value owning pointer with a pluggable [`Deleter`]: never null, never shared, disposed
/// of through the deleter exactly once when the owner drops. The unique-ownership half of [`Box`],
/// with the destruction strategy lifted into a type parameter.
///
/// Associated functions are used in place of methods wherever a method would shadow one of the
/// pointee's, so `value.frobnicate()` always reaches the pointee.
pub struct OwnedValue<T, D: Deleter<T> = DefaultDeleter> {
    ptr: NonNull<T>,
    deleter: D,
    _marker: PhantomData<T>,
}

impl<T> OwnedValue<T> {
    /// Moves `value` onto the heap under the default deleter.
    ///
    /// # Errors
    /// Fails with [`AllocError`] if the block can't be allocated, in which case `value` is simply
    /// dropped.
    ///
    /// # Examples
    /// ```
    /// # use darray::owned::OwnedValue;
    /// let owned = OwnedValue::new(42).unwrap();
    /// assert_eq!(*owned, 42);
    /// ```
    pub fn new(value: T) -> Result<OwnedValue<T>, AllocError> {
        let ptr = DefaultAllocator.allocate(Layout::new::<T>())?.cast::<T>();
        // SAFETY: The fresh block is valid for one T.
        unsafe { ptr.write(value) };
        Ok(OwnedValue {
            ptr,
            deleter: DefaultDeleter,
            _marker: PhantomData,
        })
    }
}

impl<T, D: Deleter<T>> OwnedValue<T, D> {
    /// Assembles an owner from a raw pointer and the deleter which knows how to dispose of it.
    ///
    /// # Safety
    /// `ptr` must reference a live value which nothing else owns, and `deleter` must be able to
    /// dispose of it.
    pub const unsafe fn from_parts(ptr: NonNull<T>, deleter: D) -> OwnedValue<T, D> {
        OwnedValue {
            ptr,
            deleter,
            _marker: PhantomData,
        }
    }

    /// Disassembles the owner into its raw pointer and deleter without disposing of the pointee.
    /// The caller takes over ownership, typically to hand it to [`OwnedValue::from_parts`] again.
    pub fn into_parts(this: Self) -> (NonNull<T>, D) {
        let this = ManuallyDrop::new(this);
        // SAFETY: this's drop is suppressed, so the deleter is moved out exactly once.
        (this.ptr, unsafe { ptr::read(&this.deleter) })
    }

    /// Swaps a new value into the pointee, returning the old one. The allocation is reused.
    ///
    /// # Examples
    /// ```
    /// # use darray::owned::OwnedValue;
    /// let mut owned = OwnedValue::new(1).unwrap();
    /// assert_eq!(OwnedValue::replace(&mut owned, 2), 1);
    /// assert_eq!(*owned, 2);
    /// ```
    pub fn replace(this: &mut Self, value: T) -> T {
        // SAFETY: The pointee is live and uniquely owned.
        unsafe { ptr::replace(this.ptr.as_ptr(), value) }
    }

    /// Exchanges the pointees (and deleters) of two owners in O(1), without touching either value.
    pub fn swap(this: &mut Self, other: &mut OwnedValue<T, D>) {
        std::mem::swap(this, other);
    }

    /// Borrows the deleter.
    pub const fn deleter(this: &Self) -> &D {
        &this.deleter
    }

    /// Mutably borrows the deleter.
    pub const fn deleter_mut(this: &mut Self) -> &mut D {
        &mut this.deleter
    }

    /// Converts into an owner with a more general deleter, the ownership-transfer analog of
    /// assigning a `UniquePointer` to one with a convertible deleter type.
    ///
    /// # Examples
    /// ```
    /// # use std::ptr::NonNull;
    /// # use darray::owned::{Deleter, DefaultDeleter, OwnedValue};
    /// #[derive(Default)]
    /// struct LoudDeleter;
    ///
    /// impl From<DefaultDeleter> for LoudDeleter {
    ///     fn from(_: DefaultDeleter) -> LoudDeleter {
    ///         LoudDeleter
    ///     }
    /// }
    ///
    /// unsafe impl<T> Deleter<T> for LoudDeleter {
    ///     unsafe fn delete(&mut self, pointer: NonNull<T>) {
    ///         println!("deleting!");
    ///         unsafe { DefaultDeleter.delete(pointer) }
    ///     }
    /// }
    ///
    /// let plain = OwnedValue::new(42).unwrap();
    /// let loud: OwnedValue<i32, LoudDeleter> = OwnedValue::with_deleter(plain);
    /// assert_eq!(*loud, 42);
    /// ```
    pub fn with_deleter<D2>(this: Self) -> OwnedValue<T, D2>
    where
        D2: Deleter<T> + From<D>,
    {
        let (ptr, deleter) = Self::into_parts(this);
        // SAFETY: Ownership moves straight across; the converted deleter takes over disposal.
        unsafe { OwnedValue::from_parts(ptr, D2::from(deleter)) }
    }
}

impl<T, D: Deleter<T>> Drop for OwnedValue<T, D> {
    fn drop(&mut self) {
        // SAFETY: The pointee is live, uniquely owned and never used again.
        unsafe { self.deleter.delete(self.ptr) }
    }
}

impl<T, D: Deleter<T>> Deref for OwnedValue<T, D> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: The pointee is live for as long as the owner, and the borrow checker keeps the
        // reference within that.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T, D: Deleter<T>> DerefMut for OwnedValue<T, D> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: As for Deref, with exclusivity from the mutable borrow of the single owner.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T, D: Deleter<T>> AsRef<T> for OwnedValue<T, D> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T, D: Deleter<T>> AsMut<T> for OwnedValue<T, D> {
    fn as_mut(&mut self) -> &mut T {
        self
    }
}

// SAFETY: The owner is the only handle to the pointee, so sending it sends the value and deleter.
unsafe impl<T: Send, D: Deleter<T> + Send> Send for OwnedValue<T, D> {}
// SAFETY: Shared access to the owner only ever hands out shared references to the pointee.
unsafe impl<T: Sync, D: Deleter<T> + Sync> Sync for OwnedValue<T, D> {}

impl<T: Debug, D: Deleter<T>> Debug for OwnedValue<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&**self, f)
    }
}

impl<T: Display, D: Deleter<T>> Display for OwnedValue<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&**self, f)
    }
}
