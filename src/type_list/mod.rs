//! A compile-time list of types, built as a nested cons structure and manipulated entirely through
//! traits and associated types. Nothing here exists at runtime: the lists are never constructed,
//! only named, and every operation resolves during type checking.
//!
//! # Examples
//! ```
//! use darray::type_list;
//! use darray::type_list::{At, Here, There, TypeList};
//!
//! type Primitives = type_list![u8, u16, u32];
//!
//! assert_eq!(Primitives::LEN, 3);
//! let _second: <Primitives as At<There<Here>>>::Output = 16u16;
//! ```

use std::marker::PhantomData;

mod tests;

/// The empty type list.
pub struct Nil(());

/// A type list holding `Head` in front of the list `Tail`.
pub struct Cons<Head, Tail>(PhantomData<(Head, Tail)>);

/// The index of the front element, for [`At`] and [`Contains`].
pub struct Here(());

/// The index one position past `I`.
pub struct There<I>(PhantomData<I>);

mod private {
    pub trait Sealed {}

    impl Sealed for super::Nil {}
    impl<Head, Tail: Sealed> Sealed for super::Cons<Head, Tail> {}
}

/// Anything that is a type list: [`Nil`] or a [`Cons`] whose tail is one. Sealed, since the
/// operation traits below only make sense over exactly this structure.
pub trait TypeList: private::Sealed {
    /// The number of types in the list.
    const LEN: usize;
}

impl TypeList for Nil {
    const LEN: usize = 0;
}

impl<Head, Tail: TypeList> TypeList for Cons<Head, Tail> {
    const LEN: usize = 1 + Tail::LEN;
}

/// Prepends `X` to the list.
///
/// # Examples
/// ```
/// use darray::{type_list, type_list::PushFront};
///
/// type Pushed = <type_list![u16, u32] as PushFront<u8>>::Output;
/// // Pushed is now type_list![u8, u16, u32].
/// ```
pub trait PushFront<X>: TypeList {
    /// The list with `X` in front.
    type Output: TypeList;
}

impl<X, L: TypeList> PushFront<X> for L {
    type Output = Cons<X, L>;
}

/// Appends `X` to the list.
pub trait PushBack<X>: TypeList {
    /// The list with `X` at the back.
    type Output: TypeList;
}

impl<X> PushBack<X> for Nil {
    type Output = Cons<X, Nil>;
}

impl<X, Head, Tail: PushBack<X>> PushBack<X> for Cons<Head, Tail> {
    type Output = Cons<Head, <Tail as PushBack<X>>::Output>;
}

/// Splits the list into its front type and the rest. Not implemented for [`Nil`]: popping an empty
/// list is a type error, caught where the pop is written.
pub trait PopFront: TypeList {
    /// The front type.
    type First;
    /// The list behind the front type.
    type Rest: TypeList;
}

impl<Head, Tail: TypeList> PopFront for Cons<Head, Tail> {
    type First = Head;
    type Rest = Tail;
}

/// Splits the list into its back type and the rest. Not implemented for [`Nil`].
pub trait PopBack: TypeList {
    /// The back type.
    type Last;
    /// The list in front of the back type.
    type Rest: TypeList;
}

impl<Head> PopBack for Cons<Head, Nil> {
    type Last = Head;
    type Rest = Nil;
}

impl<Head, Next, Tail> PopBack for Cons<Head, Cons<Next, Tail>>
where
    Cons<Next, Tail>: PopBack,
{
    type Last = <Cons<Next, Tail> as PopBack>::Last;
    type Rest = Cons<Head, <Cons<Next, Tail> as PopBack>::Rest>;
}

/// Looks up the type at index `I`, where indices are spelled [`Here`], [`There<Here>`](There),
/// `There<There<Here>>` and so on. An index past the end is a type error.
pub trait At<I>: TypeList {
    /// The type at the index.
    type Output;
}

impl<Head, Tail: TypeList> At<Here> for Cons<Head, Tail> {
    type Output = Head;
}

impl<I, Head, Tail: At<I>> At<There<I>> for Cons<Head, Tail> {
    type Output = Tail::Output;
}

/// Witnesses that `X` appears in the list at index `I`. The index parameter lets the two impls
/// stay distinct when `X` appears more than once (or when checking the head and the tail would
/// otherwise overlap); in a bound it is usually left to inference.
///
/// # Examples
/// ```
/// use darray::{type_list, type_list::Contains};
///
/// fn requires_u16<L: Contains<u16, I>, I>() {}
///
/// requires_u16::<type_list![u8, u16, u32], _>();
/// ```
pub trait Contains<X, I>: TypeList {}

impl<X, Tail: TypeList> Contains<X, Here> for Cons<X, Tail> {}

impl<X, I, Head, Tail: Contains<X, I>> Contains<X, There<I>> for Cons<Head, Tail> {}

/// Builds a type list from a comma-separated list of types, front first.
///
/// # Examples
/// ```
/// use darray::type_list;
/// use darray::type_list::TypeList;
///
/// assert_eq!(<type_list![] as TypeList>::LEN, 0);
/// assert_eq!(<type_list![u8, u16, u32] as TypeList>::LEN, 3);
/// ```
#[macro_export]
macro_rules! type_list {
    [] => { $crate::type_list::Nil };
    [$head:ty $(, $rest:ty)* $(,)?] => {
        $crate::type_list::Cons<$head, $crate::type_list![$($rest),*]>
    };
}
