#![cfg(test)]

use super::*;
use crate::type_list;

trait Same<T> {}

impl<T> Same<T> for T {}

/// Compiles only when `A` and `B` resolve to the same type.
fn require_same<A: Same<B>, B>() {}

fn require_contains<L: Contains<X, I>, X, I>() {}

type Empty = type_list![];
type Three = type_list![u8, u16, u32];

#[test]
fn lengths_count_every_type() {
    assert_eq!(Empty::LEN, 0);
    assert_eq!(Three::LEN, 3);
    assert_eq!(<type_list![u8, u8, u8, u8]>::LEN, 4);
}

#[test]
fn push_front_prepends() {
    require_same::<<Empty as PushFront<u8>>::Output, type_list![u8]>();
    require_same::<<Three as PushFront<i8>>::Output, type_list![i8, u8, u16, u32]>();
    assert_eq!(<<Three as PushFront<i8>>::Output>::LEN, 4);
}

#[test]
fn push_back_appends() {
    require_same::<<Empty as PushBack<u8>>::Output, type_list![u8]>();
    require_same::<<Three as PushBack<u64>>::Output, type_list![u8, u16, u32, u64]>();
}

#[test]
fn pop_front_splits_off_the_head() {
    require_same::<<Three as PopFront>::First, u8>();
    require_same::<<Three as PopFront>::Rest, type_list![u16, u32]>();
}

#[test]
fn pop_back_splits_off_the_last() {
    require_same::<<type_list![u8] as PopBack>::Last, u8>();
    require_same::<<type_list![u8] as PopBack>::Rest, Empty>();
    require_same::<<Three as PopBack>::Last, u32>();
    require_same::<<Three as PopBack>::Rest, type_list![u8, u16]>();
}

#[test]
fn push_then_pop_round_trips() {
    require_same::<<<Three as PushBack<u64>>::Output as PopBack>::Rest, Three>();
    require_same::<<<Three as PushFront<i8>>::Output as PopFront>::Rest, Three>();
}

#[test]
fn indexing_walks_the_list() {
    require_same::<<Three as At<Here>>::Output, u8>();
    require_same::<<Three as At<There<Here>>>::Output, u16>();
    require_same::<<Three as At<There<There<Here>>>>::Output, u32>();
}

#[test]
fn containment_is_found_by_inference() {
    require_contains::<Three, u8, _>();
    require_contains::<Three, u16, _>();
    require_contains::<Three, u32, _>();
    // A duplicated type is findable at either index when spelled explicitly.
    require_contains::<type_list![u8, u8], u8, Here>();
    require_contains::<type_list![u8, u8], u8, There<Here>>();
}
