#![cfg(test)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::*;
use crate::alloc::AllocError;
use crate::util::alloc::{CountingAllocator, Probe, ZeroSizedType};
use crate::util::panic::assert_panics;

#[test]
fn new_is_empty_and_unallocated() {
    let arr: DArray<u8> = DArray::new();
    assert_eq!(arr.len(), 0);
    assert_eq!(arr.capacity(), 0);
    assert!(arr.is_empty());
}

#[test]
fn with_capacity_is_exact() {
    let arr: DArray<u8> = DArray::with_capacity(7).unwrap();
    assert_eq!(arr.len(), 0);
    assert_eq!(arr.capacity(), 7);
}

#[test]
fn capacity_schedule_doubles_from_one() {
    let mut arr = DArray::new();
    let mut schedule = Vec::new();
    for i in 0..6 {
        arr.push(i).unwrap();
        assert_eq!(arr.len(), i + 1);
        schedule.push(arr.capacity());
    }
    assert_eq!(schedule, [1, 2, 4, 4, 8, 8]);
}

#[test]
fn push_five_from_empty() {
    let mut arr = DArray::new();
    for i in 1..=5 {
        arr.push(i).unwrap();
    }
    assert_eq!(arr.len(), 5);
    assert_eq!(arr.capacity(), 8);
    assert_eq!(&*arr, &[1, 2, 3, 4, 5]);
}

#[test]
fn pop_returns_back_to_front() {
    let mut arr = DArray::from([1, 2, 3]);
    assert_eq!(arr.pop(), Some(3));
    assert_eq!(arr.pop(), Some(2));
    assert_eq!(arr.pop(), Some(1));
    assert_eq!(arr.pop(), None);
    assert_eq!(arr.capacity(), 3);
}

#[test]
fn insert_grows_and_shifts() {
    let mut arr = DArray::from([1, 2, 3, 4, 5]);
    assert_eq!(arr.capacity(), 5);
    arr.insert(3, 255).unwrap();
    assert_eq!(&*arr, &[1, 2, 3, 255, 4, 5]);
    assert_eq!(arr.len(), 6);
    assert_eq!(arr.capacity(), 10);
}

#[test]
fn insert_then_remove_restores_sequence() {
    let mut arr = DArray::from([1, 2, 3, 4, 5]);
    arr.insert(2, 99).unwrap();
    assert_eq!(&*arr, &[1, 2, 99, 3, 4, 5]);
    assert_eq!(arr.remove(2), 99);
    assert_eq!(&*arr, &[1, 2, 3, 4, 5]);
}

#[test]
fn remove_shifts_and_keeps_capacity() {
    let mut arr = DArray::from([1, 2, 3, 4, 5]);
    assert_eq!(arr.remove(1), 2);
    assert_eq!(&*arr, &[1, 3, 4, 5]);
    assert_eq!(arr.len(), 4);
    assert_eq!(arr.capacity(), 5);
}

#[test]
fn remove_range_interior_and_tail() {
    let mut arr = DArray::from([1, 2, 3, 4, 5]);
    arr.remove_range(1..3);
    assert_eq!(&*arr, &[1, 4, 5]);
    arr.remove_range(1..1);
    assert_eq!(&*arr, &[1, 4, 5]);
    arr.remove_range(1..3);
    assert_eq!(&*arr, &[1]);
    assert_eq!(arr.capacity(), 5);
}

#[test]
fn out_of_bounds_operations_panic() {
    let mut arr = DArray::from([1, 2, 3]);
    assert_panics!({ arr.remove(3) });
    assert_panics!({ arr.insert(4, 0).unwrap() });
    assert_panics!({ arr.remove_range(2..5) });
    assert_eq!(&*arr, &[1, 2, 3]);
}

#[test]
fn checked_access_reports_index_and_len() {
    let mut arr = DArray::from([1, 2, 3]);
    assert_eq!(arr.at(0), Ok(&1));
    assert_eq!(arr.at(3), Err(IndexOutOfBounds { index: 3, len: 3 }));
    *arr.at_mut(2).unwrap() = 30;
    assert_eq!(&*arr, &[1, 2, 30]);
    assert!(arr.at_mut(7).is_err());
}

#[test]
fn reserve_is_exact_and_idempotent() {
    let mut arr = DArray::from([1, 2, 3]);
    arr.reserve(10).unwrap();
    assert_eq!(arr.capacity(), 10);
    assert_eq!(&*arr, &[1, 2, 3]);
    arr.reserve(4).unwrap();
    assert_eq!(arr.capacity(), 10);
}

#[test]
fn reserve_past_max_len_overflows() {
    let mut arr: DArray<u64> = DArray::new();
    let err = arr.reserve(usize::MAX).unwrap_err();
    assert!(err.is_capacity_overflow());
    assert_eq!(arr.capacity(), 0);
}

#[test]
fn shrink_to_fit_releases_surplus() {
    let mut arr: DArray<u8> = DArray::with_capacity(10).unwrap();
    arr.push(1).unwrap();
    arr.push(2).unwrap();
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 2);
    assert_eq!(&*arr, &[1, 2]);

    arr.clear();
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 0);
}

#[test]
fn shrink_to_fit_swallows_allocation_failure() {
    let alloc = CountingAllocator::new();
    let mut arr = DArray::from_slice_in(&[1, 2, 3], alloc.clone()).unwrap();
    arr.reserve(10).unwrap();
    alloc.fail_allocation_at(alloc.allocations() + 1);
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 10);
    assert_eq!(&*arr, &[1, 2, 3]);
}

#[test]
fn failed_growth_leaves_array_untouched() {
    let alloc = CountingAllocator::new();
    let mut arr = DArray::from_slice_in(&[1, 2, 3], alloc.clone()).unwrap();
    assert_eq!(arr.capacity(), 3);

    alloc.fail_allocation_at(alloc.allocations() + 1);
    assert!(arr.push(4).unwrap_err().is_alloc());
    assert_eq!(&*arr, &[1, 2, 3]);
    assert_eq!(arr.capacity(), 3);

    assert!(arr.insert_slice(1, &[7, 8]).unwrap_err().is_alloc());
    assert_eq!(&*arr, &[1, 2, 3]);

    assert!(arr.reserve(100).unwrap_err().is_alloc());
    assert_eq!(arr.capacity(), 3);
}

#[test]
fn failed_assignment_leaves_array_untouched() {
    let alloc = CountingAllocator::new();
    let mut arr = DArray::from_slice_in(&[1, 2, 3], alloc.clone()).unwrap();
    alloc.fail_allocation_at(alloc.allocations() + 1);
    assert_eq!(arr.assign_slice(&[9, 9, 9, 9]), Err(AllocError));
    assert_eq!(&*arr, &[1, 2, 3]);
    assert_eq!(arr.try_clone(), Err(AllocError));
}

#[test]
fn assignment_replaces_contents_exactly() {
    let mut arr = DArray::from([1, 2, 3]);
    arr.assign_fill(&7, 5).unwrap();
    assert_eq!(&*arr, &[7, 7, 7, 7, 7]);
    assert_eq!(arr.capacity(), 5);

    arr.assign_slice(&[1, 2]).unwrap();
    assert_eq!(&*arr, &[1, 2]);
    assert_eq!(arr.capacity(), 2);

    arr.assign_fill(&0, 0).unwrap();
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), 2);
}

#[test]
fn take_leaves_source_empty() {
    let mut src = DArray::from([1, 2, 3]);
    let dst = src.take();
    assert_eq!(&*dst, &[1, 2, 3]);
    assert_eq!(src.len(), 0);
    assert_eq!(src.capacity(), 0);
}

#[test]
fn swap_with_exchanges_everything() {
    let mut a = DArray::from([1, 2]);
    let mut b = DArray::from([3, 4, 5]);
    a.swap_with(&mut b);
    assert_eq!(&*a, &[3, 4, 5]);
    assert_eq!(a.capacity(), 3);
    assert_eq!(&*b, &[1, 2]);
    assert_eq!(b.capacity(), 2);
}

#[test]
fn construction_and_destruction_balance() {
    Probe::reset();
    let elems: Vec<Probe> = (1..=3).map(Probe::new).collect();
    let arr = DArray::from_slice(&elems).unwrap();
    assert_eq!(Probe::constructions(), 3);
    assert_eq!(Probe::destructions(), 0);

    drop(arr);
    assert_eq!(Probe::destructions(), 3);
    assert_eq!(Probe::drop_order(), [3, 2, 1]);
}

#[test]
fn allocation_and_deallocation_balance() {
    let alloc = CountingAllocator::new();
    let mut arr = DArray::new_in(alloc.clone());
    for i in 0..20 {
        arr.push(i).unwrap();
    }
    arr.shrink_to_fit();
    drop(arr);
    assert_eq!(alloc.allocations(), alloc.deallocations());
    assert!(alloc.allocations() > 0);
}

#[test]
fn failed_element_construction_rolls_back_in_reverse() {
    Probe::reset();
    let alloc = CountingAllocator::new();
    let elems: Vec<Probe> = (1..=10).map(Probe::new).collect();

    Probe::fail_construction_at(5);
    assert_panics!({
        let _ = DArray::from_slice_in(&elems, alloc.clone());
    });

    assert_eq!(Probe::constructions(), 4);
    assert_eq!(Probe::destructions(), 4);
    assert_eq!(Probe::drop_order(), [4, 3, 2, 1]);
    assert_eq!(alloc.allocations(), 1);
    assert_eq!(alloc.deallocations(), 1);
}

#[test]
fn failed_gap_fill_restores_the_tail() {
    Probe::reset();
    let elems: Vec<Probe> = (1..=4).map(Probe::new).collect();
    let mut arr = DArray::from_slice(&elems).unwrap();
    arr.reserve(8).unwrap();

    Probe::reset();
    Probe::fail_construction_at(2);
    let incoming: Vec<Probe> = (7..=9).map(Probe::new).collect();
    assert_panics!({ arr.insert_slice(2, &incoming).unwrap() });

    let ids: Vec<i32> = arr.iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 2, 3, 4]);
    assert_eq!(arr.len(), 4);
    assert_eq!(Probe::constructions(), 1);
    assert_eq!(Probe::destructions(), 1);
    assert_eq!(Probe::drop_order(), [7]);
}

#[test]
fn failed_construction_during_growth_discards_candidate() {
    Probe::reset();
    let alloc = CountingAllocator::new();
    let elems: Vec<Probe> = (1..=3).map(Probe::new).collect();
    let mut arr = DArray::from_slice_in(&elems, alloc.clone()).unwrap();
    assert_eq!(arr.capacity(), 3);

    Probe::reset();
    Probe::fail_construction_at(1);
    let incoming = Probe::new(9);
    let allocations_before = alloc.allocations();
    assert_panics!({ arr.insert_fill(1, &incoming, 2).unwrap() });

    let ids: Vec<i32> = arr.iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(arr.capacity(), 3);
    assert_eq!(alloc.allocations(), allocations_before + 1);
    assert_eq!(alloc.deallocations(), 1);
}

#[test]
fn failed_in_place_push_changes_nothing() {
    let mut arr: DArray<u8> = DArray::with_capacity(2).unwrap();
    arr.push(1).unwrap();
    assert_panics!({
        arr.push_with(|| panic!("construction failed")).unwrap()
    });
    assert_eq!(&*arr, &[1]);
    assert_eq!(arr.capacity(), 2);
}

#[test]
fn truncate_drops_surplus_in_reverse() {
    Probe::reset();
    let elems: Vec<Probe> = (1..=5).map(Probe::new).collect();
    let mut arr = DArray::from_slice(&elems).unwrap();

    arr.truncate(2);
    assert_eq!(arr.len(), 2);
    assert_eq!(arr.capacity(), 5);
    assert_eq!(Probe::drop_order(), [5, 4, 3]);

    arr.truncate(10);
    assert_eq!(arr.len(), 2);
}

#[test]
fn in_place_construction_runs_after_growth() {
    let mut arr = DArray::from([1, 2]);
    arr.push_with(|| 3).unwrap();
    arr.insert_with(0, || 0).unwrap();
    assert_eq!(&*arr, &[0, 1, 2, 3]);
}

#[test]
fn repeat_constructors() {
    let defaulted: DArray<u8> = DArray::repeat_default(3).unwrap();
    assert_eq!(&*defaulted, &[0, 0, 0]);

    let repeated = DArray::repeat_item(&7, 4).unwrap();
    assert_eq!(&*repeated, &[7, 7, 7, 7]);

    let empty: DArray<u8> = DArray::repeat_default(0).unwrap();
    assert_eq!(empty.capacity(), 0);
}

#[test]
fn clone_has_no_headroom() {
    let mut arr = DArray::from([1, 2, 3]);
    arr.reserve(10).unwrap();
    let cloned = arr.clone();
    assert_eq!(cloned, arr);
    assert_eq!(cloned.capacity(), 3);
}

#[test]
fn clone_from_follows_assignment_contract() {
    let mut arr = DArray::from([1, 2, 3]);
    let source = DArray::from([9, 8]);
    arr.clone_from(&source);
    assert_eq!(&*arr, &[9, 8]);
    assert_eq!(arr.capacity(), 2);
}

#[test]
fn slice_access_through_deref() {
    let mut arr = DArray::from([3, 1, 2]);
    assert_eq!(arr[0], 3);
    assert_eq!(arr.first(), Some(&3));
    assert_eq!(arr.last(), Some(&2));
    arr.sort();
    assert_eq!(&*arr, &[1, 2, 3]);
    arr.swap(0, 2);
    assert_eq!(&*arr, &[3, 2, 1]);
}

#[test]
fn into_iter_is_double_ended_and_balanced() {
    Probe::reset();
    let elems: Vec<Probe> = (1..=4).map(Probe::new).collect();
    let arr = DArray::from_slice(&elems).unwrap();

    let mut iter = arr.into_iter();
    assert_eq!(iter.len(), 4);
    assert_eq!(iter.next().map(|p| p.id), Some(1));
    assert_eq!(iter.next_back().map(|p| p.id), Some(4));
    assert_eq!(iter.as_slice().len(), 2);
    drop(iter);
    assert_eq!(Probe::destructions(), 4);
}

#[test]
fn into_iter_collects_in_order() {
    let arr = DArray::from([1, 2, 3]);
    let round: Vec<i32> = arr.into_iter().collect();
    assert_eq!(round, [1, 2, 3]);
}

#[test]
fn from_iterator_and_extend() {
    let mut arr: DArray<usize> = (0..5).collect();
    assert_eq!(&*arr, &[0, 1, 2, 3, 4]);
    assert_eq!(arr.capacity(), 5);

    arr.extend(5..7);
    assert_eq!(&*arr, &[0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn zero_sized_elements_never_allocate() {
    let alloc = CountingAllocator::new();
    let mut arr = DArray::new_in(alloc.clone());
    for _ in 0..100 {
        arr.push(ZeroSizedType).unwrap();
    }
    assert_eq!(arr.len(), 100);
    assert!(arr.capacity() >= 100);
    assert_eq!(arr.pop(), Some(ZeroSizedType));
    assert_eq!(alloc.allocations(), 0);
    assert_eq!(DArray::<ZeroSizedType>::MAX_LEN, usize::MAX);
}

#[test]
fn equality_and_hashing_follow_contents() {
    let a = DArray::from([1, 2, 3]);
    let mut b = DArray::from([1, 2]);
    assert_ne!(a, b);
    b.push(3).unwrap();
    assert_eq!(a, b);

    let mut hasher_a = DefaultHasher::new();
    a.hash(&mut hasher_a);
    let mut hasher_b = DefaultHasher::new();
    b.hash(&mut hasher_b);
    assert_eq!(hasher_a.finish(), hasher_b.finish());
}

#[test]
fn formatting() {
    let arr = DArray::from([1, 2, 3]);
    assert_eq!(
        format!("{:?}", arr),
        "DArray { contents: [1, 2, 3], len: 3, cap: 3 }"
    );
    assert_eq!(format!("{}", arr), "[1, 2, 3]");
}
