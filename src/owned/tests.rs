#![cfg(test)]

use std::cell::Cell;
use std::ptr::NonNull;
use std::rc::Rc;

use super::*;
use crate::util::alloc::Probe;
use crate::util::panic::assert_panics;

/// A deleter which tallies how many times it ran before delegating to the default one.
#[derive(Debug, Default, Clone)]
struct TalliedDeleter {
    deletions: Rc<Cell<usize>>,
}

impl From<DefaultDeleter> for TalliedDeleter {
    fn from(_: DefaultDeleter) -> TalliedDeleter {
        TalliedDeleter::default()
    }
}

// SAFETY: Delegates disposal to DefaultDeleter; the tally has no effect on it.
unsafe impl<T> Deleter<T> for TalliedDeleter {
    unsafe fn delete(&mut self, pointer: NonNull<T>) {
        self.deletions.set(self.deletions.get() + 1);
        // SAFETY: Forwarded under the same contract.
        unsafe { DefaultDeleter.delete(pointer) }
    }
}

#[test]
fn value_round_trips_through_the_heap() {
    let mut owned = OwnedValue::new(41).unwrap();
    assert_eq!(*owned, 41);
    *owned += 1;
    assert_eq!(*owned, 42);
}

#[test]
fn value_replace_returns_the_old_pointee() {
    let mut owned = OwnedValue::new(String::from("old")).unwrap();
    let old = OwnedValue::replace(&mut owned, String::from("new"));
    assert_eq!(old, "old");
    assert_eq!(*owned, "new");
}

#[test]
fn value_swap_exchanges_pointees() {
    let mut a = OwnedValue::new(1).unwrap();
    let mut b = OwnedValue::new(2).unwrap();
    OwnedValue::swap(&mut a, &mut b);
    assert_eq!(*a, 2);
    assert_eq!(*b, 1);
}

#[test]
fn value_drops_its_pointee_once() {
    Probe::reset();
    let owned = OwnedValue::new(Probe::new(1)).unwrap();
    assert_eq!(Probe::destructions(), 0);
    drop(owned);
    assert_eq!(Probe::destructions(), 1);
    assert_eq!(Probe::drop_order(), [1]);
}

#[test]
fn value_parts_round_trip() {
    let owned = OwnedValue::new(7).unwrap();
    let (ptr, deleter) = OwnedValue::into_parts(owned);
    // SAFETY: Exactly the parts of a live owner, reassembled once.
    let owned = unsafe { OwnedValue::from_parts(ptr, deleter) };
    assert_eq!(*owned, 7);
}

#[test]
fn value_with_deleter_converts_and_still_deletes() {
    let plain = OwnedValue::new(5).unwrap();
    let tallied: OwnedValue<i32, TalliedDeleter> = OwnedValue::with_deleter(plain);
    let deletions = OwnedValue::deleter(&tallied).deletions.clone();
    assert_eq!(*tallied, 5);
    drop(tallied);
    assert_eq!(deletions.get(), 1);
}

#[test]
fn value_formatting_shows_the_pointee() {
    let owned = OwnedValue::new(42).unwrap();
    assert_eq!(format!("{}", owned), "42");
    assert_eq!(format!("{:?}", owned), "42");
}

#[test]
fn array_construction_and_indexing() {
    let mut arr = OwnedArray::from_fn(5, |i| i as i32 * 10).unwrap();
    assert_eq!(arr.len(), 5);
    assert_eq!(arr[0], 0);
    assert_eq!(arr[4], 40);
    arr[2] = -1;
    assert_eq!(arr.as_slice(), &[0, 10, -1, 30, 40]);
    assert_eq!(arr.get(5), None);
    assert_eq!(&arr[1..3], &[10, -1]);
}

#[test]
fn array_of_defaults() {
    let arr: OwnedArray<u8> = OwnedArray::repeat_default(4).unwrap();
    assert_eq!(arr.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn empty_array_never_allocates_but_still_works() {
    let arr: OwnedArray<u8> = OwnedArray::repeat_default(0).unwrap();
    assert_eq!(arr.len(), 0);
    assert!(arr.is_empty());
    assert_eq!(arr.get(0), None);
}

#[test]
fn array_iteration() {
    let mut arr = OwnedArray::from_fn(3, |i| i).unwrap();
    let collected: Vec<usize> = arr.iter().copied().collect();
    assert_eq!(collected, [0, 1, 2]);
    for item in &mut arr {
        *item += 1;
    }
    assert_eq!(arr.as_slice(), &[1, 2, 3]);
}

#[test]
fn array_drops_every_element() {
    Probe::reset();
    let elems: Vec<Probe> = (1..=3).map(Probe::new).collect();
    let arr = OwnedArray::from_fn(3, |i| elems[i].clone()).unwrap();
    assert_eq!(Probe::constructions(), 3);
    drop(arr);
    assert_eq!(Probe::destructions(), 3);
    assert_eq!(Probe::drop_order(), [1, 2, 3]);
}

#[test]
fn failed_array_construction_rolls_back_in_reverse() {
    Probe::reset();
    let elems: Vec<Probe> = (1..=5).map(Probe::new).collect();

    Probe::fail_construction_at(3);
    assert_panics!({
        let _ = OwnedArray::from_fn(5, |i| elems[i].clone());
    });

    assert_eq!(Probe::constructions(), 2);
    assert_eq!(Probe::destructions(), 2);
    assert_eq!(Probe::drop_order(), [2, 1]);
}

#[test]
fn array_swap_with_exchanges_pointees() {
    let mut a = OwnedArray::from_fn(2, |i| i).unwrap();
    let mut b = OwnedArray::from_fn(3, |i| i + 10).unwrap();
    a.swap_with(&mut b);
    assert_eq!(a.as_slice(), &[10, 11, 12]);
    assert_eq!(b.as_slice(), &[0, 1]);
}
