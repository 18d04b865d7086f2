use super::*;
use std::alloc::{alloc, dealloc, Layout};

struct Backing {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Backing {
    fn new(len: usize) -> Self {
        let layout = Layout::from_size_align(len, 8).unwrap();
        // SAFETY: layout has nonzero size.
        let ptr = NonNull::new(unsafe { alloc(layout) }).unwrap();
        Self { ptr, layout }
    }
}

impl Drop for Backing {
    fn drop(&mut self) {
        // SAFETY: matches the allocation in `new`.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

#[test]
fn first_allocation_uses_reserved_fast_slot() {
    let backing = Backing::new(64 * 16);
    let mut arena = Arena::new(backing.ptr, 64, 16);
    let p = arena.allocate();
    assert_eq!(p, backing.ptr);
    assert_eq!(arena.size(), 1);
}

#[test]
fn allocate_until_full_then_it_reports_full() {
    let backing = Backing::new(8 * 4);
    let mut arena = Arena::new(backing.ptr, 8, 4);
    let mut ptrs = Vec::new();
    for _ in 0..4 {
        assert!(!arena.is_full());
        ptrs.push(arena.allocate());
    }
    assert!(arena.is_full());
    assert_eq!(ptrs.len(), 4);
}

#[test]
fn free_then_reallocate_reuses_slot() {
    let backing = Backing::new(8 * 4);
    let mut arena = Arena::new(backing.ptr, 8, 4);
    let p0 = arena.allocate();
    let p1 = arena.allocate();
    arena.deallocate(p0);
    assert_eq!(arena.size(), 1);
    let p2 = arena.allocate();
    assert_eq!(p2, p0);
    assert_ne!(p1, p2);
}

#[test]
fn capacity_matches_arena_size_over_slot_size() {
    assert_eq!(Arena::slot_capacity(131072, 128), 1024);
}

#[test]
fn overflow_past_stack_capacity_round_trips() {
    let capacity = 2100;
    let backing = Backing::new(8 * capacity);
    let mut arena = Arena::new(backing.ptr, 8, capacity);
    let mut ptrs = Vec::with_capacity(capacity);
    for _ in 0..capacity {
        ptrs.push(arena.allocate());
    }
    assert!(arena.is_full());
    for p in ptrs.drain(..) {
        arena.deallocate(p);
    }
    assert!(arena.is_empty());
    for _ in 0..capacity {
        arena.allocate();
    }
    assert!(arena.is_full());
}
