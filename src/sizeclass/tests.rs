use super::*;
use crate::arena_manager::ArenaManager;

const PAGE: usize = 4096;
const ARENA: usize = 1024;
const MAX: usize = PAGE * 16;

#[test]
fn round_size_maps_small_and_boundary_requests() {
    assert_eq!(round_size(0), 8);
    assert_eq!(round_size(1), 8);
    assert_eq!(round_size(8), 8);
    assert_eq!(round_size(9), 12);
    assert_eq!(round_size(65), 96);
    assert_eq!(round_size(96), 96);
    assert_eq!(round_size(MAX_SIZE_CLASS), MAX_SIZE_CLASS);
}

#[test]
fn class_index_round_trips_through_the_table() {
    for (i, &class) in SIZE_CLASSES.iter().enumerate() {
        assert_eq!(class_index(class), i);
    }
}

#[test]
fn size_class_allocator_allocates_and_frees_within_one_arena() {
    let mut arenas = ArenaManager::new(MAX, PAGE, ARENA);
    let mut sca = SizeClassAllocator::new(64, 64, PAGE);
    let p1 = sca.allocate(&mut arenas);
    let p2 = sca.allocate(&mut arenas);
    assert_ne!(p1, p2);
    // Recover the arena id the same way the front-end dispatcher would.
    let id = crate::arena_manager::ArenaId { page_index: 0, slot_in_page: 0 };
    sca.deallocate(&mut arenas, id, p1);
    let p3 = sca.allocate(&mut arenas);
    assert_eq!(p3, p1, "freed slot should be reused before growing the arena further");
}

#[test]
fn size_class_allocator_refills_when_arena_fills_up() {
    let mut arenas = ArenaManager::new(MAX, PAGE, ARENA);
    let capacity = crate::arena::Arena::slot_capacity(ARENA, 64);
    let mut sca = SizeClassAllocator::new(64, 64, PAGE);
    let mut ptrs = Vec::new();
    for _ in 0..capacity {
        ptrs.push(sca.allocate(&mut arenas));
    }
    // One more forces a second arena.
    let overflow = sca.allocate(&mut arenas);
    assert!(!ptrs.contains(&overflow));
}
