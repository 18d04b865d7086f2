use super::*;

const PAGE: usize = 4096;
const ARENA: usize = 1024;
const MAX: usize = PAGE * 16;

#[test]
fn allocate_arena_creates_a_page_on_first_use() {
    let mut mgr = ArenaManager::new(MAX, PAGE, ARENA);
    let (id, ptr) = mgr.allocate_arena(64);
    assert_eq!(id.page_index, 0);
    assert_eq!(id.slot_in_page, 0);
    assert!(!ptr.is_null());
    assert!(mgr.get_arena_state(id, 64));
}

#[test]
fn filling_a_page_removes_it_from_the_non_full_queue() {
    let mut mgr = ArenaManager::new(MAX, PAGE, ARENA);
    let arenas_per_page = PAGE / ARENA;
    let mut ids = Vec::new();
    for _ in 0..arenas_per_page {
        let (id, _) = mgr.allocate_arena(64);
        ids.push(id);
    }
    assert!(ids.iter().all(|id| id.page_index == 0));
    let (next_id, _) = mgr.allocate_arena(64);
    assert_eq!(next_id.page_index, 1, "a full page must force a new page");
}

#[test]
fn deallocating_all_arenas_in_a_page_frees_the_page() {
    let mut mgr = ArenaManager::new(MAX, PAGE, ARENA);
    let arenas_per_page = PAGE / ARENA;
    let mut ids = Vec::new();
    for _ in 0..arenas_per_page {
        let (id, _) = mgr.allocate_arena(128);
        ids.push(id);
    }
    for id in ids {
        mgr.deallocate_arena(id);
    }
    let (next_id, _) = mgr.allocate_arena(128);
    assert_eq!(next_id.page_index, 0, "freed page must be reused before a new one is taken");
}

#[test]
fn get_arena_state_rejects_mismatched_class_and_freed_arenas() {
    let mut mgr = ArenaManager::new(MAX, PAGE, ARENA);
    let (id, _) = mgr.allocate_arena(64);
    assert!(!mgr.get_arena_state(id, 128));
    mgr.deallocate_arena(id);
    assert!(!mgr.get_arena_state(id, 64));
}
