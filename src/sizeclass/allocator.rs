//! Per-size-class allocator state: a min-heap of non-full arena ids for this
//! class plus a cached "current arena" id that always mirrors the heap's
//! top. Allocation is a two-instruction check against the cached arena in
//! the common case; refill only runs when that arena just filled up.

use crate::arena_manager::{ArenaId, ArenaManager};
use crate::elastic::ElasticMinHeap;
use core::ptr::NonNull;

pub struct SizeClassAllocator {
    class: usize,
    heap: ElasticMinHeap<ArenaId>,
    cached: Option<ArenaId>,
    consecutive_stale_skips: u32,
}

impl SizeClassAllocator {
    pub fn new(class: usize, heap_capacity: usize, page_size: usize) -> Self {
        Self {
            class,
            heap: ElasticMinHeap::new(heap_capacity, page_size),
            cached: None,
            consecutive_stale_skips: 0,
        }
    }

    pub fn allocate(&mut self, arenas: &mut ArenaManager) -> NonNull<u8> {
        loop {
            if let Some(id) = self.cached {
                let arena = arenas.arena_mut(id);
                if arena.size() < arena.capacity() {
                    return arena.allocate();
                }
                // `arena` just became full: this class no longer claims it.
                self.heap.pop();
            }
            self.refill(arenas);
        }
    }

    /// Walks the heap from the top, discarding entries the arena manager no
    /// longer recognizes as a live, non-full arena of this class, until a
    /// usable one is found or the heap runs dry.
    fn refill(&mut self, arenas: &mut ArenaManager) {
        while !self.heap.empty() {
            let candidate = self.heap.top();
            if arenas.get_arena_state(candidate, self.class) && arenas.arena(candidate).size() < arenas.arena(candidate).capacity() {
                self.cached = Some(candidate);
                self.consecutive_stale_skips = 0;
                return;
            }
            self.heap.pop();
            self.consecutive_stale_skips += 1;
            if self.consecutive_stale_skips > 4 {
                log::warn!("size class {}: refill skipped {} stale heap entries in a row", self.class, self.consecutive_stale_skips);
            }
        }
        let (id, _) = arenas.allocate_arena(self.class);
        self.heap.push(id);
        self.cached = Some(id);
        self.consecutive_stale_skips = 0;
        log::debug!("size class {}: created new arena {id:?}", self.class);
    }

    /// `ptr` must have come from a prior `allocate()` on this class's arena.
    /// `arena_begin` is the `ArenaSize`-aligned base the front-end dispatcher
    /// recovered by masking `ptr`.
    pub fn deallocate(&mut self, arenas: &mut ArenaManager, id: ArenaId, ptr: NonNull<u8>) {
        let was_full;
        {
            let arena = arenas.arena_mut(id);
            was_full = arena.is_full();
            arena.deallocate(ptr);
        }

        let is_cached = self.cached == Some(id);
        let is_empty = arenas.arena(id).is_empty();

        if is_empty && !is_cached {
            // Leave `id` in the heap; refill skips it via `get_arena_state`.
            arenas.deallocate_arena(id);
            log::debug!("size class {}: arena {id:?} emptied and returned", self.class);
            return;
        }

        if was_full {
            self.heap.push(id);
            self.refill(arenas);
        }
    }
}
