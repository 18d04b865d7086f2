//! Arena manager: maps the page world to the arena world. Owns the page
//! manager and a flat per-page metadata table sized once at construction for
//! `max_size / page_size` entries. The table itself never grows or shrinks;
//! only the heaps nested inside it, and inside the page manager, do.

#[cfg(test)]
mod tests;

use crate::arena::Arena;
use crate::bitset::{Bitset, BitsetHeap};
use crate::page_manager::PageManager;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum PageState {
    Deallocated,
    Allocated,
    Full,
}

struct PageMetadata {
    state: PageState,
    /// Which arenas within this page are allocated. Always sized
    /// `arenas_per_page`, even while the page itself is deallocated.
    occupancy: Bitset,
    /// Lazily populated only while the page is allocated.
    arenas: Vec<Option<Arena>>,
}

impl PageMetadata {
    fn new(arenas_per_page: usize) -> Self {
        Self {
            state: PageState::Deallocated,
            occupancy: Bitset::new(arenas_per_page),
            arenas: Vec::new(),
        }
    }
}

pub struct ArenaManager {
    page_manager: PageManager,
    pages: Vec<PageMetadata>,
    arenas_per_page: usize,
    arena_size: usize,
    /// Pages that are allocated and have at least one free arena slot.
    /// Bounded by `max_pages`, so the plain bitmap heap suffices here.
    non_full_pages: BitsetHeap,
}

/// One arena, identified by the page it lives in and its slot within that
/// page. Ordered lexicographically by `(page_index, slot_in_page)`, which
/// matches address order since every page holds the same fixed number of
/// arenas. Sits directly in a size class's arena min-heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArenaId {
    pub page_index: u32,
    pub slot_in_page: u32,
}

impl ArenaManager {
    pub fn new(max_size: usize, page_size: usize, arena_size: usize) -> Self {
        let max_pages = (max_size / page_size) as usize;
        let arenas_per_page = page_size / arena_size;
        let page_manager = PageManager::new(max_size, page_size);
        let pages = (0..max_pages).map(|_| PageMetadata::new(arenas_per_page)).collect();
        Self {
            page_manager,
            pages,
            arenas_per_page,
            arena_size,
            non_full_pages: BitsetHeap::new(max_pages),
        }
    }

    pub fn arena_size(&self) -> usize {
        self.arena_size
    }

    /// Allocates one arena bound to `size_class`, constructing it fresh if
    /// necessary. Returns the new arena's identity and its slot-region base.
    pub fn allocate_arena(&mut self, size_class: usize) -> (ArenaId, *mut u8) {
        loop {
            if self.non_full_pages.empty() {
                let ptr = self.page_manager.allocate_page();
                let idx = self.page_manager.page_index(ptr);
                self.pages[idx as usize].state = PageState::Allocated;
                self.pages[idx as usize].arenas = (0..self.arenas_per_page).map(|_| None).collect();
                self.non_full_pages.push(idx as usize);
                log::debug!("arena_manager: allocated page {idx}");
            }

            let page_idx = self.non_full_pages.top() as u32;
            if self.pages[page_idx as usize].state == PageState::Deallocated {
                self.non_full_pages.pop();
                continue;
            }

            let page = &mut self.pages[page_idx as usize];
            let slot = page
                .occupancy
                .find_first_clear()
                .expect("non_full_pages queue held a page with no free arena slot");
            page.occupancy.set(slot);

            let page_addr = self.page_manager.page_of_index(page_idx);
            let arena_begin = unsafe { page_addr.add(slot * self.arena_size) };
            let capacity = Arena::slot_capacity(self.arena_size, size_class);
            // SAFETY: `arena_begin` is a freshly committed, exclusively owned
            // region of `arena_size` bytes within the page's reservation.
            let arena_ptr = core::ptr::NonNull::new(arena_begin).expect("page base is never null");
            page.arenas[slot] = Some(Arena::new(arena_ptr, size_class, capacity));

            if page.occupancy.full() {
                self.non_full_pages.pop();
                self.pages[page_idx as usize].state = PageState::Full;
                log::debug!("arena_manager: page {page_idx} is now full");
            }

            let id = ArenaId { page_index: page_idx, slot_in_page: slot as u32 };
            log::debug!("arena_manager: allocated arena {id:?} for size class {size_class}");
            return (id, arena_begin);
        }
    }

    pub fn arena_mut(&mut self, id: ArenaId) -> &mut Arena {
        self.pages[id.page_index as usize].arenas[id.slot_in_page as usize]
            .as_mut()
            .expect("arena id referred to a slot with no live arena")
    }

    pub fn arena(&self, id: ArenaId) -> &Arena {
        self.pages[id.page_index as usize].arenas[id.slot_in_page as usize]
            .as_ref()
            .expect("arena id referred to a slot with no live arena")
    }

    /// True iff the page is allocated, the in-page bit is set, and the
    /// arena's own `size_class` matches `class`. Used by the size-class
    /// allocator's refill loop to discard stale heap entries.
    pub fn get_arena_state(&self, id: ArenaId, class: usize) -> bool {
        let page = &self.pages[id.page_index as usize];
        if page.state == PageState::Deallocated {
            return false;
        }
        if !page.occupancy.get(id.slot_in_page as usize) {
            return false;
        }
        match &page.arenas[id.slot_in_page as usize] {
            Some(arena) => arena.size_class() == class,
            None => false,
        }
    }

    /// Recovers the owning arena's identity and `ArenaSize`-aligned base
    /// from any pointer previously handed out to a caller.
    pub fn locate(&self, ptr: *mut u8) -> (ArenaId, *mut u8) {
        let page_index = self.page_manager.page_index(ptr);
        let page_addr = self.page_manager.page_of(ptr);
        let offset = ptr as usize - page_addr as usize;
        let slot = offset / self.arena_size;
        let arena_begin = unsafe { page_addr.add(slot * self.arena_size) };
        (ArenaId { page_index, slot_in_page: slot as u32 }, arena_begin)
    }

    pub fn deallocate_arena(&mut self, id: ArenaId) {
        let page_idx = id.page_index as usize;
        let was_full = self.pages[page_idx].state == PageState::Full;
        if was_full {
            self.pages[page_idx].state = PageState::Allocated;
            self.non_full_pages.push(page_idx);
        }

        self.pages[page_idx].occupancy.clear(id.slot_in_page as usize);
        self.pages[page_idx].arenas[id.slot_in_page as usize] = None;

        if self.pages[page_idx].occupancy.empty() {
            self.pages[page_idx].state = PageState::Deallocated;
            self.pages[page_idx].arenas = Vec::new();
            let page_addr = self.page_manager.page_of_index(page_idx as u32);
            self.page_manager.deallocate_page(page_addr);
            log::debug!("arena_manager: page {page_idx} fully freed, returned to page manager");
        }
    }
}
