//! The hybrid stack + bitmap free list: a 2048-entry LIFO stack for the hot
//! path, backed by a 256-word (16,384-bit) bitmap plus a 256-bit
//! index-of-nonzero-words bitmap for overflow. Fixed-size by construction;
//! these sizes don't vary with `Config`.

use crate::bitset::Bitset;

const STACK_CAPACITY: usize = 2048;
const BITMAP_WORDS: usize = 256;
const BITMAP_BITS: usize = BITMAP_WORDS * 64;

/// A free slot's value is its own bitmap bit position once it overflows the
/// stack, so the largest slot index this free list can ever hold is bounded
/// by the bitmap width. `Config` validation rejects any `arena_size` whose
/// smallest-class capacity would exceed this.
pub const MAX_CAPACITY: usize = BITMAP_BITS;

pub struct ArenaFreeList {
    stack: [u16; STACK_CAPACITY],
    stack_size: usize,
    bitmap: Bitset,
    bitmap_size: usize,
    word_index: Bitset,
}

impl ArenaFreeList {
    /// Builds a free list populated with every slot index in `0..capacity`
    /// except slot 0, which is the reserved "first allocation, no free-list
    /// touch" fast path.
    pub fn new_full_minus_first(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        debug_assert!(capacity - 1 < BITMAP_BITS, "arena capacity exceeds the free list's addressable range");
        let mut list = Self {
            stack: [0; STACK_CAPACITY],
            stack_size: 0,
            bitmap: Bitset::new(BITMAP_BITS),
            bitmap_size: 0,
            word_index: Bitset::new(BITMAP_WORDS),
        };
        for slot in (1..capacity).rev() {
            list.push(slot as u16);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.stack_size + self.bitmap_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, slot: u16) {
        if self.stack_size < STACK_CAPACITY {
            self.stack[self.stack_size] = slot;
            self.stack_size += 1;
            return;
        }
        let bit = slot as usize;
        debug_assert!(!self.bitmap.get(bit), "double free of slot {slot}");
        self.bitmap.set(bit);
        self.word_index.set(bit / 64);
        self.bitmap_size += 1;
    }

    pub fn pop(&mut self) -> u16 {
        if self.stack_size == 0 {
            self.drain_one_word_into_stack();
        }
        debug_assert!(self.stack_size > 0, "pop from an empty arena free list");
        self.stack_size -= 1;
        self.stack[self.stack_size]
    }

    /// Finds the first nonzero bitmap word via the word-index bitmap, drains
    /// every set bit in it onto the stack using the `x & -x` lowest-set-bit
    /// idiom, then clears that word and its index bit.
    fn drain_one_word_into_stack(&mut self) {
        let Some(word_idx) = self.word_index.find_first_set() else {
            return;
        };
        let base_bit = word_idx * 64;
        let mut word = self.bitmap.word(word_idx);
        let mut drained = 0usize;
        while word != 0 {
            let lowest = word & word.wrapping_neg();
            let bit_in_word = lowest.trailing_zeros() as usize;
            debug_assert!(self.stack_size < STACK_CAPACITY);
            self.stack[self.stack_size] = (base_bit + bit_in_word) as u16;
            self.stack_size += 1;
            word &= word - 1;
            drained += 1;
        }
        *self.bitmap.word_mut(word_idx) = 0;
        self.word_index.clear(word_idx);
        self.bitmap_size -= drained;
    }
}
