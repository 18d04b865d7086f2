//! Error types. The only recoverable error is a bad [`crate::Config`];
//! everything past construction is fatal.

use core::fmt;

/// Returned by [`crate::Allocator::with_config`] when the requested layout
/// constants don't satisfy the power-of-two/divisibility constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    PageSizeNotPowerOfTwo(usize),
    ArenaSizeNotPowerOfTwo(usize),
    MaxSizeNotPowerOfTwo(usize),
    ArenaLargerThanPage { arena_size: usize, page_size: usize },
    PageNotDivisibleByArena { page_size: usize, arena_size: usize },
    MaxSizeNotDivisibleByPage { max_size: usize, page_size: usize },
    ArenaTooSmallForHeader { arena_size: usize, min_size: usize },
    ArenaCapacityExceedsFreeList { arena_size: usize, capacity: usize, max_capacity: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageSizeNotPowerOfTwo(v) => write!(f, "page_size {v} is not a power of two"),
            Self::ArenaSizeNotPowerOfTwo(v) => write!(f, "arena_size {v} is not a power of two"),
            Self::MaxSizeNotPowerOfTwo(v) => write!(f, "max_size {v} is not a power of two"),
            Self::ArenaLargerThanPage { arena_size, page_size } => {
                write!(f, "arena_size {arena_size} exceeds page_size {page_size}")
            }
            Self::PageNotDivisibleByArena { page_size, arena_size } => write!(
                f,
                "page_size {page_size} is not a multiple of arena_size {arena_size}"
            ),
            Self::MaxSizeNotDivisibleByPage { max_size, page_size } => write!(
                f,
                "max_size {max_size} is not a multiple of page_size {page_size}"
            ),
            Self::ArenaTooSmallForHeader { arena_size, min_size } => write!(
                f,
                "arena_size {arena_size} cannot hold the arena header plus one slot (need >= {min_size})"
            ),
            Self::ArenaCapacityExceedsFreeList { arena_size, capacity, max_capacity } => write!(
                f,
                "arena_size {arena_size} gives the smallest size class a capacity of {capacity} slots, exceeding the free list's addressable range of {max_capacity}"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
