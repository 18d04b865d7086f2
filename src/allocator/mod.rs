//! `Config` and `Allocator`, the front-end dispatcher: routes a byte count to
//! a size class and to that class's [`SizeClassAllocator`]; recovers the
//! owning arena from a pointer on free via masking.


use core::ptr::NonNull;

use crate::arena_manager::ArenaManager;
use crate::error::ConfigError;
use crate::sizeclass::{class_index, round_size, SizeClassAllocator, NUM_CLASSES, SIZE_CLASSES};

const DEFAULT_PAGE_SIZE: usize = 2 * 1024 * 1024;
const DEFAULT_ARENA_SIZE: usize = 128 * 1024;
const DEFAULT_MAX_SIZE: usize = 1usize << 40;

/// Runtime layout constants, validated once at [`Allocator::with_config`]
/// construction time rather than encoded as compile-time constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    page_size: usize,
    arena_size: usize,
    max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            arena_size: DEFAULT_ARENA_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl Config {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_arena_size(mut self, arena_size: usize) -> Self {
        self.arena_size = arena_size;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn arena_size(&self) -> usize {
        self.arena_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_power_of_two(self.page_size) {
            return Err(ConfigError::PageSizeNotPowerOfTwo(self.page_size));
        }
        if !is_power_of_two(self.arena_size) {
            return Err(ConfigError::ArenaSizeNotPowerOfTwo(self.arena_size));
        }
        if !is_power_of_two(self.max_size) {
            return Err(ConfigError::MaxSizeNotPowerOfTwo(self.max_size));
        }
        if self.arena_size > self.page_size {
            return Err(ConfigError::ArenaLargerThanPage {
                arena_size: self.arena_size,
                page_size: self.page_size,
            });
        }
        if self.page_size % self.arena_size != 0 {
            return Err(ConfigError::PageNotDivisibleByArena {
                page_size: self.page_size,
                arena_size: self.arena_size,
            });
        }
        if self.max_size % self.page_size != 0 {
            return Err(ConfigError::MaxSizeNotDivisibleByPage {
                max_size: self.max_size,
                page_size: self.page_size,
            });
        }
        let smallest_class = SIZE_CLASSES[0];
        if self.arena_size < smallest_class {
            return Err(ConfigError::ArenaTooSmallForHeader {
                arena_size: self.arena_size,
                min_size: smallest_class,
            });
        }
        let max_capacity = self.arena_size / smallest_class;
        if max_capacity > crate::arena::MAX_CAPACITY {
            return Err(ConfigError::ArenaCapacityExceedsFreeList {
                arena_size: self.arena_size,
                capacity: max_capacity,
                max_capacity: crate::arena::MAX_CAPACITY,
            });
        }
        Ok(())
    }
}

fn is_power_of_two(x: usize) -> bool {
    x != 0 && (x & (x - 1)) == 0
}

pub struct Allocator {
    config: Config,
    arena_manager: ArenaManager,
    size_classes: Vec<SizeClassAllocator>,
}

impl Allocator {
    /// Builds an allocator from [`Config::default`]. The default values are
    /// always internally consistent, so this never fails.
    pub fn new() -> Self {
        Self::with_config(Config::default()).expect("Config::default() must always validate")
    }

    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let arena_manager = ArenaManager::new(config.max_size, config.page_size, config.arena_size);
        let max_arenas = config.max_size / config.arena_size;
        let size_classes = SIZE_CLASSES
            .iter()
            .map(|&class| SizeClassAllocator::new(class, max_arenas, config.page_size))
            .collect();
        Ok(Self { config, arena_manager, size_classes })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a pointer to an uninitialized region of at least `n` bytes,
    /// aligned to at least 8 bytes. Aborts if `n` exceeds the largest size
    /// class; there is no large-object tier.
    pub fn allocate(&mut self, n: usize) -> NonNull<u8> {
        let class = round_size(n);
        let idx = class_index(class);
        log::trace!("allocate({n}) -> class {class}");
        self.size_classes[idx].allocate(&mut self.arena_manager)
    }

    /// Releases a pointer previously returned by `allocate`. `n_hint` is
    /// advisory and ignored; the owning arena's metadata is authoritative.
    pub fn deallocate(&mut self, ptr: NonNull<u8>, _n_hint: usize) {
        let (id, _arena_begin) = self.arena_manager.locate(ptr.as_ptr());
        let class = self.arena_manager.arena(id).size_class();
        let idx = class_index(class);
        log::trace!("deallocate({ptr:p}) -> class {class}");
        self.size_classes[idx].deallocate(&mut self.arena_manager, id, ptr);
    }

    /// As `allocate`, preserving the first `min(old, new)` bytes. Returns the
    /// same pointer unchanged if `n` rounds to the same class.
    pub fn reallocate(&mut self, ptr: NonNull<u8>, n: usize) -> NonNull<u8> {
        let (id, _) = self.arena_manager.locate(ptr.as_ptr());
        let old_class = self.arena_manager.arena(id).size_class();
        let new_class = round_size(n);
        if old_class == new_class {
            return ptr;
        }
        let new_ptr = self.allocate(n);
        let copy_len = old_class.min(new_class);
        // SAFETY: `ptr` is valid for `old_class` bytes, `new_ptr` for
        // `new_class` bytes, and the two regions never overlap.
        unsafe {
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        self.deallocate(ptr, old_class);
        new_ptr
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::const_assert_eq!(NUM_CLASSES, 23);
