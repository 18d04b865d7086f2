//! The fixed 23-entry size-class table and the per-class allocator state
//! built on top of it.

#[cfg(test)]
mod tests;

mod allocator;
pub use allocator::SizeClassAllocator;

/// Byte counts for each size class, smallest first. Fixed at compile time;
/// not derived from any `Config` value.
pub const SIZE_CLASSES: [usize; 23] = [
    8, 12, 16, 24, 32, 48, 64, 96, 128, 224, 256, 384, 512, 768, 1024, 1536, 2048, 3072, 4096,
    6144, 8192, 12288, 16384,
];

pub const NUM_CLASSES: usize = SIZE_CLASSES.len();

pub const MAX_SIZE_CLASS: usize = SIZE_CLASSES[NUM_CLASSES - 1];

static_assertions::const_assert_eq!(SIZE_CLASSES[0], 8);
static_assertions::const_assert_eq!(MAX_SIZE_CLASS, 16384);

/// Rounds `n` up to the smallest entry of [`SIZE_CLASSES`] that is `>= max(n, 8)`.
///
/// Requests above [`MAX_SIZE_CLASS`] have no home in this table; there is no
/// large-object tier. Aborts rather than silently misrouting.
pub fn round_size(n: usize) -> usize {
    let n = n.max(1);
    for &class in SIZE_CLASSES.iter() {
        if n <= class {
            return class;
        }
    }
    log::error!("round_size: request of {n} bytes exceeds the largest size class ({MAX_SIZE_CLASS})");
    crate::os::abort();
}

/// Maps a size-class byte count (one of [`SIZE_CLASSES`]) to its table index.
pub fn class_index(class: usize) -> usize {
    SIZE_CLASSES
        .iter()
        .position(|&c| c == class)
        .unwrap_or_else(|| {
            log::error!("class_index: {class} is not a registered size class");
            crate::os::abort();
        })
}
