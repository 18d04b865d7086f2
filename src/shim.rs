//! Optional `malloc`-family shim, gated behind the `malloc_shim` feature.
//! These are plain functions over an explicit `&mut Allocator` rather than
//! `#[no_mangle] extern "C"` symbols bound to a process-global instance;
//! wiring a singleton and hooking the libc symbol table is an embedder
//! decision, not something this crate does for you.

use core::ptr;
use core::ptr::NonNull;

use crate::Allocator;

/// Equivalent to `malloc(n)`. Never returns null: out-of-memory and
/// oversized requests abort the process instead.
pub fn malloc(allocator: &mut Allocator, n: usize) -> *mut u8 {
    allocator.allocate(n).as_ptr()
}

/// Equivalent to `calloc(count, size)`: allocates `count * size` bytes and
/// zero-fills them.
pub fn calloc(allocator: &mut Allocator, count: usize, size: usize) -> *mut u8 {
    let n = count.saturating_mul(size);
    let ptr = allocator.allocate(n);
    // SAFETY: `allocate` returns a region of at least `n` uninitialized bytes.
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, n) };
    ptr.as_ptr()
}

/// Equivalent to `realloc(ptr, n)`. `ptr` must be null or have come from a
/// prior `malloc`/`calloc`/`realloc` against this same `allocator`.
pub fn realloc(allocator: &mut Allocator, ptr: *mut u8, n: usize) -> *mut u8 {
    let Some(nn) = NonNull::new(ptr) else {
        return allocator.allocate(n).as_ptr();
    };
    allocator.reallocate(nn, n).as_ptr()
}

/// Equivalent to `free(ptr)`. `free(NULL)` is a no-op, matching the C
/// convention.
pub fn free(allocator: &mut Allocator, ptr: *mut u8) {
    let Some(nn) = NonNull::new(ptr) else {
        return;
    };
    allocator.deallocate(nn, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_then_free_round_trips() {
        let mut allocator = Allocator::new();
        let p = malloc(&mut allocator, 64);
        assert!(!p.is_null());
        free(&mut allocator, p);
    }

    #[test]
    fn free_of_null_is_a_no_op() {
        let mut allocator = Allocator::new();
        free(&mut allocator, ptr::null_mut());
    }

    #[test]
    fn calloc_zero_fills() {
        let mut allocator = Allocator::new();
        let p = calloc(&mut allocator, 4, 16);
        let bytes = unsafe { core::slice::from_raw_parts(p, 64) };
        assert!(bytes.iter().all(|&b| b == 0));
        free(&mut allocator, p);
    }

    #[test]
    fn realloc_of_null_behaves_like_malloc() {
        let mut allocator = Allocator::new();
        let p = realloc(&mut allocator, ptr::null_mut(), 32);
        assert!(!p.is_null());
        free(&mut allocator, p);
    }
}
