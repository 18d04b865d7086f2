//! `allocator-api2`-compatible [`Allocator`](allocator_api2::alloc::Allocator)
//! implementation, gated behind the `allocator_api` feature. Mirrors the
//! handle-tied-to-an-arena pattern this codebase's collaborating GC already
//! uses for its own `Allocator` impl, but backs it with this crate's engine
//! instead of a bump arena.

use core::cell::RefCell;
use core::ptr::NonNull;

use allocator_api2::alloc::{AllocError, Allocator as Api2Allocator, Layout};

use crate::Allocator;

/// `Allocator`-compatible handle over a `crate::Allocator` instance, so
/// `allocator-api2`-aware collections (`Vec`, `Box`, ...) can be backed
/// directly by this engine without going through the `malloc_shim`.
///
/// Single-threaded only, like the engine underneath it: the `RefCell` panics
/// on reentrant/aliased access rather than racing.
pub struct AllocatorHandle {
    inner: RefCell<Allocator>,
}

impl AllocatorHandle {
    pub fn new(allocator: Allocator) -> Self {
        Self { inner: RefCell::new(allocator) }
    }

    pub fn config(&self) -> crate::Config {
        *self.inner.borrow().config()
    }
}

impl Default for AllocatorHandle {
    fn default() -> Self {
        Self::new(Allocator::new())
    }
}

// SAFETY: `Api2Allocator` requires returned pointers to stay valid until
// explicitly freed and to honor the requested layout; `Allocator::allocate`
// guarantees both (every size class's slots are at least 8-byte aligned).
unsafe impl Api2Allocator for AllocatorHandle {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            // SAFETY: `layout.align()` is always nonzero for a valid `Layout`.
            let dangling = unsafe { NonNull::new_unchecked(layout.align() as *mut u8) };
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        if layout.align() > 8 {
            // The engine's slots are only ever 8-byte aligned.
            return Err(AllocError);
        }
        let ptr = self.inner.borrow_mut().allocate(layout.size());
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        let block = self.allocate(layout)?;
        if layout.size() > 0 {
            // SAFETY: `allocate` succeeded and `block` owns `layout.size()` bytes.
            unsafe { core::ptr::write_bytes(block.as_ptr() as *mut u8, 0, layout.size()) };
        }
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        self.inner.borrow_mut().deallocate(ptr, layout.size());
    }

    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new_layout.size() >= old_layout.size());
        if old_layout.size() == 0 {
            return self.allocate(new_layout);
        }
        let new_ptr = self.inner.borrow_mut().reallocate(ptr, new_layout.size());
        Ok(NonNull::slice_from_raw_parts(new_ptr, new_layout.size()))
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<[u8]>, AllocError> {
        debug_assert!(new_layout.size() <= old_layout.size());
        if new_layout.size() == 0 {
            // SAFETY: `ptr` was allocated by this handle with `old_layout`.
            unsafe { self.deallocate(ptr, old_layout) };
            let dangling = unsafe { NonNull::new_unchecked(new_layout.align() as *mut u8) };
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        let new_ptr = self.inner.borrow_mut().reallocate(ptr, new_layout.size());
        Ok(NonNull::slice_from_raw_parts(new_ptr, new_layout.size()))
    }
}
