//! Thin wrappers over the handful of OS virtual-memory calls the engine needs:
//! reserve a range with no access, flip a sub-range to read-write or back to
//! no-access, hint that physical backing can be dropped, and unmap on
//! shutdown. Every call here is a slow path; never the hot allocate/deallocate
//! path.

use core::ptr::NonNull;

/// A page-aligned virtual address range obtained from [`reserve`].
#[derive(Debug)]
pub struct Reservation {
    base: NonNull<u8>,
    len: usize,
}

// SAFETY: the reservation is just an address range; sharing it across
// threads is sound, the engine built on top of it is what restricts access.
unsafe impl Send for Reservation {}

impl Reservation {
    pub fn base(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        // SAFETY: `base`/`len` were returned by a single prior `reserve` call.
        unsafe { unmap(self.base.as_ptr(), self.len) }
    }
}

#[cfg(unix)]
mod imp {
    use super::*;

    pub fn page_size() -> usize {
        // SAFETY: sysconf with a valid, static name.
        let n = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        debug_assert!(n > 0);
        n as usize
    }

    pub fn reserve(len: usize) -> Reservation {
        // SAFETY: anonymous, non-fixed mapping; no preconditions beyond `len > 0`.
        let ptr = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                len,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            log::error!("mmap(len={len}) failed to reserve address space: errno={}", errno());
            abort();
        }
        Reservation {
            // SAFETY: mmap succeeded, so `ptr` is non-null.
            base: unsafe { NonNull::new_unchecked(ptr.cast()) },
            len,
        }
    }

    /// Flip `[ptr, ptr+len)` to read-write (commit).
    pub unsafe fn commit(ptr: *mut u8, len: usize) {
        // SAFETY: caller guarantees `ptr`/`len` lie within a live reservation.
        let rc = unsafe { libc::mprotect(ptr.cast(), len, libc::PROT_READ | libc::PROT_WRITE) };
        if rc != 0 {
            log::error!("mprotect(commit, ptr={ptr:p}, len={len}) failed: errno={}", errno());
            abort();
        }
    }

    /// Flip `[ptr, ptr+len)` back to no-access (decommit from the address
    /// space's perspective; physical backing is released separately below).
    pub unsafe fn decommit(ptr: *mut u8, len: usize) {
        // SAFETY: caller guarantees `ptr`/`len` lie within a live reservation.
        let rc = unsafe { libc::mprotect(ptr.cast(), len, libc::PROT_NONE) };
        if rc != 0 {
            log::error!("mprotect(decommit, ptr={ptr:p}, len={len}) failed: errno={}", errno());
            abort();
        }
    }

    /// Hint that the physical backing of `[ptr, ptr+len)` can be dropped
    /// without unmapping the range.
    pub unsafe fn dontneed(ptr: *mut u8, len: usize) {
        // SAFETY: caller guarantees `ptr`/`len` lie within a live reservation.
        let rc = unsafe { libc::madvise(ptr.cast(), len, libc::MADV_DONTNEED) };
        if rc != 0 {
            log::warn!("madvise(DONTNEED, ptr={ptr:p}, len={len}) failed: errno={}", errno());
        }
    }

    pub unsafe fn unmap(ptr: *mut u8, len: usize) {
        // SAFETY: caller guarantees this is the matching `reserve` range.
        unsafe {
            libc::munmap(ptr.cast(), len);
        }
    }

    fn errno() -> i32 {
        // SAFETY: reading the thread-local errno location.
        unsafe { *libc::__errno_location() }
    }

    pub fn abort() -> ! {
        // SAFETY: always safe, never returns.
        unsafe { libc::abort() }
    }
}

#[cfg(windows)]
mod imp {
    use super::*;
    use windows_sys::Win32::System::Memory;
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    pub fn page_size() -> usize {
        let mut info = core::mem::MaybeUninit::<SYSTEM_INFO>::uninit();
        // SAFETY: GetSystemInfo always fully initializes the struct.
        unsafe { GetSystemInfo(info.as_mut_ptr()) };
        // SAFETY: initialized above.
        let info = unsafe { info.assume_init() };
        info.dwPageSize as usize
    }

    pub fn reserve(len: usize) -> Reservation {
        // SAFETY: reserve-only mapping, no preconditions beyond `len > 0`.
        let ptr = unsafe {
            Memory::VirtualAlloc(
                core::ptr::null_mut(),
                len,
                Memory::MEM_RESERVE,
                Memory::PAGE_NOACCESS,
            )
        };
        let Some(base) = NonNull::new(ptr.cast::<u8>()) else {
            log::error!("VirtualAlloc(len={len}) failed to reserve address space");
            abort();
        };
        Reservation { base, len }
    }

    pub unsafe fn commit(ptr: *mut u8, len: usize) {
        // SAFETY: caller guarantees `ptr`/`len` lie within a live reservation.
        let rc = unsafe {
            Memory::VirtualAlloc(ptr.cast(), len, Memory::MEM_COMMIT, Memory::PAGE_READWRITE)
        };
        if rc.is_null() {
            log::error!("VirtualAlloc(commit, ptr={ptr:p}, len={len}) failed");
            abort();
        }
    }

    pub unsafe fn decommit(ptr: *mut u8, len: usize) {
        // SAFETY: caller guarantees `ptr`/`len` lie within a live reservation.
        let rc = unsafe { Memory::VirtualFree(ptr.cast(), len, Memory::MEM_DECOMMIT) };
        if rc == 0 {
            log::error!("VirtualFree(decommit, ptr={ptr:p}, len={len}) failed");
            abort();
        }
    }

    pub unsafe fn dontneed(ptr: *mut u8, len: usize) {
        // SAFETY: same range as `decommit`; Windows has no separate
        // "drop backing, keep mapping" primitive, so decommit plays double
        // duty (the range is re-committed before reuse regardless).
        unsafe { decommit(ptr, len) }
    }

    pub unsafe fn unmap(ptr: *mut u8, len: usize) {
        let _ = len;
        // SAFETY: caller guarantees this is the matching `reserve` range.
        unsafe {
            Memory::VirtualFree(ptr.cast(), 0, Memory::MEM_RELEASE);
        }
    }

    pub fn abort() -> ! {
        // SAFETY: always safe, never returns.
        unsafe { libc::abort() }
    }
}

pub use imp::{abort, commit, decommit, dontneed, page_size, reserve, unmap};
