//! A segregated-fit, size-classed, arena-based allocator that gives memory
//! back to the operating system.
//!
//! The engine is a small stack of components, leaves first: a packed
//! [`bitset`], an [`elastic`] array/heap pair that commits and decommits OS
//! pages on demand, a [`page_manager`] that carves one huge virtual
//! reservation into pages, an [`arena_manager`] that carves pages into
//! fixed-size arenas, a per-[`arena`] hybrid free list, and a per-
//! [`sizeclass`] allocator that routes requests to the right arena. The
//! [`Allocator`] at the top ties all of this into `allocate`/`deallocate`/
//! `reallocate`.
//!
//! This engine is specified single-threaded per instance (one instance per
//! thread or CPU is an external sharding decision, not something this crate
//! imposes). Out-of-memory and invariant violations abort the process; the
//! only recoverable error is an invalid [`Config`].

pub mod arena;
pub mod arena_manager;
pub mod bitset;
pub mod elastic;
pub mod error;
pub mod os;
pub mod page_manager;
pub mod sizeclass;

mod allocator;
pub use allocator::{Allocator, Config};
pub use error::ConfigError;

#[cfg(feature = "malloc_shim")]
pub mod shim;

#[cfg(feature = "allocator_api")]
mod allocator_api_impl;
#[cfg(feature = "allocator_api")]
pub use allocator_api_impl::AllocatorHandle;
