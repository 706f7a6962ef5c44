//! A buffer pool for a paged, file-backed storage manager.
//!
//! Caches fixed-size pages from a single page-addressable file in memory,
//! mediating all page access for higher layers: callers pin a page by
//! number, mutate its bytes, mark it dirty, and unpin it. The pool owns
//! every decision about when to read pages from disk, which resident page
//! to evict under memory pressure, and when dirty pages get written back.
//!
//! ```ignore
//! use bufpool::{BufferPool, ReplacementStrategy};
//!
//! let pool = BufferPool::init("data.db", 8, ReplacementStrategy::Lru)?;
//! let mut handle = pool.pin(3)?;
//! handle.data_mut()?[0] = 42;
//! handle.mark_dirty()?;
//! drop(handle); // unpins
//! pool.force_flush_pool()?;
//! # Ok::<(), bufpool::BufferPoolError>(())
//! ```

pub mod error;
pub mod storage;

pub use error::{BufferPoolError, Result};
pub use storage::{
    BufferPool, Frame, FrameTable, PageHandle, PageNumber, ReplacementStrategy, NO_PAGE, PAGE_SIZE,
};
