//! Buffer pool management for page caching.
//!
//! Implements the pin/unpin/mark-dirty/force/flush protocol over a fixed
//! array of frames, backed by one page-addressable file. Four
//! collaborating pieces live under this module:
//!
//! - [`frame::FrameTable`] — the frame array, its contiguous backing
//!   buffer, and the stat mirror arrays.
//! - [`replacement::ReplacementEngine`] — FIFO / LRU / CLOCK / LRU-K victim
//!   selection and access bookkeeping.
//! - [`BufferPool`] — the public pin/unpin/mark-dirty/force/flush protocol,
//!   orchestrating lookup, eviction, I/O, and stat mirrors.
//! - [`guard::Guard`] — the coarse-grained concurrency guard wrapping the
//!   pool's mutable state, optional at build time via the `thread-safe`
//!   feature.
//!
//! # Example
//!
//! ```ignore
//! let pool = BufferPool::init(path, 8, ReplacementStrategy::Lru)?;
//! let mut handle = pool.pin(3)?;
//! handle.data_mut()?[0] = 42;
//! handle.mark_dirty()?;
//! // Page automatically unpinned when handle drops.
//! ```

mod frame;
mod guard;
pub mod replacement;

pub use frame::{Frame, FrameTable};
pub use replacement::ReplacementStrategy;

use guard::Guard;
use replacement::ReplacementEngine;

use crate::error::{BufferPoolError, Result};
use crate::storage::page_file::{PageFile, PageNumber, NO_PAGE, PAGE_SIZE};
use std::path::Path;

struct PoolState {
    page_file: PageFile,
    table: FrameTable,
    engine: ReplacementEngine,
    tick: u64,
    num_read_io: u64,
    num_write_io: u64,
}

impl PoolState {
    /// Writes frame `idx`'s bytes back unconditionally. Increments
    /// `num_write_io` and clears `dirty` only if the frame was dirty at
    /// call time — the asymmetry `forcePage` requires, and which holds
    /// trivially for the eviction/flush/shutdown call sites that only ever
    /// invoke this on frames already known to be dirty.
    fn write_back(&mut self, idx: usize) -> Result<()> {
        let page_num = self.table.frame(idx).page_num;
        self.page_file.ensure_capacity((page_num as u64) + 1)?;
        let was_dirty = self.table.frame(idx).dirty;
        self.page_file.write_block(page_num, self.table.data(idx))?;
        if was_dirty {
            self.num_write_io += 1;
            self.table.frame_mut(idx).dirty = false;
        }
        self.table.sync_stats(idx);
        Ok(())
    }
}

/// Buffer pool for managing in-memory page cache.
///
/// `state` is `None` after [`BufferPool::shutdown`], so that non-init
/// operations on a shut-down pool report [`BufferPoolError::FileHandleNotInit`]
/// rather than becoming unreachable through Rust's ownership rules, matching
/// the original contract where the pool object outlives shutdown.
pub struct BufferPool {
    state: Guard<Option<PoolState>>,
    num_frames: usize,
}

impl BufferPool {
    /// Opens `file_name`, allocates `num_frames` frames, and configures the
    /// given replacement strategy. `stratData` from the original interface
    /// is not modeled: the source ignores it unconditionally and no
    /// strategy in scope here takes configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::FileNotFound`] if the page file cannot be
    /// opened, or [`BufferPoolError::WriteFailed`] if `num_frames == 0`.
    pub fn init(
        file_name: impl AsRef<Path>,
        num_frames: usize,
        strategy: ReplacementStrategy,
    ) -> Result<Self> {
        if num_frames == 0 {
            return Err(BufferPoolError::WriteFailed(
                "buffer pool must have at least one frame".into(),
            ));
        }

        let page_file = PageFile::open(file_name)?;
        let state = PoolState {
            page_file,
            table: FrameTable::new(num_frames),
            engine: ReplacementEngine::new(strategy),
            tick: 0,
            num_read_io: 0,
            num_write_io: 0,
        };

        Ok(Self {
            state: Guard::new(Some(state)),
            num_frames,
        })
    }

    /// Number of frames in the pool.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Writes back every dirty resident frame, including pinned ones, then
    /// closes the page file and drops all owned state. Unlike
    /// `force_flush_pool`, pinned dirty frames are not skipped: shutdown is
    /// a terminal operation.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::FileHandleNotInit`] if already shut down,
    /// or an I/O error from the first failing write-back.
    pub fn shutdown(&self) -> Result<()> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            for idx in 0..state.table.len() {
                if state.table.frame(idx).page_num != NO_PAGE && state.table.frame(idx).dirty {
                    state.write_back(idx)?;
                }
            }
            *opt = None;
            Ok(())
        })
    }

    /// Writes back every frame that is resident, dirty, and unpinned.
    /// Pinned dirty frames are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::FileHandleNotInit`] if uninitialized, or
    /// an I/O error from the first failing write-back.
    pub fn force_flush_pool(&self) -> Result<()> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            for idx in 0..state.table.len() {
                let f = state.table.frame(idx);
                if f.page_num != NO_PAGE && f.dirty && f.fix_count == 0 {
                    state.write_back(idx)?;
                }
            }
            Ok(())
        })
    }

    /// Pins `page_num`, loading it from disk on a miss and evicting a
    /// victim if every frame is occupied.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::ReadNonExistingPage`] for a negative page
    /// number, [`BufferPoolError::WriteFailed`] if every frame is pinned,
    /// or an I/O error from the victim write-back or the page load.
    pub fn pin(&self, page_num: PageNumber) -> Result<PageHandle<'_>> {
        if page_num < 0 {
            return Err(BufferPoolError::ReadNonExistingPage(format!(
                "negative page number: {page_num}"
            )));
        }

        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;

            if let Some(idx) = state.table.find_by_page(page_num) {
                let f = state.table.frame_mut(idx);
                f.fix_count += 1;
                state.tick += 1;
                let tick = state.tick;
                state.engine.record_access(&mut state.table, idx, tick);
                let fix_count = state.table.frame(idx).fix_count;
                state.table.fix_counts[idx] = fix_count;
                return Ok(PageHandle {
                    pool: self,
                    page_num,
                });
            }

            let idx = match state.table.find_empty() {
                Some(idx) => idx,
                None => match state.engine.select_victim(&mut state.table) {
                    Some(idx) => {
                        if state.table.frame(idx).dirty {
                            state.write_back(idx)?;
                        }
                        state.table.reset(idx);
                        idx
                    }
                    None => {
                        return Err(BufferPoolError::WriteFailed(
                            "every frame is pinned".into(),
                        ))
                    }
                },
            };

            state.page_file.ensure_capacity((page_num as u64) + 1)?;
            let mut buf = [0u8; PAGE_SIZE];
            state.page_file.read_block(page_num, &mut buf)?;
            state.num_read_io += 1;
            state.table.data_mut(idx).copy_from_slice(&buf);

            state.tick += 1;
            let load_tick = state.tick;
            state.engine.init_on_load(&mut state.table, idx, load_tick);

            let f = state.table.frame_mut(idx);
            f.page_num = page_num;
            f.fix_count = 1;
            f.dirty = false;

            state.tick += 1;
            let access_tick = state.tick;
            state.engine.record_access(&mut state.table, idx, access_tick);
            state.table.sync_stats(idx);

            Ok(PageHandle {
                pool: self,
                page_num,
            })
        })
    }

    fn unpin(&self, page_num: PageNumber) -> Result<()> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            let idx = state.table.find_by_page(page_num).ok_or_else(|| {
                BufferPoolError::ReadNonExistingPage(format!("page {page_num} not resident"))
            })?;
            if state.table.frame(idx).fix_count == 0 {
                return Err(BufferPoolError::ReadNonExistingPage(format!(
                    "unpin underflow on page {page_num}"
                )));
            }
            state.table.frame_mut(idx).fix_count -= 1;
            let fix_count = state.table.frame(idx).fix_count;
            state.table.fix_counts[idx] = fix_count;
            Ok(())
        })
    }

    fn mark_dirty(&self, page_num: PageNumber) -> Result<()> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            let idx = state.table.find_by_page(page_num).ok_or_else(|| {
                BufferPoolError::ReadNonExistingPage(format!("page {page_num} not resident"))
            })?;
            state.table.frame_mut(idx).dirty = true;
            state.table.dirty_flags[idx] = true;
            Ok(())
        })
    }

    /// Writes the frame's bytes to disk unconditionally. Increments
    /// `num_write_io` and clears `dirty` only if the frame was dirty at
    /// call time; called on a clean frame still performs the write, just
    /// without touching the counter.
    fn force_page(&self, page_num: PageNumber) -> Result<()> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            let idx = state.table.find_by_page(page_num).ok_or_else(|| {
                BufferPoolError::ReadNonExistingPage(format!("page {page_num} not resident"))
            })?;
            state.write_back(idx)
        })
    }

    fn data_ptr(&self, page_num: PageNumber) -> Result<*const u8> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            let idx = state
                .table
                .find_by_page(page_num)
                .expect("a pinned page's frame cannot be evicted");
            Ok(state.table.data(idx).as_ptr())
        })
    }

    fn data_mut_ptr(&self, page_num: PageNumber) -> Result<*mut u8> {
        self.state.with(|opt| {
            let state = opt.as_mut().ok_or(BufferPoolError::FileHandleNotInit)?;
            let idx = state
                .table
                .find_by_page(page_num)
                .expect("a pinned page's frame cannot be evicted");
            Ok(state.table.data_mut(idx).as_mut_ptr())
        })
    }

    /// Snapshot of `frameContents`: page number resident in each frame, or
    /// `NO_PAGE`.
    #[must_use]
    pub fn frame_contents(&self) -> Vec<PageNumber> {
        self.state
            .with(|opt| opt.as_ref().map(|s| s.table.frame_contents.clone()))
            .unwrap_or_default()
    }

    /// Snapshot of `dirtyFlags`.
    #[must_use]
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.state
            .with(|opt| opt.as_ref().map(|s| s.table.dirty_flags.clone()))
            .unwrap_or_default()
    }

    /// Snapshot of `fixCounts`.
    #[must_use]
    pub fn fix_counts(&self) -> Vec<u32> {
        self.state
            .with(|opt| opt.as_ref().map(|s| s.table.fix_counts.clone()))
            .unwrap_or_default()
    }

    /// Number of successful `readBlock` calls since `init`.
    #[must_use]
    pub fn num_read_io(&self) -> u64 {
        self.state
            .with(|opt| opt.as_ref().map(|s| s.num_read_io))
            .unwrap_or(0)
    }

    /// Number of dirty write-backs since `init`.
    #[must_use]
    pub fn num_write_io(&self) -> u64 {
        self.state
            .with(|opt| opt.as_ref().map(|s| s.num_write_io))
            .unwrap_or(0)
    }
}

/// RAII handle to a pinned page.
///
/// `data`/`data_mut` alias the frame's backing bytes directly; the frame
/// cannot be evicted while this handle (or any other pin on the same page)
/// is outstanding, since eviction only ever considers `fix_count == 0`
/// frames. Dropping the handle unpins the page; `unpin` can also be called
/// explicitly to observe its `Result`.
pub struct PageHandle<'a> {
    pool: &'a BufferPool,
    page_num: PageNumber,
}

impl std::fmt::Debug for PageHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHandle")
            .field("page_num", &self.page_num)
            .finish()
    }
}

impl PageHandle<'_> {
    /// The pinned page's number.
    #[must_use]
    pub fn page_num(&self) -> PageNumber {
        self.page_num
    }

    /// A read-only view of the page's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::FileHandleNotInit`] if the pool was shut
    /// down while this handle was still outstanding — `shutdown` takes
    /// `&self` and does not wait for outstanding handles to drop, so this
    /// is a real, reachable error rather than a theoretical one.
    #[allow(unsafe_code)]
    pub fn data(&self) -> Result<&[u8]> {
        let ptr = self.pool.data_ptr(self.page_num)?;
        // SAFETY: fix_count > 0 for this page for the handle's lifetime,
        // so its frame cannot be evicted or relocated for as long as this
        // reference is live.
        Ok(unsafe { std::slice::from_raw_parts(ptr, PAGE_SIZE) })
    }

    /// A mutable view of the page's bytes.
    ///
    /// Does not itself mark the page dirty: call [`PageHandle::mark_dirty`]
    /// explicitly, matching the protocol's separate `markDirty` operation.
    ///
    /// # Errors
    ///
    /// See [`PageHandle::data`].
    #[allow(unsafe_code)]
    pub fn data_mut(&mut self) -> Result<&mut [u8]> {
        let ptr = self.pool.data_mut_ptr(self.page_num)?;
        // SAFETY: see `data`.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr, PAGE_SIZE) })
    }

    /// Marks the page dirty.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::ReadNonExistingPage`] if the page is no
    /// longer resident (cannot happen while this handle is pinned).
    pub fn mark_dirty(&self) -> Result<()> {
        self.pool.mark_dirty(self.page_num)
    }

    /// Writes the page back unconditionally, regardless of its dirty bit.
    ///
    /// # Errors
    ///
    /// See [`BufferPool::force_page`].
    pub fn force(&self) -> Result<()> {
        self.pool.force_page(self.page_num)
    }

    /// Unpins the page, returning the underlying error rather than
    /// swallowing it as `Drop` must.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::ReadNonExistingPage`] on unpin underflow
    /// (cannot happen through ordinary use of this type).
    pub fn unpin(self) -> Result<()> {
        let result = self.pool.unpin(self.page_num);
        std::mem::forget(self);
        result
    }
}

impl Drop for PageHandle<'_> {
    fn drop(&mut self) {
        let _ = self.pool.unpin(self.page_num);
    }
}
