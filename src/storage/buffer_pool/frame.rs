//! Frame table: the fixed array of frames holding resident page bytes plus
//! per-frame bookkeeping, and the stat mirror arrays exposed to callers.

use crate::storage::page_file::{PageNumber, NO_PAGE, PAGE_SIZE};

/// One slot in the buffer pool.
///
/// `hist`/`k_count`/`k_pos` are reserved LRU-K history: updated on every
/// access but never consulted, since `LruK` degenerates to plain LRU.
#[derive(Debug, Clone)]
pub struct Frame {
    pub page_num: PageNumber,
    pub fix_count: u32,
    pub dirty: bool,
    pub load_tick: u64,
    pub access_tick: u64,
    pub ref_bit: bool,
    pub hist: [u64; 2],
    pub k_count: u8,
    pub k_pos: u8,
}

impl Frame {
    fn empty() -> Self {
        Self {
            page_num: NO_PAGE,
            fix_count: 0,
            dirty: false,
            load_tick: 0,
            access_tick: 0,
            ref_bit: false,
            hist: [0; 2],
            k_count: 0,
            k_pos: 0,
        }
    }

    /// A frame is a replacement candidate iff it holds a page and nobody
    /// has it pinned.
    #[must_use]
    pub fn is_evictable(&self) -> bool {
        self.page_num != NO_PAGE && self.fix_count == 0
    }
}

/// The frame array, its contiguous backing buffer, and the stat mirrors.
///
/// All frame payload bytes live in one `Vec<u8>` allocation of
/// `n * PAGE_SIZE`; frame `i` owns the slice `[i*PAGE_SIZE, (i+1)*PAGE_SIZE)`.
pub struct FrameTable {
    frames: Vec<Frame>,
    backing: Vec<u8>,
    pub frame_contents: Vec<PageNumber>,
    pub dirty_flags: Vec<bool>,
    pub fix_counts: Vec<u32>,
}

impl FrameTable {
    #[must_use]
    pub fn new(num_frames: usize) -> Self {
        Self {
            frames: vec![Frame::empty(); num_frames],
            backing: vec![0u8; num_frames * PAGE_SIZE],
            frame_contents: vec![NO_PAGE; num_frames],
            dirty_flags: vec![false; num_frames],
            fix_counts: vec![0; num_frames],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, idx: usize) -> &Frame {
        &self.frames[idx]
    }

    pub fn frame_mut(&mut self, idx: usize) -> &mut Frame {
        &mut self.frames[idx]
    }

    /// Linear scan for the frame currently holding `page_num`.
    #[must_use]
    pub fn find_by_page(&self, page_num: PageNumber) -> Option<usize> {
        self.frames.iter().position(|f| f.page_num == page_num)
    }

    /// Linear scan for any frame with no resident page.
    #[must_use]
    pub fn find_empty(&self) -> Option<usize> {
        self.frames.iter().position(|f| f.page_num == NO_PAGE)
    }

    /// Copies `page_num`, `dirty`, `fix_count` from frame `idx` into the
    /// stat mirror arrays. Called at every point the public API must leave
    /// the mirrors byte-accurate.
    pub fn sync_stats(&mut self, idx: usize) {
        let f = &self.frames[idx];
        self.frame_contents[idx] = f.page_num;
        self.dirty_flags[idx] = f.dirty;
        self.fix_counts[idx] = f.fix_count;
    }

    pub fn sync_all_stats(&mut self) {
        for idx in 0..self.frames.len() {
            self.sync_stats(idx);
        }
    }

    #[must_use]
    pub fn data(&self, idx: usize) -> &[u8] {
        let start = idx * PAGE_SIZE;
        &self.backing[start..start + PAGE_SIZE]
    }

    pub fn data_mut(&mut self, idx: usize) -> &mut [u8] {
        let start = idx * PAGE_SIZE;
        &mut self.backing[start..start + PAGE_SIZE]
    }

    /// Resets a frame to the empty state after its contents have been
    /// evicted or written back. Does not touch the backing bytes: the
    /// caller overwrites them (on load) before the frame is considered
    /// resident again.
    pub fn reset(&mut self, idx: usize) {
        self.frames[idx] = Frame::empty();
        self.sync_stats(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_all_empty() {
        let t = FrameTable::new(4);
        assert_eq!(t.len(), 4);
        assert!(t.frame_contents.iter().all(|&p| p == NO_PAGE));
        assert!(t.dirty_flags.iter().all(|&d| !d));
        assert!(t.fix_counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn find_by_page_and_find_empty() {
        let mut t = FrameTable::new(2);
        assert_eq!(t.find_by_page(5), None);
        assert_eq!(t.find_empty(), Some(0));

        t.frame_mut(0).page_num = 5;
        assert_eq!(t.find_by_page(5), Some(0));
        assert_eq!(t.find_empty(), Some(1));
    }

    #[test]
    fn sync_stats_mirrors_frame_fields() {
        let mut t = FrameTable::new(1);
        t.frame_mut(0).page_num = 3;
        t.frame_mut(0).dirty = true;
        t.frame_mut(0).fix_count = 2;
        t.sync_stats(0);

        assert_eq!(t.frame_contents[0], 3);
        assert!(t.dirty_flags[0]);
        assert_eq!(t.fix_counts[0], 2);
    }

    #[test]
    fn data_slices_are_disjoint_per_frame() {
        let mut t = FrameTable::new(2);
        t.data_mut(0)[0] = 1;
        t.data_mut(1)[0] = 2;
        assert_eq!(t.data(0)[0], 1);
        assert_eq!(t.data(1)[0], 2);
    }

    #[test]
    fn reset_clears_frame_and_mirrors() {
        let mut t = FrameTable::new(1);
        t.frame_mut(0).page_num = 7;
        t.frame_mut(0).dirty = true;
        t.frame_mut(0).fix_count = 1;
        t.reset(0);

        assert_eq!(t.frame(0).page_num, NO_PAGE);
        assert_eq!(t.frame_contents[0], NO_PAGE);
        assert!(!t.dirty_flags[0]);
        assert_eq!(t.fix_counts[0], 0);
    }
}
