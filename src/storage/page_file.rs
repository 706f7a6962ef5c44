//! The page-file storage collaborator.
//!
//! This is the buffer pool's only disk-facing dependency: a single
//! page-addressable file supporting open/close, capacity extension, and
//! fixed-size block reads and writes. Everything above this layer (frame
//! accounting, replacement, the pin/unpin protocol) is blind to how pages
//! are actually stored.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{BufferPoolError, Result};

/// Page size in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Identifies a page within a page file.
///
/// A non-negative integer; the reserved sentinel [`NO_PAGE`] denotes "no
/// page resident" in frame bookkeeping.
pub type PageNumber = i64;

/// Sentinel value meaning "no page resident in this frame".
pub const NO_PAGE: PageNumber = -1;

/// A page-addressable file backing the buffer pool.
///
/// Exposes the capacity extension and block I/O vocabulary the buffer pool
/// protocol is specified against (`ensureCapacity`, `readBlock`,
/// `writeBlock`).
pub struct PageFile {
    path: PathBuf,
    file: File,
    num_pages: u64,
}

impl PageFile {
    /// Opens or creates the named page file.
    ///
    /// # Errors
    ///
    /// Returns [`BufferPoolError::FileNotFound`] if the file cannot be
    /// opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| BufferPoolError::FileNotFound(format!("{}: {e}", path.display())))?;

        let file_len = file
            .metadata()
            .map_err(|e| BufferPoolError::Io(format!("failed to read file metadata: {e}")))?
            .len();
        let num_pages = file_len.div_ceil(PAGE_SIZE as u64);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            num_pages,
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of pages currently addressable in the file.
    #[must_use]
    pub fn num_pages(&self) -> u64 {
        self.num_pages
    }

    /// Extends the file so that at least `num_pages` pages are addressable,
    /// zero-filling any newly created pages.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be extended.
    pub fn ensure_capacity(&mut self, num_pages: u64) -> Result<()> {
        if num_pages <= self.num_pages {
            return Ok(());
        }
        self.file
            .set_len(num_pages * PAGE_SIZE as u64)
            .map_err(|e| {
                BufferPoolError::Io(format!("failed to extend file to {num_pages} pages: {e}"))
            })?;
        self.num_pages = num_pages;
        Ok(())
    }

    /// Reads `PAGE_SIZE` bytes of `page_num` into `dest`.
    ///
    /// Capacity must already have been ensured for `page_num` by the
    /// caller; this never implicitly extends the file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the read fails.
    pub fn read_block(&mut self, page_num: PageNumber, dest: &mut [u8]) -> Result<()> {
        debug_assert_eq!(dest.len(), PAGE_SIZE);
        self.file
            .seek(SeekFrom::Start(offset_of(page_num)))
            .map_err(|e| BufferPoolError::Io(format!("failed to seek to page {page_num}: {e}")))?;
        self.file
            .read_exact(dest)
            .map_err(|e| BufferPoolError::Io(format!("failed to read page {page_num}: {e}")))?;
        Ok(())
    }

    /// Writes `PAGE_SIZE` bytes from `src` to `page_num`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    pub fn write_block(&mut self, page_num: PageNumber, src: &[u8]) -> Result<()> {
        debug_assert_eq!(src.len(), PAGE_SIZE);
        self.file
            .seek(SeekFrom::Start(offset_of(page_num)))
            .map_err(|e| BufferPoolError::Io(format!("failed to seek to page {page_num}: {e}")))?;
        self.file
            .write_all(src)
            .map_err(|e| BufferPoolError::Io(format!("failed to write page {page_num}: {e}")))?;
        Ok(())
    }

    /// Closes the page file, flushing any outstanding OS-level buffers.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the final sync fails.
    pub fn close(mut self) -> Result<()> {
        self.file
            .sync_all()
            .map_err(|e| BufferPoolError::Io(format!("failed to sync file to disk: {e}")))?;
        Ok(())
    }
}

const fn offset_of(page_num: PageNumber) -> u64 {
    (page_num as u64) * (PAGE_SIZE as u64)
}
