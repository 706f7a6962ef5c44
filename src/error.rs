//! Error types for buffer pool operations.

use thiserror::Error;

/// Result type alias using [`BufferPoolError`].
pub type Result<T> = std::result::Result<T, BufferPoolError>;

/// Error types for buffer pool operations.
///
/// Variants line up with the flat error-code taxonomy the buffer pool
/// protocol is specified against: there is no exception channel, only these
/// codes, surfaced to the caller without retry.
#[derive(Debug, Error)]
pub enum BufferPoolError {
    /// `init` could not open the backing page file.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// A non-init operation was attempted on a pool whose management state
    /// is absent (never initialized, or already shut down).
    #[error("buffer pool handle not initialized")]
    FileHandleNotInit,

    /// Null handle, negative page number, operating on a non-resident page,
    /// or unpinning a frame whose fix-count is already zero.
    #[error("reference to non-existing page: {0}")]
    ReadNonExistingPage(String),

    /// Allocation failure at init, or `pin` cannot proceed because every
    /// frame in the pool is pinned.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// I/O error from the page-file collaborator, with context identifying
    /// which operation failed.
    #[error("{0}")]
    Io(String),
}
