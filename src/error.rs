//! Error types for vireo storage operations.

use thiserror::Error;

/// Result type alias using [`VireoError`].
pub type Result<T> = std::result::Result<T, VireoError>;

/// Error types for vireo storage operations.
///
/// The buffer pool reports its documented non-error outcomes (pool
/// exhausted, page not resident, over-unpin, delete while pinned) through
/// `Option`/`bool` return values; only disk I/O and construction failures
/// surface as [`VireoError`].
#[derive(Debug, Error)]
pub enum VireoError {
    /// Disk I/O or database-file management error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Buffer pool configuration or construction error.
    #[error("Buffer pool error: {0}")]
    BufferPool(String),
}
