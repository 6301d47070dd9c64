//! Error types for the page cache.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the buffer pool and its block stores.
///
/// Every variant is reported synchronously to the immediate caller.
/// Nothing is retried internally: an exhausted pool or a pin-count
/// mismatch cannot succeed without the caller changing something.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the block store.
    ///
    /// Wraps `std::io::Error` from file read/write operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page ID is the INVALID sentinel, or the block store does not
    /// know it (never allocated, or already deallocated).
    #[error("Invalid page ID: {0}")]
    InvalidPageId(u32),

    /// Pin count was not what the operation requires.
    ///
    /// Raised by unpinning a page that isn't pinned, freeing a page whose
    /// pin count isn't exactly 1, or touching bytes through a stale handle.
    #[error("Pin count violation on page {page_id}: pin count is {pin_count}")]
    PinCountViolation { page_id: u32, pin_count: u32 },

    /// No free frame exists and the replacer found no victim.
    ///
    /// This happens when all frames are pinned.
    #[error("No free frames available in buffer pool")]
    PoolExhausted,
}
