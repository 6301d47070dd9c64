//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between access methods and the
//! block store. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The page cache itself
//! - [`Frame`] - A slot holding a page + metadata
//! - [`PageHandle`] / [`UnpinMode`] - The explicit pin/unpin API
//! - [`PageReadGuard`] / [`PageWriteGuard`] - RAII wrappers over it
//! - [`BufferPoolStats`] - Hit/miss and I/O counters
//! - [`replacer`] - Eviction policies

mod buffer_pool_manager;
mod frame;
mod page_guard;
pub mod replacer;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::Frame;
pub use page_guard::{PageHandle, PageReadGuard, PageWriteGuard, UnpinMode};
pub use stats::{BufferPoolStats, StatsSnapshot};
