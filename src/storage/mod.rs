//! Storage layer - the block stores behind the buffer pool.
//!
//! - [`BlockStore`] - Fixed-size page I/O and page-number allocation
//! - [`DiskManager`] - File-backed block store
//! - [`MemoryBlockStore`] - In-memory block store with I/O counters
//! - [`page`] - The raw page buffer

mod block_store;
mod disk_manager;
mod memory_store;
pub mod page;

pub use block_store::BlockStore;
pub use disk_manager::DiskManager;
pub use memory_store::MemoryBlockStore;
