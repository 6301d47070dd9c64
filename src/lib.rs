//! pagecache - a fixed-size buffer pool over a block store.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │     Access methods: hash index, sort, join, B-tree (callers)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓ pin / unpin / new / free / flush
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Buffer Pool (buffer/)                          │
//! │   BufferPoolManager + Frame + PageHandle + Statistics           │
//! │   ┌─────────────────────────────────────────────────────────┐   │
//! │   │  Replacement policy: Random | LRU | MRU | Clock         │   │
//! │   │            (fixed at construction)                      │   │
//! │   └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓ allocate / deallocate / read / write
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Storage (storage/)                             │
//! │     BlockStore trait: DiskManager | MemoryBlockStore            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer pool management and eviction policies
//! - [`storage`] - Block stores and the page buffer
//!
//! # Quick Start
//! ```no_run
//! use pagecache::storage::DiskManager;
//! use pagecache::{BufferPoolManager, ReplacementPolicy, UnpinMode};
//!
//! let dm = DiskManager::create("my_database.db").unwrap();
//! let bpm = BufferPoolManager::new(64, ReplacementPolicy::Clock, dm);
//!
//! let handle = bpm.new_page().unwrap();
//! bpm.page_mut(&handle).unwrap().as_mut_slice()[..5].copy_from_slice(b"hello");
//! bpm.unpin_page(&handle, UnpinMode::Dirty).unwrap();
//! bpm.flush_all_pages().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FrameId, PageId, Result};

pub use buffer::replacer::ReplacementPolicy;
pub use buffer::{
    BufferPoolManager, BufferPoolStats, Frame, PageHandle, PageReadGuard, PageWriteGuard,
    StatsSnapshot, UnpinMode,
};
pub use storage::page::Page;
pub use storage::{BlockStore, DiskManager, MemoryBlockStore};
