//! Configuration for the page cache.

use crate::buffer::replacer::ReplacementPolicy;

/// Size of a page in bytes (4KB).
///
/// Pages are aligned to 4096 bytes in memory, matching the OS page size.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages addressable with a u32 PageId.
///
/// `u32::MAX` itself is reserved for [`PageId::INVALID`](crate::PageId::INVALID).
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Number of frames used when no pool size is given.
pub const DEFAULT_POOL_SIZE: usize = 50;

/// Construction-time settings for a [`BufferPoolManager`](crate::BufferPoolManager).
///
/// The replacement policy is fixed for the lifetime of the pool.
///
/// # Example
/// ```
/// use pagecache::{BufferPoolConfig, ReplacementPolicy};
///
/// let config = BufferPoolConfig::default()
///     .with_pool_size(16)
///     .with_policy(ReplacementPolicy::Lru);
/// assert_eq!(config.pool_size, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool. Must be > 0.
    pub pool_size: usize,

    /// Which replacer picks eviction victims.
    pub policy: ReplacementPolicy,
}

impl BufferPoolConfig {
    pub fn new(pool_size: usize, policy: ReplacementPolicy) -> Self {
        Self { pool_size, policy }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_policy(mut self, policy: ReplacementPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            policy: ReplacementPolicy::Clock,
        }
    }
}
