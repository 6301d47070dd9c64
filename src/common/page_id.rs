//! Page identifier type.

use std::fmt;

/// Identifies a fixed-size block in the block store.
///
/// A thin `u32` wrapper: up to 2^32 - 1 pages of 4KB each. `u32::MAX` is
/// reserved as the [`INVALID`](PageId::INVALID) sentinel, used for empty
/// frames and never handed out by a block store.
///
/// # Example
/// ```
/// use pagecache::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert!(!PageId::INVALID.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// "No page" sentinel.
    pub const INVALID: PageId = PageId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page in a file of contiguous pages.
    #[inline]
    pub fn file_offset(&self, page_size: usize) -> u64 {
        u64::from(self.0) * page_size as u64
    }
}

impl From<u32> for PageId {
    fn from(id: u32) -> Self {
        PageId(id)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Page({})", self.0)
        } else {
            write!(f, "Page(INVALID)")
        }
    }
}
