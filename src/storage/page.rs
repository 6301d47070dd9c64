//! Page - the raw 4KB unit of I/O.
//!
//! A [`Page`] carries no layout of its own. Callers (indexes, sort runs,
//! heap files) decide what the bytes mean; the cache only moves them
//! between frames and the block store.

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB, 4KB-aligned).
///
/// # Memory Layout
/// - Size: 4096 bytes
/// - Alignment: 4096 bytes, so a frame's buffer can be handed to direct I/O
///
/// `Page` is not `Clone` outside tests: copying 4KB should be explicit,
/// see [`Page::copy_from`].
///
/// # Example
/// ```
/// use pagecache::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// assert!(!page.is_zeroed());
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite this page with the contents of `other`.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// True if every byte is zero.
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("size", &PAGE_SIZE)
            .field("zeroed", &self.is_zeroed())
            .finish()
    }
}

#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut page = Page::new();
        page.copy_from(self);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_and_alignment() {
        assert_eq!(std::mem::size_of::<Page>(), PAGE_SIZE);
        assert_eq!(std::mem::align_of::<Page>(), 4096);
    }

    #[test]
    fn test_page_new_is_zeroed() {
        assert!(Page::new().is_zeroed());
    }

    #[test]
    fn test_page_reset() {
        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xFF;
        page.as_mut_slice()[4095] = 0xAB;
        assert!(!page.is_zeroed());

        page.reset();
        assert!(page.is_zeroed());
    }

    #[test]
    fn test_page_copy_from() {
        let mut src = Page::new();
        src.as_mut_slice()[100] = 0xCD;

        let mut dst = Page::new();
        dst.as_mut_slice()[0] = 0x11;
        dst.copy_from(&src);

        assert_eq!(dst.as_slice()[0], 0);
        assert_eq!(dst.as_slice()[100], 0xCD);
    }
}
