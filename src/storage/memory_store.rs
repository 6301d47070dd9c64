//! In-memory block store.
//!
//! [`MemoryBlockStore`] keeps every page in a `Vec` and follows the same
//! allocation rules as [`DiskManager`](crate::storage::DiskManager). It
//! counts I/O calls and can be told to fail reads or writes, which makes
//! it the store of choice for exercising the buffer pool's error paths.

use std::collections::BTreeSet;
use std::io;

use crate::common::{Error, PageId, Result};
use crate::storage::block_store::BlockStore;
use crate::storage::page::Page;

/// A volatile [`BlockStore`].
///
/// # Example
/// ```
/// use pagecache::storage::{BlockStore, MemoryBlockStore};
/// use pagecache::Page;
///
/// let mut store = MemoryBlockStore::new();
/// let page_id = store.allocate_page().unwrap();
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 9;
/// store.write_page(page_id, &page).unwrap();
/// assert_eq!(store.writes(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    /// Slot per page number; `None` once deallocated.
    pages: Vec<Option<Box<Page>>>,
    free_pages: BTreeSet<PageId>,
    reads: u64,
    writes: u64,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `read_page` calls.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of successful `write_page` calls.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Number of allocated (not deallocated) pages.
    pub fn allocated_count(&self) -> usize {
        self.pages.iter().filter(|slot| slot.is_some()).count()
    }

    /// Make every following `read_page` fail with an I/O error.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every following `write_page` fail with an I/O error.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Inspect stored bytes without going through the I/O counters.
    pub fn peek(&self, page_id: PageId) -> Option<&Page> {
        self.pages
            .get(page_id.0 as usize)
            .and_then(|slot| slot.as_deref())
    }

    fn slot_mut(&mut self, page_id: PageId) -> Result<&mut Page> {
        self.pages
            .get_mut(page_id.0 as usize)
            .and_then(|slot| slot.as_deref_mut())
            .ok_or(Error::InvalidPageId(page_id.0))
    }
}

impl BlockStore for MemoryBlockStore {
    fn allocate_page(&mut self) -> Result<PageId> {
        if let Some(page_id) = self.free_pages.pop_first() {
            self.pages[page_id.0 as usize] = Some(Box::new(Page::new()));
            return Ok(page_id);
        }

        let page_id = PageId::new(self.pages.len() as u32);
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }
        self.pages.push(Some(Box::new(Page::new())));
        Ok(page_id)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.slot_mut(page_id)?;
        self.pages[page_id.0 as usize] = None;
        self.free_pages.insert(page_id);
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        if self.fail_reads {
            return Err(io::Error::other("injected read failure").into());
        }
        let stored = self.slot_mut(page_id)?;
        page.copy_from(stored);
        self.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("injected write failure").into());
        }
        self.slot_mut(page_id)?.copy_from(page);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sequential() {
        let mut store = MemoryBlockStore::new();
        assert_eq!(store.allocate_page().unwrap(), PageId::new(0));
        assert_eq!(store.allocate_page().unwrap(), PageId::new(1));
        assert_eq!(store.allocated_count(), 2);
    }

    #[test]
    fn test_write_read() {
        let mut store = MemoryBlockStore::new();
        let pid = store.allocate_page().unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[10] = 0x5A;
        store.write_page(pid, &page).unwrap();

        let mut out = Page::new();
        store.read_page(pid, &mut out).unwrap();
        assert_eq!(out.as_slice()[10], 0x5A);
        assert_eq!((store.reads(), store.writes()), (1, 1));
    }

    #[test]
    fn test_deallocate_reuses_lowest() {
        let mut store = MemoryBlockStore::new();
        for _ in 0..4 {
            store.allocate_page().unwrap();
        }
        store.deallocate_page(PageId::new(2)).unwrap();
        store.deallocate_page(PageId::new(1)).unwrap();

        let mut page = Page::new();
        assert!(matches!(
            store.read_page(PageId::new(1), &mut page),
            Err(Error::InvalidPageId(1))
        ));
        assert!(store.deallocate_page(PageId::new(1)).is_err());

        assert_eq!(store.allocate_page().unwrap(), PageId::new(1));
        assert_eq!(store.allocate_page().unwrap(), PageId::new(2));
        assert_eq!(store.allocate_page().unwrap(), PageId::new(4));
    }

    #[test]
    fn test_reallocated_page_is_zeroed() {
        let mut store = MemoryBlockStore::new();
        let pid = store.allocate_page().unwrap();
        let mut page = Page::new();
        page.as_mut_slice()[0] = 1;
        store.write_page(pid, &page).unwrap();

        store.deallocate_page(pid).unwrap();
        assert_eq!(store.allocate_page().unwrap(), pid);
        assert!(store.peek(pid).unwrap().is_zeroed());
    }

    #[test]
    fn test_fault_injection() {
        let mut store = MemoryBlockStore::new();
        let pid = store.allocate_page().unwrap();
        let mut page = Page::new();

        store.set_fail_writes(true);
        assert!(matches!(store.write_page(pid, &page), Err(Error::Io(_))));
        store.set_fail_reads(true);
        assert!(matches!(store.read_page(pid, &mut page), Err(Error::Io(_))));

        assert_eq!((store.reads(), store.writes()), (0, 0));
    }
}
