//! Disk Manager - file-backed block store.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and deallocating page numbers
//! - Managing the database file

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::block_store::BlockStore;
use crate::storage::page::Page;

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Allocation
/// Deallocated page numbers go into an in-memory free set and are handed
/// out again lowest-first before the file grows. The free set is not
/// persisted: a reopened file treats every page it contains as in use.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskManager {
    file: File,
    /// Number of pages in the file, allocated or not.
    page_count: u32,
    /// Page numbers released by `deallocate_page`.
    free_pages: BTreeSet<PageId>,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            page_count,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of pages in the file, including deallocated ones.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of page numbers waiting to be reused.
    #[inline]
    pub fn free_page_count(&self) -> usize {
        self.free_pages.len()
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        u64::from(self.page_count) * PAGE_SIZE as u64
    }

    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() || page_id.0 >= self.page_count || self.free_pages.contains(&page_id)
        {
            return Err(Error::InvalidPageId(page_id.0));
        }
        Ok(())
    }

    fn write_at(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(page_id.file_offset(PAGE_SIZE)))?;
        self.file.write_all(data)?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl BlockStore for DiskManager {
    /// Reuse the lowest free page number, or extend the file by one page.
    ///
    /// Either way the page is zeroed on disk before it is returned.
    fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = match self.free_pages.pop_first() {
            Some(page_id) => page_id,
            None => {
                if u64::from(self.page_count) >= MAX_PAGES {
                    return Err(Error::InvalidPageId(self.page_count));
                }
                PageId::new(self.page_count)
            }
        };

        let zeros = [0u8; PAGE_SIZE];
        if let Err(e) = self.write_at(page_id, &zeros) {
            if page_id.0 < self.page_count {
                self.free_pages.insert(page_id);
            }
            return Err(e);
        }

        if page_id.0 == self.page_count {
            self.page_count += 1;
        }
        debug!("allocated {}", page_id);
        Ok(page_id)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.check_allocated(page_id)?;
        self.free_pages.insert(page_id);
        debug!("deallocated {}", page_id);
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        self.check_allocated(page_id)?;
        self.file.seek(SeekFrom::Start(page_id.file_offset(PAGE_SIZE)))?;
        self.file.read_exact(page.as_mut_slice())?;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_allocated(page_id)?;
        self.write_at(page_id, page.as_slice())
    }
}
