//! The block-store boundary consumed by the buffer pool.

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// Fixed-size block I/O and page-number allocation.
///
/// The buffer pool is the only caller. It serializes every call behind
/// its pool lock, so implementations take `&mut self` and need no
/// internal synchronization.
///
/// Implementations must report unknown or deallocated page IDs as
/// [`Error::InvalidPageId`](crate::Error::InvalidPageId) and device
/// failures as [`Error::Io`](crate::Error::Io).
pub trait BlockStore: Send {
    /// Assign a fresh page number and mark it in use.
    ///
    /// The returned page reads back as all zeros until written.
    fn allocate_page(&mut self) -> Result<PageId>;

    /// Release a page number for reuse.
    fn deallocate_page(&mut self, page_id: PageId) -> Result<()>;

    /// Fill `page` with the stored contents of `page_id`.
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()>;

    /// Persist `page` as the contents of `page_id`.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()>;
}

impl<S: BlockStore + ?Sized> BlockStore for Box<S> {
    fn allocate_page(&mut self) -> Result<PageId> {
        (**self).allocate_page()
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        (**self).deallocate_page(page_id)
    }

    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        (**self).read_page(page_id, page)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        (**self).write_page(page_id, page)
    }
}
