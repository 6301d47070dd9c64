//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus the metadata the buffer pool needs:
//! - Which page is resident ([`PageId::INVALID`] when none)
//! - Pin count
//! - Dirty flag
//!
//! Frames carry no policy logic and do no I/O.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::page::Page;

/// A frame in the buffer pool.
///
/// Metadata is only mutated by the [`BufferPoolManager`] while it holds
/// its pool lock; the atomics just let readers such as
/// [`pinned_count`](crate::BufferPoolManager::pinned_count) look without
/// that lock. Page bytes have their own `RwLock` so pinned pages can be
/// read and written while the pool serves other requests.
///
/// [`BufferPoolManager`]: crate::BufferPoolManager
pub struct Frame {
    page: RwLock<Page>,
    page_id: AtomicU32,
    pin_count: AtomicU32,
    is_dirty: AtomicBool,
}

impl Frame {
    /// Create an empty frame holding a zeroed page.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
            page_id: AtomicU32::new(PageId::INVALID.0),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Page access
    // ========================================================================

    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    /// Shared access without blocking; `None` while a writer holds the page.
    #[inline]
    pub fn try_page(&self) -> Option<RwLockReadGuard<'_, Page>> {
        self.page.try_read()
    }

    // ========================================================================
    // Residency
    // ========================================================================

    /// Resident page, or [`PageId::INVALID`] for an empty frame.
    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId(self.page_id.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.page_id().is_valid()
    }

    /// Make `page_id` resident with pin count 0 and a clean flag.
    ///
    /// The page bytes are left alone; the caller loads or zeroes them
    /// before pinning.
    pub fn reset(&self, page_id: PageId) {
        self.page_id.store(page_id.0, Ordering::Release);
        self.pin_count.store(0, Ordering::Release);
        self.is_dirty.store(false, Ordering::Release);
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::AcqRel);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Dirty flag
    // ========================================================================

    #[inline]
    pub fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::Release);
    }

    #[inline]
    pub fn clear_dirty(&self) {
        self.is_dirty.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::Acquire)
    }

    /// Resident and not pinned.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        !self.is_empty() && !self.is_pinned()
    }

    /// Drop residency entirely. Used when a page is freed or a load fails.
    pub(crate) fn invalidate(&self) {
        self.reset(PageId::INVALID);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
