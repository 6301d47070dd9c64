//! Handles and RAII guards for pinned pages.
//!
//! The explicit API hands out a [`PageHandle`] from `pin_page`/`new_page`
//! and expects a matching `unpin_page`. The guards wrap that pairing:
//! - [`PageReadGuard`] - Shared access, unpins clean on drop
//! - [`PageWriteGuard`] - Exclusive access, unpins dirty on drop

use std::fmt;
use std::ops::{Deref, DerefMut};

use log::warn;
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use super::buffer_pool_manager::BufferPoolManager;
use crate::common::{FrameId, PageId};
use crate::storage::page::Page;
use crate::storage::BlockStore;

/// A pinned page: which page, and the frame it sits in.
///
/// Handles are plain values. One stays meaningful only until the pin it
/// represents is released with `unpin_page` or `free_page`; after that
/// the frame may hold a different page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle {
    page_id: PageId,
    frame_id: FrameId,
}

impl PageHandle {
    pub(crate) fn new(page_id: PageId, frame_id: FrameId) -> Self {
        Self { page_id, frame_id }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.page_id, self.frame_id)
    }
}

/// How an unpin treats the frame's dirty flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpinMode {
    /// Leave the dirty flag as it is.
    Clean,
    /// Mark the page dirty. The flag is never cleared by an unpin.
    Dirty,
}

/// Shared access to a pinned page.
///
/// Multiple `PageReadGuard`s can exist for the same page simultaneously.
/// The page lock is released, then the page unpinned, when the guard drops.
pub struct PageReadGuard<'a, S: BlockStore> {
    bpm: &'a BufferPoolManager<S>,
    handle: PageHandle,
    lock: Option<RwLockReadGuard<'a, Page>>,
}

impl<'a, S: BlockStore> PageReadGuard<'a, S> {
    pub(crate) fn new(
        bpm: &'a BufferPoolManager<S>,
        handle: PageHandle,
        lock: RwLockReadGuard<'a, Page>,
    ) -> Self {
        Self {
            bpm,
            handle,
            lock: Some(lock),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.handle.page_id
    }

    #[inline]
    pub fn handle(&self) -> PageHandle {
        self.handle
    }
}

impl<S: BlockStore> Deref for PageReadGuard<'_, S> {
    type Target = Page;

    fn deref(&self) -> &Page {
        self.lock.as_deref().expect("page lock held until drop")
    }
}

impl<S: BlockStore> Drop for PageReadGuard<'_, S> {
    fn drop(&mut self) {
        self.lock.take();
        if let Err(e) = self.bpm.unpin_page(&self.handle, UnpinMode::Clean) {
            warn!("read guard for {} failed to unpin: {}", self.handle, e);
        }
    }
}

/// Exclusive access to a pinned page.
///
/// Only one `PageWriteGuard` can exist for a page at a time. The page is
/// unpinned dirty when the guard drops.
pub struct PageWriteGuard<'a, S: BlockStore> {
    bpm: &'a BufferPoolManager<S>,
    handle: PageHandle,
    lock: Option<RwLockWriteGuard<'a, Page>>,
}

impl<'a, S: BlockStore> PageWriteGuard<'a, S> {
    pub(crate) fn new(
        bpm: &'a BufferPoolManager<S>,
        handle: PageHandle,
        lock: RwLockWriteGuard<'a, Page>,
    ) -> Self {
        Self {
            bpm,
            handle,
            lock: Some(lock),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.handle.page_id
    }

    #[inline]
    pub fn handle(&self) -> PageHandle {
        self.handle
    }
}

impl<S: BlockStore> Deref for PageWriteGuard<'_, S> {
    type Target = Page;

    fn deref(&self) -> &Page {
        self.lock.as_deref().expect("page lock held until drop")
    }
}

impl<S: BlockStore> DerefMut for PageWriteGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Page {
        self.lock.as_deref_mut().expect("page lock held until drop")
    }
}

impl<S: BlockStore> Drop for PageWriteGuard<'_, S> {
    fn drop(&mut self) {
        self.lock.take();
        if let Err(e) = self.bpm.unpin_page(&self.handle, UnpinMode::Dirty) {
            warn!("write guard for {} failed to unpin: {}", self.handle, e);
        }
    }
}
