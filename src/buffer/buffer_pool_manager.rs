//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between a [`BlockStore`] and memory
//! - Pin-based reference counting
//! - Dirty page write-back before any frame is reused
//! - A replacement policy chosen at construction

use std::collections::HashMap;

use log::{debug, error, trace, warn};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard, RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::replacer::{FrameState, PolicyReplacer, ReplacementPolicy, Replacer};
use crate::buffer::{BufferPoolStats, Frame, PageHandle, PageReadGuard, PageWriteGuard, UnpinMode};
use crate::common::{BufferPoolConfig, Error, FrameId, PageId, Result};
use crate::storage::page::Page;
use crate::storage::{BlockStore, DiskManager};

/// Everything the pool lock protects.
struct PoolState<S> {
    /// Residency map: an entry exists iff the page occupies a frame.
    page_table: HashMap<PageId, FrameId>,

    /// Frames holding no page. Popped from the back, so frame 0 goes first.
    free_list: Vec<FrameId>,

    replacer: PolicyReplacer,

    store: S,
}

/// Manages a fixed pool of frames caching block-store pages.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                     BufferPoolManager                        │
/// │  ┌─────────────── state: Mutex<PoolState> ───────────────┐   │
/// │  │ page_table       free_list      replacer      store   │   │
/// │  │ PageId → Fid     Vec<FrameId>   PolicyReplacer  S     │   │
/// │  └───────────────────────────────────────────────────────┘   │
/// │  ┌───────────────────────────────────────────────────────┐   │
/// │  │ frames: Vec<Frame>  [Frame0] [Frame1] [Frame2] ...    │   │
/// │  └───────────────────────────────────────────────────────┘   │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// Every public operation runs under one pool-wide `Mutex`, block-store
/// I/O included. Page bytes sit behind a per-frame `RwLock`, so a caller
/// holding a pin can read or write its page without the pool lock.
///
/// Lock order is pool lock, then page lock, and the pool lock only ever
/// waits on the page lock of an unpinned frame. Flushing a pinned page
/// uses a non-blocking read: if a caller holds that page for writing, the
/// page is skipped and stays dirty. A caller may therefore keep a page
/// guard while making further pool calls, flushes included.
///
/// A caller must not hold a page lock obtained through [`page`] or
/// [`page_mut`] past the matching unpin: once unpinned, the frame may be
/// chosen for eviction, and eviction waits for that lock.
///
/// # Usage
/// ```
/// use pagecache::storage::MemoryBlockStore;
/// use pagecache::{BufferPoolManager, ReplacementPolicy, UnpinMode};
///
/// let bpm = BufferPoolManager::new(4, ReplacementPolicy::Lru, MemoryBlockStore::new());
///
/// let handle = bpm.new_page().unwrap();
/// bpm.page_mut(&handle).unwrap().as_mut_slice()[0] = 0xAB;
/// bpm.unpin_page(&handle, UnpinMode::Dirty).unwrap();
///
/// let again = bpm.pin_page(handle.page_id()).unwrap();
/// assert_eq!(bpm.page(&again).unwrap().as_slice()[0], 0xAB);
/// bpm.unpin_page(&again, UnpinMode::Clean).unwrap();
/// ```
///
/// [`page`]: BufferPoolManager::page
/// [`page_mut`]: BufferPoolManager::page_mut
pub struct BufferPoolManager<S: BlockStore = DiskManager> {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    state: Mutex<PoolState<S>>,

    stats: BufferPoolStats,
}

impl<S: BlockStore> BufferPoolManager<S> {
    /// Create a buffer pool of `pool_size` frames over `store`.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, policy: ReplacementPolicy, store: S) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames = (0..pool_size).map(|_| Frame::new()).collect();
        let free_list = (0..pool_size).rev().map(FrameId::new).collect();

        Self {
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::with_capacity(pool_size),
                free_list,
                replacer: PolicyReplacer::new(policy, pool_size),
                store,
            }),
            stats: BufferPoolStats::new(),
        }
    }

    pub fn with_config(config: BufferPoolConfig, store: S) -> Self {
        Self::new(config.pool_size, config.policy, store)
    }

    // ========================================================================
    // Public API: Create and free pages
    // ========================================================================

    /// Allocate a fresh page and pin it.
    ///
    /// The page is zero-filled and marked dirty without any read. A frame
    /// is secured before the block store allocates, so a full pool does
    /// not leak a page number.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - I/O errors from write-back or allocation
    pub fn new_page(&self) -> Result<PageHandle> {
        let mut state = self.state.lock();

        let frame_id = self.acquire_frame(&mut state)?;
        let page_id = match state.store.allocate_page() {
            Ok(page_id) => page_id,
            Err(e) => {
                state.free_list.push(frame_id);
                return Err(e);
            }
        };

        let frame = &self.frames[frame_id.index()];
        frame.page_mut().reset();
        self.install(&mut state, frame_id, page_id);
        frame.mark_dirty();

        BufferPoolStats::bump(&self.stats.pages_allocated);
        debug!("new {} in {}", page_id, frame_id);
        Ok(PageHandle::new(page_id, frame_id))
    }

    /// Release a page entirely: drop it from the pool and deallocate it.
    ///
    /// The caller must hold the only pin (pin count exactly 1). Dirty
    /// contents are discarded.
    ///
    /// # Errors
    /// - `Error::PinCountViolation` if the pin count isn't 1
    /// - Errors from the block store's deallocation (pool left unchanged)
    pub fn free_page(&self, handle: &PageHandle) -> Result<()> {
        let mut state = self.state.lock();

        let frame = self.resident_frame(handle)?;
        if frame.pin_count() != 1 {
            return Err(Error::PinCountViolation {
                page_id: handle.page_id().0,
                pin_count: frame.pin_count(),
            });
        }

        state.store.deallocate_page(handle.page_id())?;

        frame.unpin();
        state.replacer.notify(handle.frame_id(), FrameState::Unpinned);
        state.page_table.remove(&handle.page_id());
        state.replacer.notify(handle.frame_id(), FrameState::Free);
        frame.invalidate();
        state.free_list.push(handle.frame_id());

        BufferPoolStats::bump(&self.stats.pages_freed);
        debug!("freed {}", handle);
        Ok(())
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin `page_id`, loading it if it isn't resident.
    ///
    /// # Errors
    /// - `Error::InvalidPageId` for the sentinel or a page the store doesn't know
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - I/O errors from write-back or the read
    pub fn pin_page(&self, page_id: PageId) -> Result<PageHandle> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let mut state = self.state.lock();

        let resident = state.page_table.get(&page_id).copied();
        if let Some(frame_id) = resident {
            if self.frames[frame_id.index()].pin() == 1 {
                state.replacer.notify(frame_id, FrameState::Pinned);
            }
            BufferPoolStats::bump(&self.stats.cache_hits);
            trace!("hit {} in {}", page_id, frame_id);
            return Ok(PageHandle::new(page_id, frame_id));
        }

        BufferPoolStats::bump(&self.stats.cache_misses);
        let frame_id = self.acquire_frame(&mut state)?;

        let loaded = {
            let mut page = self.frames[frame_id.index()].page_mut();
            state.store.read_page(page_id, &mut page)
        };
        if let Err(e) = loaded {
            warn!("failed to load {} into {}: {}", page_id, frame_id, e);
            state.free_list.push(frame_id);
            return Err(e);
        }

        BufferPoolStats::bump(&self.stats.pages_read);
        self.install(&mut state, frame_id, page_id);
        trace!("miss {} loaded into {}", page_id, frame_id);
        Ok(PageHandle::new(page_id, frame_id))
    }

    /// Release one pin on the handle's page.
    ///
    /// `UnpinMode::Dirty` marks the page dirty; the flag is never cleared
    /// here. When the last pin goes, the page becomes evictable.
    ///
    /// # Errors
    /// - `Error::PinCountViolation` if the page isn't pinned
    pub fn unpin_page(&self, handle: &PageHandle, mode: UnpinMode) -> Result<()> {
        let mut state = self.state.lock();

        let frame = self.pinned_frame(handle)?;
        if mode == UnpinMode::Dirty {
            frame.mark_dirty();
        }
        if frame.unpin() == 0 {
            state.replacer.notify(handle.frame_id(), FrameState::Unpinned);
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Page bytes
    // ========================================================================

    /// Shared access to a pinned page's bytes.
    ///
    /// # Errors
    /// - `Error::PinCountViolation` if the handle's pin has been released
    pub fn page(&self, handle: &PageHandle) -> Result<RwLockReadGuard<'_, Page>> {
        let frame = {
            let _state = self.state.lock();
            self.pinned_frame(handle)?
        };
        Ok(frame.page())
    }

    /// Exclusive access to a pinned page's bytes.
    ///
    /// Writing does not mark the page dirty; unpin with
    /// `UnpinMode::Dirty` for that.
    ///
    /// # Errors
    /// - `Error::PinCountViolation` if the handle's pin has been released
    pub fn page_mut(&self, handle: &PageHandle) -> Result<RwLockWriteGuard<'_, Page>> {
        let frame = {
            let _state = self.state.lock();
            self.pinned_frame(handle)?
        };
        Ok(frame.page_mut())
    }

    /// Pin a page and take shared access; unpins clean on drop.
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_, S>> {
        let handle = self.pin_page(page_id)?;
        let lock = self.frames[handle.frame_id().index()].page();
        Ok(PageReadGuard::new(self, handle, lock))
    }

    /// Pin a page and take exclusive access; unpins dirty on drop.
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_, S>> {
        let handle = self.pin_page(page_id)?;
        let lock = self.frames[handle.frame_id().index()].page_mut();
        Ok(PageWriteGuard::new(self, handle, lock))
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write the handle's page back if it is dirty.
    ///
    /// Pin count and residency are unchanged. A page that has since left
    /// the pool was written back on its way out, so this is a no-op.
    ///
    /// Returns `false` if the page stayed dirty because someone holds it
    /// for writing at the moment (the calling thread included).
    pub fn flush_page(&self, handle: &PageHandle) -> Result<bool> {
        self.flush_page_id(handle.page_id())
    }

    /// Write `page_id` back if it is resident and dirty.
    ///
    /// Returns `false` only when the page is dirty and write-locked.
    pub fn flush_page_id(&self, page_id: PageId) -> Result<bool> {
        let mut state = self.state.lock();
        match state.page_table.get(&page_id).copied() {
            Some(frame_id) => self.flush_frame(&mut state, frame_id),
            None => Ok(true),
        }
    }

    /// Write back every dirty resident page. Used for checkpoints and shutdown.
    ///
    /// Pages write-locked by a caller are skipped and stay dirty. Returns
    /// how many were skipped.
    ///
    /// # Errors
    /// Stops at the first I/O error; pages already written stay clean.
    pub fn flush_all_pages(&self) -> Result<usize> {
        let mut state = self.state.lock();

        let mut resident: Vec<FrameId> = state.page_table.values().copied().collect();
        resident.sort_unstable();

        let mut skipped = 0;
        for frame_id in resident {
            if !self.flush_frame(&mut state, frame_id)? {
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Total number of frames.
    pub fn buffer_count(&self) -> usize {
        self.frames.len()
    }

    /// Frames whose page has pin count > 0.
    pub fn pinned_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_pinned()).count()
    }

    /// Resident frames with pin count 0.
    pub fn unpinned_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_evictable()).count()
    }

    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    pub fn free_frame_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    /// Number of resident pages.
    pub fn page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// Pin count of `page_id`, or `None` if it isn't resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state.lock();
        state
            .page_table
            .get(&page_id)
            .map(|fid| self.frames[fid.index()].pin_count())
    }

    /// Whether `page_id` is resident and dirty.
    pub fn is_dirty(&self, page_id: PageId) -> bool {
        let state = self.state.lock();
        state
            .page_table
            .get(&page_id)
            .is_some_and(|fid| self.frames[fid.index()].is_dirty())
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.state.lock().replacer.policy()
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Direct access to the block store.
    ///
    /// Holds the pool lock until the guard drops.
    pub fn block_store(&self) -> MappedMutexGuard<'_, S> {
        MutexGuard::map(self.state.lock(), |state| &mut state.store)
    }

    // ========================================================================
    // Internal: Handle validation
    // ========================================================================

    /// The handle's frame, if it still holds the handle's page.
    ///
    /// A frame that moved on to another page is reported as pin count 0:
    /// the handle's pin was necessarily released.
    fn resident_frame(&self, handle: &PageHandle) -> Result<&Frame> {
        match self.frames.get(handle.frame_id().index()) {
            Some(frame) if frame.page_id() == handle.page_id() && handle.page_id().is_valid() => {
                Ok(frame)
            }
            _ => Err(Error::PinCountViolation {
                page_id: handle.page_id().0,
                pin_count: 0,
            }),
        }
    }

    fn pinned_frame(&self, handle: &PageHandle) -> Result<&Frame> {
        let frame = self.resident_frame(handle)?;
        if !frame.is_pinned() {
            return Err(Error::PinCountViolation {
                page_id: handle.page_id().0,
                pin_count: 0,
            });
        }
        Ok(frame)
    }

    // ========================================================================
    // Internal: Frame allocation and eviction
    // ========================================================================

    /// Get an empty frame, evicting if necessary.
    ///
    /// The returned frame holds no page and is FREE as far as the replacer
    /// knows. The caller either installs a page in it or pushes it back on
    /// the free list.
    fn acquire_frame(&self, state: &mut PoolState<S>) -> Result<FrameId> {
        if let Some(frame_id) = state.free_list.pop() {
            return Ok(frame_id);
        }

        let frame_id = state.replacer.pick_victim().ok_or(Error::PoolExhausted)?;
        self.evict(state, frame_id)?;
        Ok(frame_id)
    }

    /// Write back and detach the page in `frame_id`.
    ///
    /// If the write-back fails, the page stays resident, dirty and
    /// evictable, and the error propagates; nothing is lost.
    fn evict(&self, state: &mut PoolState<S>, frame_id: FrameId) -> Result<()> {
        let frame = &self.frames[frame_id.index()];
        let old_page_id = frame.page_id();
        debug_assert!(frame.is_evictable(), "victim {frame_id} is not evictable");

        if frame.is_dirty() {
            let page = frame.page();
            if let Err(e) = self.write_back(state, frame, &page) {
                error!("write-back of {} from {} failed: {}", old_page_id, frame_id, e);
                return Err(e);
            }
        }

        state.page_table.remove(&old_page_id);
        state.replacer.notify(frame_id, FrameState::Free);
        frame.invalidate();

        BufferPoolStats::bump(&self.stats.evictions);
        debug!("evicted {} from {}", old_page_id, frame_id);
        Ok(())
    }

    /// Make `page_id` resident in the empty `frame_id` with one pin.
    fn install(&self, state: &mut PoolState<S>, frame_id: FrameId, page_id: PageId) {
        let frame = &self.frames[frame_id.index()];
        frame.reset(page_id);
        frame.pin();
        state.page_table.insert(page_id, frame_id);
        state.replacer.notify(frame_id, FrameState::Pinned);
    }

    /// Write a resident frame to the store if dirty.
    ///
    /// Never waits on the page lock. Returns `false` when the frame is
    /// dirty but write-locked; it stays dirty.
    fn flush_frame(&self, state: &mut PoolState<S>, frame_id: FrameId) -> Result<bool> {
        let frame = &self.frames[frame_id.index()];
        if !frame.is_dirty() {
            return Ok(true);
        }

        match frame.try_page() {
            Some(page) => {
                self.write_back(state, frame, &page)?;
                Ok(true)
            }
            None => {
                debug!("{} in {} is write-locked, left dirty", frame.page_id(), frame_id);
                Ok(false)
            }
        }
    }

    /// Store `page` as the frame's page and clear its dirty flag.
    ///
    /// `page` must be a read lock on the frame's own bytes, so no writer
    /// can change them between the write and the flag clear.
    fn write_back(&self, state: &mut PoolState<S>, frame: &Frame, page: &Page) -> Result<()> {
        state.store.write_page(frame.page_id(), page)?;
        frame.clear_dirty();
        BufferPoolStats::bump(&self.stats.pages_written);
        Ok(())
    }
}
