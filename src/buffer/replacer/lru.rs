//! LRU (Least Recently Used) replacement policy.
//!
//! Recency is measured by the moment a frame's pin count last reached
//! zero. Re-pinning a resident page takes it out of the queue; the next
//! unpin appends it at the back again.

use std::collections::VecDeque;

use super::{FrameState, Replacer};
use crate::common::FrameId;

/// Unpinned frames in the order they were unpinned (front = oldest).
///
/// Shared by [`LruReplacer`] and [`MruReplacer`](super::MruReplacer),
/// which differ only in which end they evict from.
#[derive(Debug)]
pub(super) struct UnpinOrder {
    order: VecDeque<FrameId>,
    /// O(1) membership check, indexed by frame.
    queued: Vec<bool>,
}

impl UnpinOrder {
    pub(super) fn new(pool_size: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(pool_size),
            queued: vec![false; pool_size],
        }
    }

    pub(super) fn apply(&mut self, frame_id: FrameId, state: FrameState) {
        match state {
            FrameState::Unpinned => {
                debug_assert!(!self.queued[frame_id.index()], "{frame_id} already unpinned");
                self.order.push_back(frame_id);
                self.queued[frame_id.index()] = true;
            }
            FrameState::Pinned | FrameState::Free => self.remove(frame_id),
        }
    }

    fn remove(&mut self, frame_id: FrameId) {
        if !std::mem::take(&mut self.queued[frame_id.index()]) {
            return;
        }
        if let Some(pos) = self.order.iter().position(|&f| f == frame_id) {
            self.order.remove(pos);
        }
    }

    pub(super) fn oldest(&self) -> Option<FrameId> {
        self.order.front().copied()
    }

    pub(super) fn newest(&self) -> Option<FrameId> {
        self.order.back().copied()
    }

    pub(super) fn len(&self) -> usize {
        self.order.len()
    }
}

/// Evicts the frame that has been unpinned the longest.
#[derive(Debug)]
pub struct LruReplacer {
    unpinned: UnpinOrder,
}

impl LruReplacer {
    pub fn new(pool_size: usize) -> Self {
        Self {
            unpinned: UnpinOrder::new(pool_size),
        }
    }
}

impl Replacer for LruReplacer {
    fn notify(&mut self, frame_id: FrameId, state: FrameState) {
        self.unpinned.apply(frame_id, state);
    }

    fn pick_victim(&mut self) -> Option<FrameId> {
        self.unpinned.oldest()
    }

    fn evictable_count(&self) -> usize {
        self.unpinned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin_all(replacer: &mut LruReplacer, n: usize) {
        for i in 0..n {
            replacer.notify(FrameId::new(i), FrameState::Pinned);
        }
    }

    #[test]
    fn test_lru_evicts_oldest_unpin() {
        let mut replacer = LruReplacer::new(4);
        pin_all(&mut replacer, 4);

        replacer.notify(FrameId::new(2), FrameState::Unpinned);
        replacer.notify(FrameId::new(0), FrameState::Unpinned);
        replacer.notify(FrameId::new(3), FrameState::Unpinned);

        assert_eq!(replacer.evictable_count(), 3);
        assert_eq!(replacer.pick_victim(), Some(FrameId::new(2)));

        // The pool re-pins the victim with its new page
        replacer.notify(FrameId::new(2), FrameState::Pinned);
        assert_eq!(replacer.pick_victim(), Some(FrameId::new(0)));
    }

    #[test]
    fn test_lru_repin_moves_to_back() {
        let mut replacer = LruReplacer::new(3);
        pin_all(&mut replacer, 3);

        replacer.notify(FrameId::new(0), FrameState::Unpinned);
        replacer.notify(FrameId::new(1), FrameState::Unpinned);

        // Frame 0 gets hit again, then released
        replacer.notify(FrameId::new(0), FrameState::Pinned);
        replacer.notify(FrameId::new(0), FrameState::Unpinned);

        assert_eq!(replacer.pick_victim(), Some(FrameId::new(1)));
    }

    #[test]
    fn test_lru_pick_does_not_consume() {
        let mut replacer = LruReplacer::new(2);
        pin_all(&mut replacer, 2);
        replacer.notify(FrameId::new(1), FrameState::Unpinned);

        assert_eq!(replacer.pick_victim(), Some(FrameId::new(1)));
        assert_eq!(replacer.pick_victim(), Some(FrameId::new(1)));
        assert_eq!(replacer.evictable_count(), 1);
    }

    #[test]
    fn test_lru_free_removes() {
        let mut replacer = LruReplacer::new(2);
        pin_all(&mut replacer, 2);
        replacer.notify(FrameId::new(0), FrameState::Unpinned);
        replacer.notify(FrameId::new(1), FrameState::Unpinned);
        replacer.notify(FrameId::new(0), FrameState::Free);

        assert_eq!(replacer.pick_victim(), Some(FrameId::new(1)));
        assert_eq!(replacer.evictable_count(), 1);
    }
}
