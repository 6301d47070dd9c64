//! MRU (Most Recently Used) replacement policy.
//!
//! Useful for sequential scans larger than the pool, where the page just
//! released is the one least likely to be needed again soon.

use super::lru::UnpinOrder;
use super::{FrameState, Replacer};
use crate::common::FrameId;

/// Evicts the frame that was unpinned most recently.
#[derive(Debug)]
pub struct MruReplacer {
    unpinned: UnpinOrder,
}

impl MruReplacer {
    pub fn new(pool_size: usize) -> Self {
        Self {
            unpinned: UnpinOrder::new(pool_size),
        }
    }
}

impl Replacer for MruReplacer {
    fn notify(&mut self, frame_id: FrameId, state: FrameState) {
        self.unpinned.apply(frame_id, state);
    }

    fn pick_victim(&mut self) -> Option<FrameId> {
        self.unpinned.newest()
    }

    fn evictable_count(&self) -> usize {
        self.unpinned.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mru_evicts_newest_unpin() {
        let mut replacer = MruReplacer::new(3);
        for i in 0..3 {
            replacer.notify(FrameId::new(i), FrameState::Pinned);
        }

        replacer.notify(FrameId::new(0), FrameState::Unpinned);
        replacer.notify(FrameId::new(2), FrameState::Unpinned);

        assert_eq!(replacer.pick_victim(), Some(FrameId::new(2)));

        replacer.notify(FrameId::new(2), FrameState::Pinned);
        assert_eq!(replacer.pick_victim(), Some(FrameId::new(0)));

        replacer.notify(FrameId::new(0), FrameState::Pinned);
        assert_eq!(replacer.pick_victim(), None);
    }

    #[test]
    fn test_mru_empty() {
        let mut replacer = MruReplacer::new(0);
        assert_eq!(replacer.pick_victim(), None);
        assert_eq!(replacer.evictable_count(), 0);
    }
}
