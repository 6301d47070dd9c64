//! CLOCK (second chance) replacement policy.
//!
//! Frames sit on a circle swept by a hand. Unpinning a frame sets its
//! reference bit; the sweep clears set bits as it passes and evicts the
//! first unpinned frame whose bit is already clear.
//!
//! # Tie-break
//! The sweep starts at the hand, which begins at frame 0 and rests one
//! past the last victim. When every candidate is referenced, the first
//! lap clears them all and the second lap takes the first unpinned frame
//! in circle order from the hand.

use super::{FrameState, Replacer};
use crate::common::FrameId;

/// Second-chance replacer with a sweep bounded to two rotations.
#[derive(Debug)]
pub struct ClockReplacer {
    /// Set on unpin, cleared by a passing sweep.
    referenced: Vec<bool>,
    /// Set while the frame's pin count is > 0.
    pinned: Vec<bool>,
    /// Set while the frame holds a page.
    resident: Vec<bool>,
    hand: usize,
    unpinned: usize,
    /// Positions examined by the most recent sweep.
    last_sweep: usize,
}

impl ClockReplacer {
    pub fn new(pool_size: usize) -> Self {
        Self {
            referenced: vec![false; pool_size],
            pinned: vec![false; pool_size],
            resident: vec![false; pool_size],
            hand: 0,
            unpinned: 0,
            last_sweep: 0,
        }
    }

    /// Frame the next sweep starts from.
    pub fn hand(&self) -> FrameId {
        FrameId::new(self.hand)
    }

    fn is_unpinned(&self, i: usize) -> bool {
        self.resident[i] && !self.pinned[i]
    }
}

impl Replacer for ClockReplacer {
    fn notify(&mut self, frame_id: FrameId, state: FrameState) {
        let i = frame_id.index();
        let was_unpinned = self.is_unpinned(i);

        match state {
            FrameState::Free => {
                debug_assert!(was_unpinned, "{frame_id} freed while not unpinned");
                self.resident[i] = false;
                self.pinned[i] = false;
                self.referenced[i] = false;
            }
            FrameState::Pinned => {
                debug_assert!(!self.pinned[i], "{frame_id} pinned twice");
                self.resident[i] = true;
                self.pinned[i] = true;
            }
            FrameState::Unpinned => {
                debug_assert!(self.pinned[i], "{frame_id} unpinned while not pinned");
                self.pinned[i] = false;
                self.referenced[i] = true;
            }
        }

        match (was_unpinned, self.is_unpinned(i)) {
            (true, false) => self.unpinned -= 1,
            (false, true) => self.unpinned += 1,
            _ => {}
        }
    }

    fn pick_victim(&mut self) -> Option<FrameId> {
        let n = self.referenced.len();
        self.last_sweep = 0;

        for _ in 0..2 * n {
            let i = self.hand;
            self.hand = (self.hand + 1) % n;
            self.last_sweep += 1;

            if !self.is_unpinned(i) {
                continue;
            }
            if self.referenced[i] {
                self.referenced[i] = false;
                continue;
            }
            return Some(FrameId::new(i));
        }

        None
    }

    fn evictable_count(&self) -> usize {
        self.unpinned
    }
}
