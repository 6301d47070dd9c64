//! Random replacement policy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FrameState, Replacer};
use crate::common::FrameId;

/// Evicts a uniformly random unpinned frame.
///
/// Unpinned frames live in a dense vector so a victim is one index draw
/// away; `slot` maps each frame back to its position for O(1) removal.
#[derive(Debug)]
pub struct RandomReplacer {
    unpinned: Vec<FrameId>,
    slot: Vec<Option<usize>>,
    states: Vec<FrameState>,
    free: usize,
    rng: StdRng,
}

impl RandomReplacer {
    pub fn new(pool_size: usize) -> Self {
        Self::with_rng(pool_size, StdRng::from_os_rng())
    }

    /// Deterministic variant for tests and benchmarks.
    pub fn with_seed(pool_size: usize, seed: u64) -> Self {
        Self::with_rng(pool_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool_size: usize, rng: StdRng) -> Self {
        Self {
            unpinned: Vec::with_capacity(pool_size),
            slot: vec![None; pool_size],
            states: vec![FrameState::Free; pool_size],
            free: pool_size,
            rng,
        }
    }

    /// Number of frames holding no page.
    pub fn free_count(&self) -> usize {
        self.free
    }

    fn insert(&mut self, frame_id: FrameId) {
        self.slot[frame_id.index()] = Some(self.unpinned.len());
        self.unpinned.push(frame_id);
    }

    fn remove(&mut self, frame_id: FrameId) {
        let Some(pos) = self.slot[frame_id.index()].take() else {
            return;
        };
        self.unpinned.swap_remove(pos);
        if let Some(&moved) = self.unpinned.get(pos) {
            self.slot[moved.index()] = Some(pos);
        }
    }
}

impl Replacer for RandomReplacer {
    fn notify(&mut self, frame_id: FrameId, state: FrameState) {
        let prev = std::mem::replace(&mut self.states[frame_id.index()], state);
        debug_assert!(
            prev.can_transition_to(state),
            "{frame_id}: invalid transition {prev:?} -> {state:?}"
        );

        match prev {
            FrameState::Free => self.free -= 1,
            FrameState::Unpinned => self.remove(frame_id),
            FrameState::Pinned => {}
        }
        match state {
            FrameState::Free => self.free += 1,
            FrameState::Unpinned => self.insert(frame_id),
            FrameState::Pinned => {}
        }
    }

    fn pick_victim(&mut self) -> Option<FrameId> {
        if self.unpinned.is_empty() {
            return None;
        }
        let pos = self.rng.random_range(0..self.unpinned.len());
        Some(self.unpinned[pos])
    }

    fn evictable_count(&self) -> usize {
        self.unpinned.len()
    }
}
