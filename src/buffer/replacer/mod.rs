//! Eviction policy implementations (replacers).
//!
//! A replacer is a passive oracle. The buffer pool notifies it of every
//! frame state transition and asks it for a victim only when the free
//! list is empty.
//!
//! ```text
//!            first pin              pin count hits 0
//!   FREE ──────────────▶ PINNED ◀────────────────▶ UNPINNED
//!     ▲                                   re-pin       │
//!     └────────────────────────────────────────────────┘
//!                         free_page
//! ```
//!
//! Implemented policies:
//! - [`RandomReplacer`] - Any unpinned frame
//! - [`LruReplacer`] - Least recently unpinned
//! - [`MruReplacer`] - Most recently unpinned
//! - [`ClockReplacer`] - Second chance, bounded sweep

mod clock;
mod lru;
mod mru;
mod random;

use std::fmt;

pub use clock::ClockReplacer;
pub use lru::LruReplacer;
pub use mru::MruReplacer;
pub use random::RandomReplacer;

use crate::common::FrameId;

/// Replacer-visible state of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Holds no page.
    Free,
    /// Resident with pin count > 0.
    Pinned,
    /// Resident with pin count == 0; eligible for eviction.
    Unpinned,
}

impl FrameState {
    /// Whether the buffer pool may ever notify `self -> next`.
    pub fn can_transition_to(self, next: FrameState) -> bool {
        matches!(
            (self, next),
            (FrameState::Free, FrameState::Pinned)
                | (FrameState::Pinned, FrameState::Unpinned)
                | (FrameState::Unpinned, FrameState::Pinned)
                | (FrameState::Unpinned, FrameState::Free)
        )
    }
}

/// Common interface of every eviction policy.
///
/// Invalid transitions are bugs in the caller; replacers only check
/// them with `debug_assert!`.
pub trait Replacer {
    /// Record that `frame_id` moved to `state`.
    fn notify(&mut self, frame_id: FrameId, state: FrameState);

    /// Choose an unpinned frame to evict, or `None` if there is none.
    ///
    /// The frame's tracked state does not change; the buffer pool follows
    /// up with a `Pinned` or `Free` notification for it.
    fn pick_victim(&mut self) -> Option<FrameId>;

    /// Number of frames currently in the unpinned state.
    fn evictable_count(&self) -> usize;
}

/// Which policy a buffer pool is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementPolicy {
    Random,
    Lru,
    Mru,
    Clock,
}

impl ReplacementPolicy {
    pub const ALL: [ReplacementPolicy; 4] = [
        ReplacementPolicy::Random,
        ReplacementPolicy::Lru,
        ReplacementPolicy::Mru,
        ReplacementPolicy::Clock,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReplacementPolicy::Random => "random",
            ReplacementPolicy::Lru => "lru",
            ReplacementPolicy::Mru => "mru",
            ReplacementPolicy::Clock => "clock",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The replacer installed in a buffer pool, selected once at construction.
#[derive(Debug)]
pub enum PolicyReplacer {
    Random(RandomReplacer),
    Lru(LruReplacer),
    Mru(MruReplacer),
    Clock(ClockReplacer),
}

impl PolicyReplacer {
    /// Build the replacer for `policy` over `pool_size` frames, all free.
    pub fn new(policy: ReplacementPolicy, pool_size: usize) -> Self {
        match policy {
            ReplacementPolicy::Random => PolicyReplacer::Random(RandomReplacer::new(pool_size)),
            ReplacementPolicy::Lru => PolicyReplacer::Lru(LruReplacer::new(pool_size)),
            ReplacementPolicy::Mru => PolicyReplacer::Mru(MruReplacer::new(pool_size)),
            ReplacementPolicy::Clock => PolicyReplacer::Clock(ClockReplacer::new(pool_size)),
        }
    }

    pub fn policy(&self) -> ReplacementPolicy {
        match self {
            PolicyReplacer::Random(_) => ReplacementPolicy::Random,
            PolicyReplacer::Lru(_) => ReplacementPolicy::Lru,
            PolicyReplacer::Mru(_) => ReplacementPolicy::Mru,
            PolicyReplacer::Clock(_) => ReplacementPolicy::Clock,
        }
    }
}

impl Replacer for PolicyReplacer {
    fn notify(&mut self, frame_id: FrameId, state: FrameState) {
        match self {
            PolicyReplacer::Random(r) => r.notify(frame_id, state),
            PolicyReplacer::Lru(r) => r.notify(frame_id, state),
            PolicyReplacer::Mru(r) => r.notify(frame_id, state),
            PolicyReplacer::Clock(r) => r.notify(frame_id, state),
        }
    }

    fn pick_victim(&mut self) -> Option<FrameId> {
        match self {
            PolicyReplacer::Random(r) => r.pick_victim(),
            PolicyReplacer::Lru(r) => r.pick_victim(),
            PolicyReplacer::Mru(r) => r.pick_victim(),
            PolicyReplacer::Clock(r) => r.pick_victim(),
        }
    }

    fn evictable_count(&self) -> usize {
        match self {
            PolicyReplacer::Random(r) => r.evictable_count(),
            PolicyReplacer::Lru(r) => r.evictable_count(),
            PolicyReplacer::Mru(r) => r.evictable_count(),
            PolicyReplacer::Clock(r) => r.evictable_count(),
        }
    }
}
