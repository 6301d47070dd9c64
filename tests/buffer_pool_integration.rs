//! Integration tests for the buffer pool over the file-backed store.
//!
//! These tests verify cross-component behavior that unit tests don't cover.

use pagecache::storage::DiskManager;
use pagecache::{BufferPoolConfig, BufferPoolManager, PageId, ReplacementPolicy, UnpinMode};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn create_bpm(
    pool_size: usize,
    policy: ReplacementPolicy,
) -> (BufferPoolManager, tempfile::TempDir) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();
    let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
    (BufferPoolManager::new(pool_size, policy, dm), dir)
}

/// Data persists across many eviction cycles.
#[test]
fn test_data_persistence_across_evictions() {
    for policy in ReplacementPolicy::ALL {
        let (bpm, _dir) = create_bpm(2, policy);

        let mut page_ids = vec![];
        for i in 0u8..8 {
            let h = bpm.new_page().unwrap();
            {
                let mut page = bpm.page_mut(&h).unwrap();
                page.as_mut_slice()[0] = i;
                page.as_mut_slice()[1] = i.wrapping_mul(3);
            }
            bpm.unpin_page(&h, UnpinMode::Dirty).unwrap();
            page_ids.push(h.page_id());
        }

        for (i, &pid) in page_ids.iter().enumerate() {
            let guard = bpm.fetch_page_read(pid).unwrap();
            assert_eq!(guard.as_slice()[0], i as u8, "{policy}");
            assert_eq!(guard.as_slice()[1], (i as u8).wrapping_mul(3));
        }

        let stats = bpm.stats().snapshot();
        assert!(stats.evictions >= 6);
        assert!(stats.pages_written >= 6);
    }
}

/// Flushed pages are visible to a new pool over the same file.
#[test]
fn test_flush_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let data = b"persistent!";

    let pid;

    {
        let dm = DiskManager::create(&path).unwrap();
        let bpm = BufferPoolManager::with_config(BufferPoolConfig::default(), dm);

        let h = bpm.new_page().unwrap();
        pid = h.page_id();
        bpm.page_mut(&h).unwrap().as_mut_slice()[..data.len()].copy_from_slice(data);
        bpm.unpin_page(&h, UnpinMode::Dirty).unwrap();

        bpm.flush_all_pages().unwrap();
        assert!(!bpm.is_dirty(pid));
    }

    {
        let dm = DiskManager::open(&path).unwrap();
        let bpm = BufferPoolManager::with_config(BufferPoolConfig::default(), dm);

        let guard = bpm.fetch_page_read(pid).unwrap();
        assert_eq!(&guard.as_slice()[..data.len()], data);
    }
}

/// Freed pages are deallocated on disk and their number is reused.
#[test]
fn test_free_page_deallocates_on_disk() {
    let (bpm, _dir) = create_bpm(4, ReplacementPolicy::Clock);

    let a = bpm.new_page().unwrap();
    let b = bpm.new_page().unwrap();
    bpm.free_page(&a).unwrap();
    assert_eq!(bpm.block_store().free_page_count(), 1);

    assert!(bpm.pin_page(a.page_id()).is_err());

    let c = bpm.new_page().unwrap();
    assert_eq!(c.page_id(), a.page_id());
    assert_eq!(bpm.block_store().page_count(), 2);
    assert_ne!(b.page_id(), c.page_id());
}

/// Flushing is idempotent and leaves pins alone.
#[test]
fn test_flush_page_idempotent() {
    let (bpm, _dir) = create_bpm(4, ReplacementPolicy::Lru);

    let h = bpm.new_page().unwrap();
    assert!(bpm.flush_page(&h).unwrap());
    assert!(bpm.flush_page(&h).unwrap());

    assert_eq!(bpm.stats().snapshot().pages_written, 1);
    assert_eq!(bpm.pin_count(h.page_id()), Some(1));
    assert_eq!(bpm.page_count(), 1);

    // Unknown pages are simply not resident
    assert!(bpm.flush_page_id(PageId::new(77)).unwrap());
}

/// Concurrent writers to different pages.
#[test]
fn test_concurrent_writers() {
    let (bpm, _dir) = create_bpm(10, ReplacementPolicy::Clock);
    let bpm = Arc::new(bpm);

    let page_ids: Vec<PageId> = (0..5)
        .map(|_| {
            let h = bpm.new_page().unwrap();
            bpm.unpin_page(&h, UnpinMode::Dirty).unwrap();
            h.page_id()
        })
        .collect();

    let mut handles = vec![];

    for (i, pid) in page_ids.iter().enumerate() {
        let bpm_clone = Arc::clone(&bpm);
        let pid = *pid;

        handles.push(thread::spawn(move || {
            for j in 0..50 {
                let mut guard = bpm_clone.fetch_page_write(pid).unwrap();
                guard.as_mut_slice()[0] = ((i * 50 + j) % 256) as u8;
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    for (i, &pid) in page_ids.iter().enumerate() {
        let guard = bpm.fetch_page_read(pid).unwrap();
        assert_eq!(guard.as_slice()[0], ((i * 50 + 49) % 256) as u8);
    }
    assert_eq!(bpm.pinned_count(), 0);
}

/// A checkpoint runs while another thread holds a page for writing and
/// goes on to pin a second page.
#[test]
fn test_flush_all_while_writer_holds_page() {
    let (bpm, _dir) = create_bpm(4, ReplacementPolicy::Lru);
    let bpm = Arc::new(bpm);

    let held = bpm.new_page().unwrap();
    bpm.unpin_page(&held, UnpinMode::Dirty).unwrap();
    let other = bpm.new_page().unwrap();
    bpm.unpin_page(&other, UnpinMode::Dirty).unwrap();
    let (held, other) = (held.page_id(), other.page_id());

    let (locked_tx, locked_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();

    let writer = {
        let bpm = Arc::clone(&bpm);
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            let mut guard = bpm.fetch_page_write(held).unwrap();
            guard.as_mut_slice()[0] = 0x77;
            locked_tx.send(()).unwrap();

            // Give the flusher time to take the pool lock first
            thread::sleep(Duration::from_millis(100));
            let second = bpm.fetch_page_read(other).map(|g| g.as_slice()[0]);
            drop(guard);
            done_tx.send(("writer", second.is_ok())).unwrap();
        })
    };

    locked_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let flusher = {
        let bpm = Arc::clone(&bpm);
        thread::spawn(move || {
            let result = bpm.flush_all_pages();
            done_tx.send(("flusher", result.is_ok())).unwrap();
        })
    };

    for _ in 0..2 {
        let (who, ok) = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("pool lock and page lock deadlocked");
        assert!(ok, "{who} failed");
    }
    writer.join().unwrap();
    flusher.join().unwrap();

    // The guard is gone, so nothing is skipped now
    assert_eq!(bpm.flush_all_pages().unwrap(), 0);
    assert!(!bpm.is_dirty(held));
    assert_eq!(bpm.fetch_page_read(held).unwrap().as_slice()[0], 0x77);
    assert_eq!(bpm.pinned_count(), 0);
}

/// Threads contending for a pool smaller than their working set.
#[test]
fn test_concurrent_eviction_pressure() {
    let (bpm, _dir) = create_bpm(4, ReplacementPolicy::Lru);
    let bpm = Arc::new(bpm);

    let page_ids: Vec<PageId> = (0..16)
        .map(|i| {
            let h = bpm.new_page().unwrap();
            bpm.page_mut(&h).unwrap().as_mut_slice()[0] = i as u8;
            bpm.unpin_page(&h, UnpinMode::Dirty).unwrap();
            h.page_id()
        })
        .collect();
    let page_ids = Arc::new(page_ids);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let bpm = Arc::clone(&bpm);
            let page_ids = Arc::clone(&page_ids);
            thread::spawn(move || {
                for round in 0..40 {
                    let idx = (t * 7 + round) % page_ids.len();
                    let guard = bpm.fetch_page_read(page_ids[idx]).unwrap();
                    assert_eq!(guard.as_slice()[0], idx as u8);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(bpm.pinned_count(), 0);
    assert_eq!(bpm.unpinned_count(), 4);
}

/// Stats track hits, misses and evictions.
#[test]
fn test_stats_accuracy() {
    let (bpm, _dir) = create_bpm(2, ReplacementPolicy::Mru);

    let h = bpm.new_page().unwrap();
    bpm.unpin_page(&h, UnpinMode::Dirty).unwrap();

    for _ in 0..5 {
        let _ = bpm.fetch_page_read(h.page_id()).unwrap();
    }

    let stats = bpm.stats().snapshot();
    assert_eq!(stats.cache_hits, 5);
    assert_eq!(stats.pages_allocated, 1);

    for _ in 0..2 {
        let h = bpm.new_page().unwrap();
        bpm.unpin_page(&h, UnpinMode::Clean).unwrap();
    }

    let stats = bpm.stats().snapshot();
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.pages_written, 1);
}
