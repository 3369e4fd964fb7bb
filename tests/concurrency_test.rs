//! Concurrency tests for the tracker tree
//!
//! Verifies that increments are never lost under thread interleaving and
//! that first-reference races for an unseen key resolve to exactly one
//! tracker instance.

use std::sync::Arc;
use std::thread;
use usage_tracker::{Tracker, TrackerGroup};

#[test]
fn test_concurrent_increments_are_never_lost() {
    let group: TrackerGroup<String> = TrackerGroup::new();
    let tracker = group.tracker("help".to_string()).unwrap();

    let threads = 8;
    let increments_per_thread = 10_000u64;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for _ in 0..increments_per_thread {
                    tracker.increment();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tracker.total_usages(), threads * increments_per_thread);
    assert_eq!(tracker.second_usages(), threads * increments_per_thread);
}

#[test]
fn test_concurrent_mixed_amounts_sum_exactly() {
    let group: TrackerGroup<String> = TrackerGroup::new();
    let tracker = group.tracker("uploads".to_string()).unwrap();

    let handles: Vec<_> = (1..=6u64)
        .map(|amount| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    tracker.increment_by(amount);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // 1000 * (1+2+...+6)
    assert_eq!(tracker.total_usages(), 1_000 * 21);
}

#[test]
fn test_concurrent_child_creation_yields_one_instance() {
    let group: TrackerGroup<String> = TrackerGroup::new();
    let parent = group.tracker("games".to_string()).unwrap();

    let threads = 16;
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let parent = Arc::clone(&parent);
            thread::spawn(move || parent.child("trivia".to_string(), true).unwrap())
        })
        .collect();

    let children: Vec<Arc<Tracker<String>>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    for child in &children[1..] {
        assert!(Arc::ptr_eq(&children[0], child));
    }
    assert_eq!(parent.child_count(), 1);
}

#[test]
fn test_concurrent_root_creation_yields_one_instance() {
    let group = Arc::new(TrackerGroup::<String>::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let group = Arc::clone(&group);
            thread::spawn(move || group.tracker("info".to_string()).unwrap())
        })
        .collect();

    let roots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for root in &roots[1..] {
        assert!(Arc::ptr_eq(&roots[0], root));
    }
    assert_eq!(group.root_count(), 1);
}

#[test]
fn test_recursive_increments_from_many_threads_reach_the_root() {
    let group: TrackerGroup<String> = TrackerGroup::new();
    let root = group.tracker("commands".to_string()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                let child = root.child(format!("cmd-{}", i), true).unwrap();
                for _ in 0..5_000 {
                    child.increment();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Every child increment propagated to the root exactly once.
    assert_eq!(root.total_usages(), 4 * 5_000);
    assert_eq!(root.child_count(), 4);
}

#[test]
fn test_increments_racing_a_rollup_land_in_exactly_one_window() {
    let group = Arc::new(TrackerGroup::<String>::new());
    let tracker = group.tracker("help".to_string()).unwrap();

    let writer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for _ in 0..50_000 {
                tracker.increment();
            }
        })
    };

    // The single scheduler rolls while the writer hammers the counter.
    // 50 racing rolls plus the final one stay within the 60-slot minute
    // buffer, so no bucket is evicted.
    let scheduler = {
        let group = Arc::clone(&group);
        thread::spawn(move || {
            for _ in 0..50 {
                group.roll_second();
                thread::yield_now();
            }
        })
    };

    writer.join().unwrap();
    scheduler.join().unwrap();
    group.roll_second();

    // Every increment landed in exactly one bucket: nothing double-counted,
    // nothing lost.
    assert_eq!(tracker.total_usages(), 50_000);
    assert_eq!(tracker.second_usages(), 0);
    assert_eq!(tracker.minute_buffer().sum(), 50_000);
}
