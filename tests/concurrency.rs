// ==============================================
// CONCURRENCY TESTS (integration)
// ==============================================
//
// `RetainBestCache` shared across threads: racing misses on one key,
// disjoint-key load, and mixed read/invalidate traffic. Every test ends
// with `check_invariants` so a torn index shows up as a failure.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rankcache::prelude::*;

/// Source whose `fetch` blocks until `parties` callers are inside it.
struct GatedSource {
    gate: Barrier,
    fetches: AtomicUsize,
}

impl GatedSource {
    fn new(parties: usize) -> Self {
        Self {
            gate: Barrier::new(parties),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl DataSource<u64, i64> for GatedSource {
    type Error = Infallible;

    fn fetch(&self, key: &u64) -> Result<Option<i64>, Infallible> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.gate.wait();
        Ok(Some(*key as i64 * 10))
    }
}

mod racing_misses {
    use super::*;

    #[test]
    fn concurrent_misses_converge_on_one_value() {
        let cache: RetainBestCache<u64, i64, GatedSource> =
            RetainBestCache::new(GatedSource::new(2), 4);

        // Both threads pass the read-locked lookup before either can insert,
        // because neither leaves `fetch` until the other has entered it.
        let (a, b) = thread::scope(|s| {
            let first = s.spawn(|| cache.get(&1).unwrap().unwrap());
            let second = s.spawn(|| cache.get(&1).unwrap().unwrap());
            (first.join().unwrap(), second.join().unwrap())
        });

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, 10);
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);

        let snap = cache.metrics();
        assert_eq!(snap.race_resolved, 1);
        assert_eq!(snap.insert_new, 1);
        assert_eq!(snap.get_misses, 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn loser_sees_winner_after_race() {
        let cache: RetainBestCache<u64, i64, GatedSource> =
            RetainBestCache::new(GatedSource::new(4), 8);

        let results: Vec<Arc<i64>> = thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| cache.get(&3).unwrap().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let resident = cache.peek(&3).unwrap();
        for value in &results {
            assert!(Arc::ptr_eq(value, &resident));
        }
        assert_eq!(cache.metrics().race_resolved, 3);
    }
}

mod shared_load {
    use super::*;

    fn ranked_source(keys: u64) -> MapSource<u64, i64> {
        (0..keys).map(|k| (k, (k % 97) as i64)).collect()
    }

    #[test]
    fn disjoint_keys_from_many_threads() {
        let num_threads: u64 = 8;
        let keys_per_thread: u64 = 500;
        let capacity = 256;

        let cache: Arc<RetainBestCache<u64, i64, _>> = Arc::new(RetainBestCache::new(
            ranked_source(num_threads * keys_per_thread),
            capacity,
        ));

        let handles: Vec<_> = (0..num_threads)
            .map(|thread_id| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let base = thread_id * keys_per_thread;
                    for key in base..base + keys_per_thread {
                        let value = cache.get(&key).unwrap().unwrap();
                        assert_eq!(*value, (key % 97) as i64);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), capacity);
        let snap = cache.metrics();
        assert_eq!(snap.get_calls, num_threads * keys_per_thread);
        assert_eq!(snap.insert_new - snap.evicted_entries, capacity as u64);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn mixed_reads_inserts_and_invalidations() {
        let cache: Arc<RetainBestCache<u64, i64, _>> =
            Arc::new(RetainBestCache::new(ranked_source(64), 16));
        let operations = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..6u64)
            .map(|thread_id| {
                let cache = Arc::clone(&cache);
                let operations = Arc::clone(&operations);
                thread::spawn(move || {
                    for i in 0..400u64 {
                        let key = (i * 7 + thread_id) % 64;
                        match i % 5 {
                            0 => {
                                cache.invalidate(&key);
                            },
                            1 => {
                                cache.insert(key, i as i64);
                            },
                            2 => {
                                let _ = cache.lowest();
                            },
                            _ => {
                                assert!(cache.get(&key).unwrap().is_some());
                            },
                        }
                        operations.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(operations.load(Ordering::Relaxed), 6 * 400);
        assert!(cache.len() <= 16);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn cache_is_send_and_sync() {
        fn assert_concurrent<C: ConcurrentCache>() {}
        assert_concurrent::<RetainBestCache<u64, i64, MapSource<u64, i64>>>();
        assert_concurrent::<RetainBestCache<String, Ranked<Vec<u8>>, GatedSource>>();
    }
}
