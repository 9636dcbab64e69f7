use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rankcache::cache::RetainBestCache;
use rankcache::source::FnSource;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    // Slow upstream: every key exists and ranks by its own value.
    let source = FnSource::new(|key: &u64| -> Result<Option<i64>, String> {
        thread::sleep(Duration::from_millis(5));
        Ok(Some(*key as i64))
    });
    let cache: Arc<RetainBestCache<u64, i64, _>> = Arc::new(RetainBestCache::new(source, 4));

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for key in [worker, worker + 4, 1] {
                    cache.get(&key).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snap = cache.metrics();
    println!("resident: {}/{}", snap.cache_len, snap.capacity);
    println!("get calls: {}", snap.get_calls);
    println!("evictions: {}", snap.evicted_entries);
    println!("races resolved: {}", snap.race_resolved);
    cache.check_invariants().unwrap();
}

// Expected output (counts after "get calls" vary with scheduling):
// resident: 4/4
// get calls: 12
// evictions: ...
// races resolved: ...
//
// Explanation: four workers share one cache of capacity 4. Key 1 is requested
// by every worker; when several miss it at once, all of them fetch but only
// the first result is kept and the rest are handed that same value. Set
// RUST_LOG=trace to see individual hits.
