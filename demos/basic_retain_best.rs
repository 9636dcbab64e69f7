use rankcache::cache::RetainBestCache;
use rankcache::source::{MapSource, Ranked};

fn main() {
    let source = MapSource::new();
    source.insert("a", Ranked::new("alpha", 10));
    source.insert("b", Ranked::new("beta", 5));
    source.insert("c", Ranked::new("gamma", 7));

    let cache: RetainBestCache<&str, Ranked<&str>, _> = RetainBestCache::new(source, 2);

    cache.get(&"a").unwrap();
    cache.get(&"b").unwrap();
    cache.get(&"c").unwrap();

    println!("contains a? {}", cache.contains(&"a"));
    println!("contains b? {}", cache.contains(&"b"));
    println!("contains c? {}", cache.contains(&"c"));
    println!("missing key: {:?}", cache.get(&"zzz").unwrap());
}

// Expected output:
// contains a? true
// contains b? false
// contains c? true
// missing key: None
//
// Explanation: capacity=2; when "c" arrives, "b" holds the lowest rank (5) and
// is evicted. Unknown keys come back as None and are not cached.
