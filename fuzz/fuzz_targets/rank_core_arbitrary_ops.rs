#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use rankcache::policy::rank::RankCore;

// Fuzz arbitrary operation sequences on RankCore
//
// First byte picks the capacity; the rest drive insert, remove, pop_lowest
// and clear. Both indexes must agree after every step.
fuzz_target!(|data: &[u8]| {
    let Some((&cap_byte, ops)) = data.split_first() else {
        return;
    };

    let capacity = usize::from(cap_byte % 32);
    let mut core: RankCore<u8, i64> = RankCore::new(capacity);

    for chunk in ops.chunks_exact(3) {
        let key = chunk[1];
        let rank = i64::from(chunk[2] as i8);

        match chunk[0] % 5 {
            0 | 1 => {
                let floor = core.peek_lowest().map(|(_, _, r)| r);
                let was_resident = core.contains(&key);
                let outcome = core.insert(key, Arc::new(rank));

                assert_eq!(outcome.replaced.is_some(), was_resident);
                if let Some((victim, _, victim_rank)) = outcome.evicted {
                    assert!(!was_resident);
                    assert_eq!(Some(victim_rank), floor);
                    assert!(!core.contains(&victim));
                }
                if capacity > 0 {
                    assert_eq!(core.rank_of(&key), Some(rank));
                }
            }
            2 => {
                let removed = core.remove(&key);
                if removed.is_some() {
                    assert!(!core.contains(&key));
                }
            }
            3 => {
                let expected = core.peek_lowest().map(|(k, _, r)| (*k, r));
                let popped = core.pop_lowest().map(|(k, _, r)| (k, r));
                assert_eq!(popped, expected);
            }
            _ => {
                core.clear();
                assert!(core.is_empty());
            }
        }

        assert!(core.len() <= capacity);
        if let Err(err) = core.check_invariants() {
            panic!("{err}");
        }
    }
});
