#![no_main]

use libfuzzer_sys::fuzz_target;
use rankcache::ds::{RankIndex, RankSlot};

// Fuzz arbitrary operation sequences on RankIndex
//
// Tests random sequences of insert, remove, pop_min, peek_min and clear,
// tracking the slots handed out so removals hit live and stale slots alike.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut index: RankIndex<u8, u32> = RankIndex::new();
    let mut slots: Vec<RankSlot> = Vec::new();

    let mut idx = 0;
    while idx + 2 < data.len() {
        let op = data[idx] % 6;
        let key = data[idx + 1];
        let rank = i64::from(data[idx + 2] as i8);

        match op {
            0 => {
                // insert
                let old_len = index.len();
                let slot = index.insert(rank, key, u32::from(key));
                assert_eq!(slot.rank(), rank);
                assert_eq!(index.len(), old_len + 1);
                assert_eq!(index.get(&slot), Some((&key, &u32::from(key))));
                slots.push(slot);
            }
            1 => {
                // remove (possibly stale slot)
                if !slots.is_empty() {
                    let slot = slots[usize::from(key) % slots.len()];
                    let was_live = index.contains(&slot);
                    let old_len = index.len();
                    let removed = index.remove(slot);
                    assert_eq!(removed.is_some(), was_live);
                    if was_live {
                        assert_eq!(index.len(), old_len - 1);
                    }
                    assert!(!index.contains(&slot));
                }
            }
            2 => {
                // pop_min must return the smallest slot
                let expected = index.peek_min().map(|(slot, _, _)| slot);
                let popped = index.pop_min().map(|(slot, _, _)| slot);
                assert_eq!(popped, expected);
                if let Some(slot) = popped {
                    assert!(index.iter().all(|(other, _, _)| other > slot));
                }
            }
            3 => {
                // peek_min agrees with iteration order
                let first = index.iter().next().map(|(slot, _, _)| slot);
                assert_eq!(index.peek_min().map(|(slot, _, _)| slot), first);
            }
            4 => {
                // clear
                index.clear();
                assert!(index.is_empty());
                assert!(index.peek_min().is_none());
            }
            _ => {
                // len/is_empty consistency
                assert_eq!(index.is_empty(), index.len() == 0);
                assert_eq!(index.iter().len(), index.len());
            }
        }

        index.debug_validate_invariants();
        idx += 3;
    }
});
