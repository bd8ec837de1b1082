// ==============================================
// CROSS-STRUCTURE INVARIANT TESTS (integration)
// ==============================================
//
// Drives all four counter structures through the same randomized workloads
// and checks them against a std::collections model plus their own structural
// invariant checkers. These span multiple modules and belong here rather
// than in any single source file.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tallykit::map::{
    AvlCounterMap, ChainedCounterMap, OpenAddressingCounterMap, RedBlackCounterMap,
};
use tallykit::traits::CounterMap;

const SEED: u64 = 0x7a11_71e5;
const OPS: usize = 5_000;
const KEY_SPACE: u64 = 600;

/// Random increment/remove/lookup workload checked op-by-op against a
/// BTreeMap model. `check` runs the structure's own invariant verifier
/// every 64 operations.
fn model_check<M, C>(mut map: M, check: C)
where
    M: CounterMap<u64>,
    C: Fn(&M),
{
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut model: BTreeMap<u64, i64> = BTreeMap::new();

    for op in 0..OPS {
        let key = rng.gen_range(0..KEY_SPACE);
        match rng.gen_range(0..10) {
            // Increments dominate, matching the tally workload shape.
            0..=6 => {
                *map.counter(key) += 1;
                *model.entry(key).or_insert(0) += 1;
            }
            7 => {
                assert_eq!(map.remove(&key), model.remove(&key).is_some());
            }
            _ => {
                assert_eq!(map.get(&key), model.get(&key));
            }
        }
        assert_eq!(map.len(), model.len());
        if op % 64 == 0 {
            check(&map);
        }
    }

    // Full-state comparison at the end.
    for (key, count) in &model {
        assert_eq!(map.get(key), Some(count));
    }
    let mut exported = map.by_frequency();
    exported.sort_unstable();
    let mut expected: Vec<(u64, i64)> = model.into_iter().collect();
    expected.sort_unstable();
    assert_eq!(exported, expected);
}

mod avl {
    use super::*;

    #[test]
    fn random_workload_matches_model() {
        model_check(AvlCounterMap::new(), |m| m.check_invariants().unwrap());
    }
}

mod red_black {
    use super::*;

    #[test]
    fn random_workload_matches_model() {
        model_check(RedBlackCounterMap::new(), |m| m.check_invariants().unwrap());
    }
}

mod chained {
    use super::*;

    #[test]
    fn random_workload_matches_model() {
        model_check(ChainedCounterMap::new(), |m| m.check_invariants().unwrap());
    }

    #[test]
    fn random_workload_from_tiny_table() {
        model_check(ChainedCounterMap::with_capacity(3), |m| {
            m.check_invariants().unwrap()
        });
    }
}

mod open_addressing {
    use super::*;

    #[test]
    fn random_workload_matches_model() {
        model_check(OpenAddressingCounterMap::new(), |m| {
            m.check_invariants().unwrap()
        });
    }

    #[test]
    fn random_workload_from_tiny_table() {
        // Heavy churn in a table that starts at 3 slots exercises tombstone
        // reuse and repeated growth.
        model_check(OpenAddressingCounterMap::with_capacity(3), |m| {
            m.check_invariants().unwrap()
        });
    }
}

// ==============================================
// Shared Behavioral Contracts
// ==============================================

mod contracts {
    use super::*;

    fn counters_agree<M: CounterMap<String>>(mut map: M) {
        let text = ["the", "cat", "the", "hat", "the"];
        for word in text {
            *map.counter(word.to_string()) += 1;
        }
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"the".to_string()), Some(&3));
        let ranked = map.by_frequency();
        assert_eq!(ranked[0], ("the".to_string(), 3));
        // Ties may appear in either order.
        assert_eq!(ranked[1].1, 1);
        assert_eq!(ranked[2].1, 1);
    }

    #[test]
    fn all_structures_tally_identically() {
        counters_agree(AvlCounterMap::new());
        counters_agree(RedBlackCounterMap::new());
        counters_agree(ChainedCounterMap::new());
        counters_agree(OpenAddressingCounterMap::new());
    }

    fn empty_map_boundary_ops<M: CounterMap<u64>>(mut map: M) {
        assert!(map.is_empty());
        assert_eq!(map.get(&1), None);
        assert!(!map.remove(&1));
        assert!(map.by_frequency().is_empty());
        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn empty_maps_handle_boundary_ops() {
        empty_map_boundary_ops(AvlCounterMap::new());
        empty_map_boundary_ops(RedBlackCounterMap::new());
        empty_map_boundary_ops(ChainedCounterMap::new());
        empty_map_boundary_ops(OpenAddressingCounterMap::new());
    }
}
