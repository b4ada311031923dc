// Model-based checks of the KeyedContainer contract, run against both engines.
//
// Every operation sequence is replayed on a std HashMap model:
//  - insert returns what the model's insert returns (the displaced value)
//  - remove returns what the model's remove returns, and the key is gone afterwards
//  - len() tracks the model after every step; reserve never shrinks capacity
// At the end every model entry must be found, and entries() must hold exactly the
// model's pairs with no duplicate keys.
//
// A second family slides a fixed-size window of live keys across thousands of fresh
// keys and checks that capacity() stays within a bound derived from the peak len().
use std::collections::{HashMap, HashSet};

use keyed_tables::{BuildIdentityHasher, ChainingMap, KeyedContainer, ProbingMap};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Reserve(usize),
}

fn ops(key: impl Strategy<Value = u16> + Clone) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => key.prop_map(Op::Remove),
        1 => (0_usize..128).prop_map(Op::Reserve),
    ];
    proptest::collection::vec(op, 0..200)
}

// Keys that all share a home slot/bucket until the table passes 64 slots
fn colliding_keys() -> impl Strategy<Value = u16> + Clone {
    (0_u16..32).prop_map(|k| k * 64)
}

fn check_against_model<C>(mut map: C, ops: &[Op]) -> Result<(), TestCaseError>
where
    C: KeyedContainer<u16, u32>,
{
    let mut model = HashMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                prop_assert_eq!(map.insert(k, v), model.insert(k, v));
            }
            Op::Remove(k) => {
                prop_assert_eq!(map.remove(&k), model.remove(&k));
                prop_assert!(map.find(&k) == map.end());
            }
            Op::Reserve(n) => {
                let before = map.capacity();
                map.reserve(n);
                prop_assert!(map.capacity() >= before);
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }

    for (k, v) in &model {
        prop_assert_eq!(map.get(k), Some(v));
    }

    let entries = map.entries();
    prop_assert_eq!(entries.len(), map.len());
    let distinct: HashSet<u16> = entries.iter().map(|(k, _)| *k).collect();
    prop_assert_eq!(distinct.len(), entries.len());
    prop_assert_eq!(entries.into_iter().collect::<HashMap<_, _>>(), model);

    Ok(())
}

// Slides a window of `window` live keys across `rounds` fresh keys: every step inserts
// a new key and removes the one that fell out of the window. Storage must follow the
// peak live count, not the number of operations.
fn check_churn_stays_bounded<C>(
    mut map: C,
    window: u32,
    rounds: u32,
    stride: u32,
) -> Result<(), TestCaseError>
where
    C: KeyedContainer<u32, u32>,
{
    let mut peak = 0_usize;
    for round in 0..rounds {
        let key = round.wrapping_mul(stride);
        prop_assert_eq!(map.insert(key, round), None);
        peak = peak.max(map.len());
        if round >= window {
            let old = (round - window).wrapping_mul(stride);
            prop_assert_eq!(map.remove(&old), Some(round - window));
        }

        let bound = 8 * (peak + 1).next_power_of_two();
        prop_assert!(
            map.capacity() <= bound,
            "capacity {} exceeds {} at round {} (peak len {})",
            map.capacity(),
            bound,
            round,
            peak
        );
    }
    prop_assert!(map.len() <= window as usize);
    Ok(())
}

proptest! {
    #[test]
    fn prop_probing_map_matches_model(ops in ops(0_u16..64)) {
        check_against_model(ProbingMap::<u16, u32>::new(), &ops)?;
    }

    #[test]
    fn prop_chaining_map_matches_model(ops in ops(0_u16..64)) {
        check_against_model(ChainingMap::<u16, u32>::new(), &ops)?;
    }

    #[test]
    fn prop_probing_map_matches_model_under_collisions(ops in ops(colliding_keys())) {
        check_against_model(ProbingMap::<u16, u32, _>::with_hasher(BuildIdentityHasher), &ops)?;
    }

    #[test]
    fn prop_chaining_map_matches_model_under_collisions(ops in ops(colliding_keys())) {
        check_against_model(ChainingMap::<u16, u32, _>::with_hasher(BuildIdentityHasher), &ops)?;
    }

    #[test]
    fn prop_probing_map_churn_stays_bounded(
        window in 1_u32..64,
        rounds in 1_000_u32..5_000,
        stride in 1_u32..1_000,
    ) {
        check_churn_stays_bounded(ProbingMap::<u32, u32>::new(), window, rounds, stride)?;
        check_churn_stays_bounded(
            ProbingMap::<u32, u32, _>::with_hasher(BuildIdentityHasher),
            window,
            rounds,
            stride,
        )?;
    }

    #[test]
    fn prop_chaining_map_churn_stays_bounded(
        window in 1_u32..64,
        rounds in 1_000_u32..5_000,
        stride in 1_u32..1_000,
    ) {
        check_churn_stays_bounded(ChainingMap::<u32, u32>::new(), window, rounds, stride)?;
    }

    #[test]
    fn prop_enumeration_is_stable(pairs in proptest::collection::vec((any::<u16>(), any::<u32>()), 0..100)) {
        let probing: ProbingMap<u16, u32> = pairs.iter().copied().collect();
        prop_assert_eq!(probing.entries(), probing.entries());
        prop_assert_eq!(probing.iter().count(), probing.len());

        let chaining: ChainingMap<u16, u32> = pairs.iter().copied().collect();
        prop_assert_eq!(chaining.entries(), chaining.entries());
        prop_assert_eq!(chaining.iter().count(), chaining.len());
    }
}

fn upsert_keeps_one_entry<C: KeyedContainer<i32, i32> + Default>() {
    let mut map = C::default();
    map.insert(0, 0);
    map.insert(0, 1);
    assert_eq!(map.entries(), vec![(0, 1)]);
    assert_eq!(map.len(), 1);
}

fn distinct_keys_both_stored<C: KeyedContainer<i32, i32> + Default>() {
    let mut map = C::default();
    map.insert(0, 0);
    map.insert(1, 1);

    let mut entries = map.entries();
    entries.sort_unstable();
    assert_eq!(entries, vec![(0, 0), (1, 1)]);
    assert_eq!(map.len(), 2);
}

fn removals_drain_the_map<C: KeyedContainer<i32, i32> + Default>() {
    let mut map = C::default();
    map.insert(0, 0);
    map.insert(1, 1);
    map.insert(2, 2);

    assert_eq!(map.remove(&0), Some(0));
    assert_eq!(map.len(), 2);
    assert_eq!(map.remove(&1), Some(1));
    assert_eq!(map.len(), 1);
    assert_eq!(map.remove(&2), Some(2));
    assert_eq!(map.len(), 0);
    assert!(map.begin() == map.end());
}

fn empty_map_finds_nothing<C: KeyedContainer<i32, i32> + Default>() {
    let mut map = C::default();
    assert!(map.find(&7) == map.end());
    assert!(map.begin() == map.end());
    assert_eq!(map.get(&7), None);
    assert_eq!(map.remove(&7), None);
    assert!(map.is_empty());
    assert!(map.entries().is_empty());
}

#[test]
fn test_probing_map_scenarios() {
    upsert_keeps_one_entry::<ProbingMap<i32, i32>>();
    distinct_keys_both_stored::<ProbingMap<i32, i32>>();
    removals_drain_the_map::<ProbingMap<i32, i32>>();
    empty_map_finds_nothing::<ProbingMap<i32, i32>>();
}

#[test]
fn test_chaining_map_scenarios() {
    upsert_keeps_one_entry::<ChainingMap<i32, i32>>();
    distinct_keys_both_stored::<ChainingMap<i32, i32>>();
    removals_drain_the_map::<ChainingMap<i32, i32>>();
    empty_map_finds_nothing::<ChainingMap<i32, i32>>();
}

#[test]
fn test_for_loop_over_reference() {
    let map: ChainingMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();

    let mut sum = 0;
    for (_, value) in &map {
        sum += value;
    }
    assert_eq!(sum, 6);
}
