//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the metrics accounting and the tick diff against
//! a simple model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::{Cache, Item};
use crate::tasks::maintenance::run_tick;

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = u8> {
    0u8..4
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u8 },
    Get { key: String },
    Delete { key: String },
    DeleteAll,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::DeleteAll),
    ]
}

fn apply(cache: &Cache<u8>, model: &mut HashMap<String, u8>, op: CacheOp) -> Option<bool> {
    match op {
        CacheOp::Set { key, value } => {
            cache.set(key.clone(), value);
            model.insert(key, value);
            None
        }
        CacheOp::Get { key } => Some(cache.get(&key).is_some()),
        CacheOp::Delete { key } => {
            cache.delete(&key);
            model.remove(&key);
            None
        }
        CacheOp::DeleteAll => {
            cache.delete_all();
            model.clear();
            None
        }
    }
}

#[derive(Debug, Default)]
struct Seen {
    created: Vec<u8>,
    updated: Vec<u8>,
    deleted: Vec<u8>,
}

fn sorted(mut values: Vec<u8>) -> Vec<u8> {
    values.sort_unstable();
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* sequence of operations, `items` equals the live entry count
    // and `memoryUsageBytes` equals the per-item estimate times that count,
    // right after every call.
    #[test]
    fn prop_metrics_track_store(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache: Cache<u8> = Cache::new();
        let mut model = HashMap::new();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match apply(&cache, &mut model, op) {
                Some(true) => expected_hits += 1,
                Some(false) => expected_misses += 1,
                None => {}
            }

            let metrics = cache.metrics();
            prop_assert_eq!(metrics.items, model.len() as u64);
            prop_assert_eq!(
                metrics.memory_usage_bytes,
                (model.len() * Item::<u8>::estimated_size()) as u64
            );
        }

        let metrics = cache.metrics();
        prop_assert_eq!(metrics.hits, expected_hits);
        prop_assert_eq!(metrics.misses, expected_misses);
    }

    // *For any* two batches of operations separated by a tick, the second
    // tick reports exactly the net change between the two states.
    #[test]
    fn prop_tick_reports_net_change(
        before in prop::collection::vec(cache_op_strategy(), 0..30),
        between in prop::collection::vec(cache_op_strategy(), 0..30),
    ) {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let (c, u, d) = (seen.clone(), seen.clone(), seen.clone());

        let cache: Cache<u8> = Cache::builder()
            .with_partial_eq()
            .on_create(move |values| c.lock().unwrap().created.extend_from_slice(values))
            .on_update(move |values| u.lock().unwrap().updated.extend_from_slice(values))
            .on_delete(move |values| d.lock().unwrap().deleted.extend_from_slice(values))
            .build();

        let mut model = HashMap::new();
        for op in before {
            apply(&cache, &mut model, op);
        }
        run_tick(&cache, |a: &u8, b: &u8| a == b);
        let baseline = model.clone();
        *seen.lock().unwrap() = Seen::default();

        for op in between {
            apply(&cache, &mut model, op);
        }
        run_tick(&cache, |a: &u8, b: &u8| a == b);

        let expected_created: Vec<u8> = model
            .iter()
            .filter(|(k, _)| !baseline.contains_key(*k))
            .map(|(_, v)| *v)
            .collect();
        let expected_updated: Vec<u8> = model
            .iter()
            .filter(|(k, v)| baseline.get(*k).is_some_and(|old| old != *v))
            .map(|(_, v)| *v)
            .collect();
        let expected_deleted: Vec<u8> = baseline
            .iter()
            .filter(|(k, _)| !model.contains_key(*k))
            .map(|(_, v)| *v)
            .collect();

        let seen = seen.lock().unwrap();
        prop_assert_eq!(sorted(seen.created.clone()), sorted(expected_created));
        prop_assert_eq!(sorted(seen.updated.clone()), sorted(expected_updated));
        prop_assert_eq!(sorted(seen.deleted.clone()), sorted(expected_deleted));
    }
}
