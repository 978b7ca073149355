//! Tests de propiedades del store ordenado y acotado
//! tests/store_properties.rs
//!
//! Cada secuencia aleatoria de operaciones se aplica al store y a un modelo
//! de referencia (un `Vec` con el orden esperado); después de cada paso ambos
//! deben coincidir.

use apibin::conditional::{Conditionals, Outcome, Safety};
use apibin::fingerprint::fingerprint;
use apibin::store::{OrderedBoundedStore, SharedStore};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::thread;

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u32),
    Delete(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..12, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        1 => (0u8..12).prop_map(Op::Delete),
    ]
}

fn key(k: u8) -> String {
    format!("k{}", k)
}

fn payload(v: u32) -> Value {
    json!({ "title": format!("book {}", v), "ratings": v })
}

/// Modelo: orden de inserción explícito con desalojo por el frente
fn apply_model(model: &mut Vec<String>, op: &Op, cap: usize) -> Vec<String> {
    match op {
        Op::Put(k, _) => {
            let k = key(*k);
            if !model.contains(&k) {
                model.push(k);
            }
            let overflow = model.len().saturating_sub(cap);
            model.drain(..overflow).collect()
        }
        Op::Delete(k) => {
            let k = key(*k);
            model.retain(|existing| existing != &k);
            Vec::new()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// El store nunca supera el tope y su orden coincide con el modelo
    #[test]
    fn prop_store_matches_model(cap in 0usize..6, ops in prop::collection::vec(arb_op(), 0..60)) {
        let mut store = OrderedBoundedStore::new(cap);
        let mut model: Vec<String> = Vec::new();

        for op in &ops {
            let expected_evicted = apply_model(&mut model, op, cap);
            let evicted = match op {
                Op::Put(k, v) => store.put(&key(*k), payload(*v)),
                Op::Delete(k) => {
                    store.delete(&key(*k));
                    Vec::new()
                }
            };

            prop_assert!(store.len() <= cap);
            prop_assert_eq!(evicted, expected_evicted);
            prop_assert_eq!(store.keys(), model.clone());
        }
    }

    /// `list()` y `get()` describen el mismo contenido
    #[test]
    fn prop_list_consistent_with_get(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut store = OrderedBoundedStore::new(5);
        for op in &ops {
            match op {
                Op::Put(k, v) => { store.put(&key(*k), payload(*v)); }
                Op::Delete(k) => { store.delete(&key(*k)); }
            }
        }

        let list = store.list().unwrap();
        prop_assert_eq!(list.len(), store.len());
        for summary in list {
            let entry = store.get(&summary.key).unwrap();
            prop_assert_eq!(summary.fingerprint, fingerprint(&entry.payload).unwrap());
            prop_assert_eq!(summary.modified_at, entry.modified_at);
        }
    }

    /// Borrar dos veces equivale a borrar una
    #[test]
    fn prop_delete_idempotent(keys in prop::collection::vec(0u8..12, 1..12), target in 0u8..12) {
        let mut once = OrderedBoundedStore::new(20);
        for k in &keys {
            once.put(&key(*k), payload(u32::from(*k)));
        }
        let mut twice = once.clone();

        once.delete(&key(target));
        twice.delete(&key(target));
        twice.delete(&key(target));

        prop_assert_eq!(once.keys(), twice.keys());
    }

    /// Después de `put(k, v)` el fingerprint es el de `v`
    #[test]
    fn prop_put_then_get_fingerprint(k in 0u8..12, v in any::<u32>()) {
        let mut store = OrderedBoundedStore::new(20);
        store.put(&key(k), payload(v));

        let entry = store.get(&key(k)).unwrap();
        prop_assert_eq!(entry.fingerprint().unwrap(), fingerprint(&payload(v)).unwrap());
    }

    /// Sin condiciones siempre se procede; con el ETag actual en
    /// If-None-Match nunca
    #[test]
    fn prop_evaluate_basics(v in any::<u32>(), other in any::<u32>(), secs in 0i64..2_000_000_000) {
        prop_assume!(v != other);
        let etag = fingerprint(&payload(v)).unwrap();
        let stale = fingerprint(&payload(other)).unwrap();
        let modified = Utc.timestamp_opt(secs, 0).unwrap();

        let outcome = Conditionals::default().evaluate(&etag, modified, Safety::Write);
        prop_assert_eq!(outcome, Outcome::Proceed);

        let cond = Conditionals { if_none_match: vec![etag.clone()], ..Default::default() };
        prop_assert_eq!(cond.evaluate(&etag, modified, Safety::Read), Outcome::NotModified);

        let cond = Conditionals { if_match: vec![stale], ..Default::default() };
        prop_assert_eq!(cond.evaluate(&etag, modified, Safety::Write), Outcome::PreconditionFailed);
    }
}

#[test]
fn test_baseline_then_put_keeps_order() {
    let mut store = OrderedBoundedStore::new(20);
    store.reload(vec![(key(1), payload(1)), (key(0), payload(0))], Utc::now());

    store.put("c", payload(2));

    assert_eq!(store.keys(), vec!["k0", "k1", "c"]);
}

#[test]
fn test_capacity_scenario() {
    let baseline: Vec<(String, Value)> =
        (0..20).map(|i| (format!("k{:02}", i), payload(i))).collect();
    let mut store = OrderedBoundedStore::new(20);
    store.reload(baseline, Utc::now());

    store.put("k20", payload(20));

    assert!(store.get("k00").is_none());
    assert_eq!(store.len(), 20);
    assert_eq!(store.keys().last().map(String::as_str), Some("k20"));
}

#[test]
fn test_concurrent_puts_leave_all_keys() {
    let store = SharedStore::new(1000);
    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..per_thread {
                    store.write().put(&format!("t{}-{}", t, i), payload(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let keys: HashSet<String> = store.read().keys().into_iter().collect();
    assert_eq!(keys.len(), threads * per_thread as usize);
}
