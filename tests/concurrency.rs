//! Concurrent queries against a shared index.

mod common;

use std::{
    collections::HashSet,
    sync::{Arc, Barrier},
    thread,
};

use annodex::prelude::*;
use common::{fixture, FullIndex};
use rayon::prelude::*;

#[test]
fn threads_resolve_the_same_names() {
    let bytes = fixture(1234, 80);
    let index = Arc::new(SparseIndex::decode(&bytes).unwrap());
    let full = FullIndex::decode(&bytes).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                index
                    .known_classes()
                    .iter()
                    .map(|class| {
                        let mut annotations: Vec<String> = class
                            .method_annotations()
                            .unwrap()
                            .into_iter()
                            .map(|n| n.to_string())
                            .collect();
                        annotations.sort();
                        (class.super_name().unwrap().to_string(), annotations)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }

    for ((super_name, annotations), class) in results[0].iter().zip(&full.classes) {
        assert_eq!(super_name, &class.super_name);
        let expected: HashSet<&String> = class.method_annotations.iter().collect();
        assert_eq!(annotations.len(), expected.len());
        assert!(annotations.iter().all(|a| expected.contains(a)));
    }
}

#[test]
fn parallel_iteration_matches_sequential() {
    let bytes = fixture(777, 200);
    let index = SparseIndex::decode(&bytes).unwrap();

    let sequential: Vec<(u32, usize)> = index
        .known_classes()
        .iter()
        .map(|class| (class.rid(), class.field_annotations().unwrap().len()))
        .collect();

    let mut parallel: Vec<(u32, usize)> = index
        .par_known_classes()
        .map(|class| (class.rid(), class.field_annotations().unwrap().len()))
        .collect();
    parallel.sort_unstable();

    assert_eq!(parallel, sequential);
}

#[test]
fn memo_is_filled_once() {
    let bytes = fixture(31, 60);
    let index = SparseIndex::decode(&bytes).unwrap();
    let pool_size = index.name_pool().len();

    index.par_known_classes().for_each(|class| {
        let _ = class.interface_names().unwrap();
        let _ = class.fields().unwrap();
        let _ = class.methods().unwrap();
        let _ = class.class_annotations().unwrap();
        let _ = class.field_annotations().unwrap();
        let _ = class.method_annotations().unwrap();
    });

    assert!(index.name_pool().resolved_count() <= pool_size);

    // Every id reachable from the queries above now answers from the memo
    let before = index.name_pool().resolved_count();
    for class in index.known_classes() {
        let _ = class.method_annotations().unwrap();
    }
    assert_eq!(index.name_pool().resolved_count(), before);
}
