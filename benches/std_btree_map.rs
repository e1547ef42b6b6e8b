/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

#![cfg_attr(feature = "fatal-warnings", deny(warnings))]
#![allow(clippy::cast_possible_wrap)]

// Baseline for `ordered_map.rs`: the same workloads against the standard library's B-tree.

use criterion::{criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;
use std::hint::black_box;

fn build(limit: usize) -> BTreeMap<usize, isize> {
    let mut map = BTreeMap::new();

    for i in 0..limit {
        map.insert(i, -(i as isize));
    }

    map
}

fn std_btree_map_insert(c: &mut Criterion) {
    let limit = 100_000;

    c.bench_function("std b-tree map insert", move |b| {
        b.iter(|| build(limit));
    });
}

fn std_btree_map_insert_existing(c: &mut Criterion) {
    let limit = 100_000;
    let mut map = build(limit);

    c.bench_function("std b-tree map insert existing", move |b| {
        b.iter(|| {
            for i in 0..limit {
                black_box(map.insert(i, i as isize));
            }
        });
    });
}

fn std_btree_map_remove(c: &mut Criterion) {
    let limit = 100_000;

    c.bench_function("std b-tree map remove", move |b| {
        b.iter_with_setup(
            || build(limit),
            |mut map| {
                for i in 0..limit {
                    black_box(map.remove(&i));
                }

                map
            },
        );
    });
}

fn std_btree_map_get(c: &mut Criterion) {
    let limit = 100_000;
    let map = build(limit);

    c.bench_function("std b-tree map get", move |b| {
        b.iter(|| {
            for i in 0..limit {
                black_box(map.get(&i));
            }
        });
    });
}

fn std_btree_map_get_mut(c: &mut Criterion) {
    let limit = 100_000;
    let mut map = build(limit);

    c.bench_function("std b-tree map get mut", move |b| {
        b.iter(|| {
            for i in 0..limit {
                if let Some(v) = map.get_mut(&i) {
                    *black_box(v) = 0;
                }
            }
        });
    });
}

criterion_group!(
    benches,
    std_btree_map_insert,
    std_btree_map_insert_existing,
    std_btree_map_remove,
    std_btree_map_get,
    std_btree_map_get_mut
);
criterion_main!(benches);
