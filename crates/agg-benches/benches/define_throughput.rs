// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::expect_used)]
//! Benchmark: row definition throughput
//!
//! Defines `n` dimensions, then `n` single-dimension variables, then `n` child
//! containers under one root. Stores start at their default capacity so the
//! measurement includes every doubling step.
//!
//! Throughput "elements" are definitions (`n` per group).
use agg_catalog::{Catalog, ContainerId, DimensionId};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

const SIZES: [usize; 3] = [100, 1_000, 10_000];

fn rooted() -> (Catalog, ContainerId) {
    let mut catalog = Catalog::new();
    let root = catalog.create_root("bench.nca").expect("create root");
    (catalog, root)
}

fn bench_define(c: &mut Criterion) {
    let mut group = c.benchmark_group("define_throughput");
    group
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(6));

    for &n in &SIZES {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("dimensions", n), &n, |b, &n| {
            b.iter_batched(
                rooted,
                |(mut catalog, root)| {
                    for i in 0..n {
                        black_box(catalog.define_dimension(root, "d", i).expect("dimension"));
                    }
                    catalog
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("variables", n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let (mut catalog, root) = rooted();
                    let dim = catalog.define_dimension(root, "x", 8).expect("dimension");
                    (catalog, root, dim)
                },
                |(mut catalog, root, dim): (Catalog, ContainerId, DimensionId)| {
                    for _ in 0..n {
                        black_box(catalog.define_variable(root, "v", &[dim]).expect("variable"));
                    }
                    catalog
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("containers", n), &n, |b, &n| {
            b.iter_batched(
                rooted,
                |(mut catalog, root)| {
                    for _ in 0..n {
                        black_box(catalog.define_container(root, "c").expect("container"));
                    }
                    catalog
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_define);
criterion_main!(benches);
