//! Fan-out throughput benchmarks.
//!
//! Measures policy evaluation and invalid-performance fan-out across
//! network sizes.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dmm_core::{Model, Network, Node, PerformanceReport, TracingSink, ValidityPolicy};

fn network_of(size: usize) -> Network {
    let model = Model::new("bench-model", 1);
    let mut network = Network::builder()
        .nodes((0..size).map(|i| Node::new(format!("node{}", i), model.clone())))
        .sink(Arc::new(TracingSink))
        .build()
        .unwrap();
    network.start_monitoring(&model);
    network
}

fn bench_policy(c: &mut Criterion) {
    let policy = ValidityPolicy::default();
    let report = PerformanceReport::new(0.95, 0.05);

    c.bench_function("policy_is_valid", |b| {
        b.iter(|| black_box(policy.is_valid(black_box(&report))))
    });
}

fn bench_notify(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify_invalid_performance");

    for size in [3usize, 64, 1024] {
        let network = network_of(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| black_box(network.notify_invalid_performance("bench-model")))
        });
    }

    group.finish();
}

fn bench_validate_rejected(c: &mut Criterion) {
    let network = network_of(64);
    let report = PerformanceReport::new(0.5, 0.2);

    c.bench_function("validate_rejected_64", |b| {
        b.iter(|| black_box(network.validate_performance("node0", &report).unwrap()))
    });
}

criterion_group!(benches, bench_policy, bench_notify, bench_validate_rejected);
criterion_main!(benches);
