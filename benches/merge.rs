//! Benchmarks for blocklist parsing and merging.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use unbound_dot::aggregator::{merge_hostnames, merge_ips};
use unbound_dot::fetcher::{parse_list, LineSet};

/// Generate distinct hostnames spread over a few parent domains
fn generate_hostnames(count: usize) -> LineSet {
    (0..count)
        .map(|i| format!("host{}.zone{}.example.com", i, i % 64))
        .collect()
}

/// Generate IPv4 addresses and /24 networks
fn generate_ips(count: usize) -> LineSet {
    (0..count)
        .map(|i| {
            let a = (i % 256) as u8;
            let b = ((i / 256) % 256) as u8;
            let c = ((i / 65536) % 256) as u8;
            if i % 4 == 0 {
                format!("{}.{}.{}.0/24", a, b, c)
            } else {
                format!("{}.{}.{}.1", a, b, c)
            }
        })
        .collect()
}

fn bench_merge_hostnames(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_hostnames");

    let blocked: Vec<String> = (0..100).map(|i| format!("user{}.net", i)).collect();
    let allowed: Vec<String> = (0..100).map(|i| format!("zone{}.example.com", i)).collect();

    for size in [1000, 10000, 100000] {
        let hostnames = generate_hostnames(size);
        group.bench_with_input(BenchmarkId::new("lines", size), &hostnames, |b, hostnames| {
            b.iter(|| black_box(merge_hostnames(hostnames.clone(), &blocked, &allowed)));
        });
    }

    group.finish();
}

fn bench_merge_ips(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_ips");

    let blocked: Vec<String> = (0..100).map(|i| format!("10.0.{}.0/24", i)).collect();

    for size in [1000, 10000, 100000] {
        let ips = generate_ips(size);
        group.bench_with_input(BenchmarkId::new("lines", size), &ips, |b, ips| {
            b.iter(|| black_box(merge_ips(ips.clone(), &blocked)));
        });
    }

    group.finish();
}

fn bench_parse_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_list");

    for size in [1000, 10000, 100000] {
        // Every entry appears twice
        let content: String = (0..size * 2)
            .map(|i| format!("host{}.example.com\n", i % size))
            .collect();
        group.bench_with_input(BenchmarkId::new("duplicated", size), &content, |b, content| {
            b.iter(|| black_box(parse_list("bench", content.as_bytes())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge_hostnames, bench_merge_ips, bench_parse_list);
criterion_main!(benches);
