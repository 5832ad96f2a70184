use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proxydb::{Database, Field, Fields};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::hint::black_box;

#[path = "../tests/common/mod.rs"]
mod common;

use common::{BinWriter, Entry};

const PROXY_TYPES: [&str; 5] = ["VPN", "TOR", "DCH", "PUB", "-"];

fn build_table(rows: usize, indexed: bool) -> Database {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut starts = BTreeSet::new();
    starts.insert(0u32);
    while starts.len() < rows {
        starts.insert(rng.random_range(1..u32::MAX));
    }

    let mut writer = BinWriter::new(4);
    for (i, start) in starts.into_iter().enumerate() {
        let entry = Entry::new("US", "United States of America")
            .with(Field::ProxyType, PROXY_TYPES[i % PROXY_TYPES.len()])
            .with(Field::Region, "California")
            .with(Field::City, "Los Angeles")
            .with(Field::Isp, "Example Hosting");
        writer = writer.v4(start, entry);
    }
    if indexed {
        writer = writer.indexed();
    }
    Database::from_bytes(writer.build()).unwrap()
}

fn random_addresses(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|_| std::net::Ipv4Addr::from(rng.random::<u32>()).to_string())
        .collect()
}

fn bench_indexed_vs_plain(c: &mut Criterion) {
    let addresses = random_addresses(1000);
    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(addresses.len() as u64));

    for rows in [1_000usize, 100_000] {
        for indexed in [false, true] {
            let db = build_table(rows, indexed);
            let label = if indexed { "indexed" } else { "plain" };
            group.bench_with_input(BenchmarkId::new(label, rows), &addresses, |b, addrs| {
                b.iter(|| {
                    for ip in addrs {
                        black_box(db.is_proxy(ip).unwrap());
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_field_selection(c: &mut Criterion) {
    let db = build_table(100_000, true);
    let addresses = random_addresses(1000);
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(addresses.len() as u64));

    for (label, fields) in [
        ("country_short", Fields::COUNTRY_SHORT),
        ("is_proxy", Fields::IS_PROXY),
        ("all", Fields::ALL),
    ] {
        group.bench_with_input(BenchmarkId::new(label, 100_000), &addresses, |b, addrs| {
            b.iter(|| {
                for ip in addrs {
                    black_box(db.query(ip, fields).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_indexed_vs_plain, bench_field_selection);
criterion_main!(benches);
