//! Benchmarks for the refluxdb codec and query path
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use refluxdb::protocol::{decode, encode};
use refluxdb::query::{aggregate_select, interpret_at, QueryDescriptor};
use refluxdb::storage::Point;

const LINES: [&str; 4] = [
    "cpu value=42",
    "cpu,host=server1,region=us-west value=42i,load=0.5,up=true 1465839830100400200",
    "cpu,host=\"server 1\" value=42,msg=\"hello, world\" 1465839830100400200",
    "\"my measurement\",foo=bar value=\"string field\"",
];

fn create_test_points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|i| Point::new("cpu", i as i64 * 1_000_000_000).field("value", i as f64))
        .collect()
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Elements(LINES.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            for line in LINES {
                decode(black_box(line)).unwrap();
            }
        })
    });

    let records: Vec<_> = LINES.iter().map(|l| decode(l).unwrap()).collect();
    group.bench_function("encode", |b| {
        b.iter(|| {
            for record in &records {
                black_box(encode(black_box(record)));
            }
        })
    });

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let query = "SELECT mean(\"value\") FROM \"cpu\" WHERE time >= 1000ms and time <= 2000ms GROUP BY time(1m)";
    group.bench_function("interpret", |b| {
        b.iter(|| interpret_at(black_box(query), 0).unwrap())
    });

    let descriptor = interpret_at("SELECT mean(value) FROM cpu GROUP BY time(1m)", i64::MAX).unwrap();
    let QueryDescriptor::SelectPoints(stmt) = descriptor else {
        unreachable!("select statement");
    };

    for size in [1_000, 100_000] {
        let points = create_test_points(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("aggregate_{}", size), |b| {
            b.iter(|| aggregate_select(black_box(&stmt), black_box(&points)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec, bench_query);
criterion_main!(benches);
