//! Benchmarks for revcompare core operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use revcompare::core::{parse_change_set, tree_nodes, visible_rows, ContentDiff, TextBuffer};

/// Generate a file with N lines.
fn generate_lines(n: usize, prefix: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(n * 20);
    for i in 0..n {
        buf.extend_from_slice(format!("{} line number {}\n", prefix, i).as_bytes());
    }
    buf
}

/// Generate a file with changes at specific positions.
fn generate_with_changes(n: usize, change_positions: &[usize]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(n * 20);
    for i in 0..n {
        if change_positions.contains(&i) {
            buf.extend_from_slice(format!("MODIFIED line number {}\n", i).as_bytes());
        } else {
            buf.extend_from_slice(format!("original line number {}\n", i).as_bytes());
        }
    }
    buf
}

/// Generate a name-status report spread over nested directories.
fn generate_report(n: usize) -> String {
    const CODES: [char; 4] = ['M', 'A', 'D', 'T'];
    (0..n)
        .map(|i| {
            format!(
                "{}\tcrate{}/src/module{}/file{}.rs\n",
                CODES[i % CODES.len()],
                i % 7,
                i % 13,
                i
            )
        })
        .collect()
}

fn bench_parse_change_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_change_set");

    for size in [10, 1_000, 10_000] {
        let report = generate_report(size);
        group.throughput(Throughput::Bytes(report.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &report, |b, report| {
            b.iter(|| parse_change_set(black_box(report)));
        });
    }

    group.finish();
}

fn bench_tree_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_nodes");

    for size in [10, 1_000, 10_000] {
        let changes = parse_change_set(&generate_report(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &changes, |b, changes| {
            b.iter(|| {
                let nodes = tree_nodes(black_box(changes));
                black_box(visible_rows(&nodes).len())
            });
        });
    }

    group.finish();
}

fn bench_diff_single_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("ContentDiff::compute/single_change");

    for size in [100, 1_000, 10_000] {
        let old_data = generate_lines(size, "original");
        let new_data = generate_with_changes(size, &[size / 2]);

        let old_buf = TextBuffer::new(&old_data);
        let new_buf = TextBuffer::new(&new_data);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(old_buf, new_buf),
            |b, (old, new)| {
                b.iter(|| ContentDiff::compute(black_box(old), black_box(new)));
            },
        );
    }

    group.finish();
}

fn bench_diff_many_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("ContentDiff::compute/many_changes");

    for size in [100, 1_000, 10_000] {
        // Change every 10th line
        let changes: Vec<usize> = (0..size).filter(|i| i % 10 == 0).collect();
        let old_data = generate_lines(size, "original");
        let new_data = generate_with_changes(size, &changes);

        let old_buf = TextBuffer::new(&old_data);
        let new_buf = TextBuffer::new(&new_data);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(old_buf, new_buf),
            |b, (old, new)| {
                b.iter(|| ContentDiff::compute(black_box(old), black_box(new)));
            },
        );
    }

    group.finish();
}

fn bench_diff_added_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("ContentDiff::compute/against_empty");

    for size in [100, 1_000, 10_000] {
        let empty = TextBuffer::new(b"");
        let added = TextBuffer::new(&generate_lines(size, "new"));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(empty, added),
            |b, (old, new)| {
                b.iter(|| ContentDiff::compute(black_box(old), black_box(new)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_change_set,
    bench_tree_nodes,
    bench_diff_single_change,
    bench_diff_many_changes,
    bench_diff_added_file,
);

criterion_main!(benches);
