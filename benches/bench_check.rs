//! Comparator throughput benchmarks.
//!
//! Operators: compare_vectors (sum reference), check_array_2d
//! Vector sizes: 1K, 4K, 16K, 64K, 256K
//! Reported as element throughput.

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};

use gpurt_conformance::harness::{check_array_2d, compare_vectors};

const ELEM_SIZES: &[usize] = &[1024, 4096, 16384, 65536, 262144];

fn size_label(n: usize) -> String {
    match n {
        1024 => "1K".into(),
        4096 => "4K".into(),
        16384 => "16K".into(),
        65536 => "64K".into(),
        262144 => "256K".into(),
        _ => format!("{n}"),
    }
}

fn bench_compare_vectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_vectors_sum");
    for &n in ELEM_SIZES {
        let a: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..n).map(|i| (i * 2) as f32).collect();
        let out: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_label(n)), &n, |bench, _| {
            bench.iter(|| {
                let report = compare_vectors(
                    black_box(&a),
                    black_box(&b),
                    black_box(&out),
                    |x, y| x + y,
                );
                black_box(report)
            })
        });
    }
    group.finish();
}

fn bench_check_array_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_array_2d");
    for &n in ELEM_SIZES {
        let width = 256;
        let height = n / width;
        let base: Vec<u32> = (0..n).map(|i| i as u32).collect();
        let same = base.clone();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_label(n)), &n, |bench, _| {
            bench.iter(|| black_box(check_array_2d(black_box(&base), black_box(&same), width, height)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compare_vectors, bench_check_array_2d);
criterion_main!(benches);
