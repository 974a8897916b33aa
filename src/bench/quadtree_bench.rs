//! Criterion benchmarks for the recursive multiply.
//!
//! Compares:
//! - base-case kernels at a fixed block size
//! - block thresholds with the auto kernel
//! - worker counts with the auto kernel

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use quadmul::{BaseKernel, QuadMatrix, RecursiveEngine, Scheduler};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SIZE: usize = 256;

fn operands(block: usize) -> (QuadMatrix, QuadMatrix) {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut a = QuadMatrix::new(SIZE, block).unwrap();
    let mut b = QuadMatrix::new(SIZE, block).unwrap();
    a.fill_random(&mut rng);
    b.fill_random(&mut rng);
    (a, b)
}

fn flops() -> Throughput {
    Throughput::Elements(2 * (SIZE * SIZE * SIZE) as u64)
}

fn bench_kernels(c: &mut Criterion) {
    let block = 64;
    let (a, b) = operands(block);
    let scheduler = Scheduler::new(Some(1)).unwrap();

    let mut group = c.benchmark_group("Kernel");
    group.sample_size(20);
    group.throughput(flops());

    for kernel in [BaseKernel::Scalar, BaseKernel::Blocked, BaseKernel::Simd] {
        let engine = RecursiveEngine::new(block, kernel).unwrap();
        let mut out = engine.allocate(SIZE).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(kernel), &kernel, |bench, _| {
            bench.iter(|| scheduler.install(|| engine.multiply(&a, &b, &mut out).unwrap()));
            black_box(&out);
        });
    }

    group.finish();
}

fn bench_block_sizes(c: &mut Criterion) {
    let scheduler = Scheduler::new(Some(1)).unwrap();

    let mut group = c.benchmark_group("Block");
    group.sample_size(20);
    group.throughput(flops());

    for block in [16, 32, 64, 128, 256] {
        let (a, b) = operands(block);
        let engine = RecursiveEngine::new(block, BaseKernel::Auto).unwrap();
        let mut out = engine.allocate(SIZE).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(block), &block, |bench, _| {
            bench.iter(|| scheduler.install(|| engine.multiply(&a, &b, &mut out).unwrap()));
            black_box(&out);
        });
    }

    group.finish();
}

fn bench_threads(c: &mut Criterion) {
    let block = 32;
    let (a, b) = operands(block);
    let engine = RecursiveEngine::new(block, BaseKernel::Auto).unwrap();

    let mut group = c.benchmark_group("Threads");
    group.sample_size(20);
    group.throughput(flops());

    for threads in [1, 2, 4, 8] {
        let scheduler = Scheduler::new(Some(threads)).unwrap();
        let mut out = engine.allocate(SIZE).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |bench, _| {
            bench.iter(|| scheduler.install(|| engine.multiply(&a, &b, &mut out).unwrap()));
            black_box(&out);
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kernels, bench_block_sizes, bench_threads);
criterion_main!(benches);
