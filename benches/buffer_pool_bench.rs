//! Buffer pool benchmarks.
//!
//! Measures buffer pool performance for:
//! - First-touch page loads (extending the backing file)
//! - Pin/unpin operations
//! - Cache hit/miss scenarios
//! - Eviction under pressure

use bufpool::{BufferPool, PageNumber, ReplacementStrategy, PAGE_SIZE};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tempfile::TempDir;

fn fresh_pool(num_frames: usize) -> (BufferPool, TempDir) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let db_path = temp_dir.path().join("bench.db");
    let pool =
        BufferPool::init(&db_path, num_frames, ReplacementStrategy::Lru).expect("init pool");
    (pool, temp_dir)
}

/// Touches `count` never-before-seen pages, extending the file on each one.
fn preload(pool: &BufferPool, count: PageNumber) -> Vec<PageNumber> {
    let mut page_nums = Vec::new();
    for page_num in 0..count {
        pool.pin(page_num).expect("load page").unpin().expect("unpin");
        page_nums.push(page_num);
    }
    page_nums
}

/// Benchmark first-touch page loads at varying pool capacities.
fn bench_page_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool_allocation");

    for capacity in &[64usize, 128, 256, 512] {
        let (pool, _dir) = fresh_pool(*capacity);
        let mut next_page: PageNumber = 0;

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, _| {
            b.iter(|| {
                let handle = pool.pin(next_page).expect("load page");
                next_page += 1;
                black_box(handle.page_num())
            });
        });
    }

    group.finish();
}

/// Benchmark sequential page access (cache hits once the working set fits).
fn bench_sequential_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool_sequential");

    let (pool, _dir) = fresh_pool(256);
    let page_nums = preload(&pool, 100);

    group.throughput(Throughput::Elements(100));
    group.bench_function("100_pages_sequential", |b| {
        b.iter(|| {
            for &page_num in &page_nums {
                let handle = pool.pin(page_num).expect("pin page");
                black_box(handle.data().expect("pinned page data")[0]);
            }
        });
    });

    group.finish();
}

/// Benchmark random page access.
fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool_random");

    let (pool, _dir) = fresh_pool(128);
    let page_nums = preload(&pool, 100);
    pool.force_flush_pool().expect("flush");

    // Pseudo-random access pattern, seeded for reproducibility across runs.
    let mut rng = StdRng::seed_from_u64(12345);
    let access_pattern: Vec<_> = (0..1000)
        .map(|_| page_nums[rng.gen_range(0..page_nums.len())])
        .collect();

    group.throughput(Throughput::Elements(1000));
    group.bench_function("1000_random_accesses", |b| {
        b.iter(|| {
            for &page_num in &access_pattern {
                let handle = pool.pin(page_num).expect("pin page");
                black_box(handle.data().expect("pinned page data")[0]);
            }
        });
    });

    group.finish();
}

/// Benchmark page write operations.
fn bench_page_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool_write");

    let (pool, _dir) = fresh_pool(256);
    let page_nums = preload(&pool, 50);

    group.throughput(Throughput::Bytes(PAGE_SIZE as u64 * 50));
    group.bench_function("50_pages_write", |b| {
        b.iter(|| {
            for &page_num in &page_nums {
                let mut handle = pool.pin(page_num).expect("pin page");
                for byte in handle.data_mut().expect("pinned page data").iter_mut() {
                    *byte = 0x42;
                }
                handle.mark_dirty().expect("mark dirty");
            }
        });
    });

    group.finish();
}

/// Benchmark eviction under memory pressure (more pages touched than frames).
fn bench_eviction_pressure(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool_eviction");

    let pool_size = 32;
    let access_pages: PageNumber = 100;

    let (pool, _dir) = fresh_pool(pool_size);
    let page_nums = preload(&pool, access_pages);

    group.throughput(Throughput::Elements(access_pages as u64));
    group.bench_function("eviction_heavy", |b| {
        b.iter(|| {
            for &page_num in &page_nums {
                let handle = pool.pin(page_num).expect("pin page");
                black_box(handle.data().expect("pinned page data")[0]);
            }
        });
    });

    group.finish();
}

/// Benchmark cache hit rate under a working set of varying size.
fn bench_working_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_pool_working_set");

    let pool_size = 64;
    let (pool, _dir) = fresh_pool(pool_size);
    let page_nums = preload(&pool, 100);

    for working_set_size in &[32usize, 48, 64, 80] {
        let working_set: Vec<_> = page_nums.iter().take(*working_set_size).copied().collect();

        group.throughput(Throughput::Elements(*working_set_size as u64 * 100));
        group.bench_with_input(
            BenchmarkId::from_parameter(working_set_size),
            working_set_size,
            |b, _| {
                b.iter(|| {
                    for _ in 0..100 {
                        for &page_num in &working_set {
                            let handle = pool.pin(page_num).expect("pin page");
                            black_box(handle.data().expect("pinned page data")[0]);
                        }
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_page_allocation,
    bench_sequential_access,
    bench_random_access,
    bench_page_write,
    bench_eviction_pressure,
    bench_working_set
);
criterion_main!(benches);
