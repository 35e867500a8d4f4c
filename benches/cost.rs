use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use rsbcrypt::{Cost, Hasher, Salt};

const PASSWORD: &str = "MyPassw0rd?";

// Fast mode: FAST_BENCH=1 cargo bench --bench cost
fn is_fast_mode() -> bool {
    std::env::var("FAST_BENCH")
        .map(|v| v == "1")
        .unwrap_or(false)
}

fn configure_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    if is_fast_mode() {
        group.measurement_time(std::time::Duration::from_millis(500));
        group.sample_size(10);
    } else {
        group.measurement_time(std::time::Duration::from_secs(5));
        group.sample_size(20);
    }
}

fn bench_hash_by_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_by_cost");
    configure_group(&mut group);

    let salt = Salt::from([0x24; 16]);
    for cost in [4u32, 6, 8, 10] {
        let hasher = Hasher::new(Cost::new(cost).unwrap());
        group.bench_with_input(BenchmarkId::new("hash_with_salt", cost), &cost, |b, _| {
            b.iter(|| black_box(hasher.hash_with_salt(black_box(PASSWORD), salt).unwrap()));
        });
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    configure_group(&mut group);

    for cost in [4u32, 8] {
        let hasher = Hasher::new(Cost::new(cost).unwrap());
        let hash = hasher.hash(PASSWORD).unwrap().to_string();

        group.bench_with_input(BenchmarkId::new("match", cost), &hash, |b, hash| {
            b.iter(|| black_box(hasher.verify(PASSWORD, hash).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("mismatch", cost), &hash, |b, hash| {
            b.iter(|| black_box(hasher.verify("wrong", hash).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hash_by_cost, bench_verify);
criterion_main!(benches);
