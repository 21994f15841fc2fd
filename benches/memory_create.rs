use std::{hint::black_box, sync::Arc, thread};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use leakybucket::{MemoryStorage, Rate, Storage};

fn bench_create_new_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_create/new_keys");
    group.sample_size(50);

    group.bench_function("create/10k", |b| {
        let rate = Rate::from_secs(60).unwrap();
        let keys: Vec<String> = (0..10_000).map(|i| format!("user_{i}")).collect();

        b.iter_batched(
            MemoryStorage::new,
            |storage| {
                for k in &keys {
                    let _ = black_box(storage.create(k, 100, rate));
                }
                storage
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_create_remove_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_create/churn");
    group.sample_size(100);

    group.bench_function("create+remove", |b| {
        let storage = MemoryStorage::new();
        let rate = Rate::from_secs(60).unwrap();

        b.iter(|| {
            let _ = black_box(storage.create(black_box("k"), 100, rate));
            storage.remove(black_box("k"));
        });
    });

    group.finish();
}

fn bench_contended_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_create/contended");
    group.sample_size(20);

    for threads in [2_usize, 8] {
        group.bench_function(format!("same_key/threads={threads}"), |b| {
            let rate = Rate::from_secs(60).unwrap();

            b.iter(|| {
                let storage = Arc::new(MemoryStorage::new());
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let storage = storage.clone();
                        thread::spawn(move || {
                            for _ in 0..1_000 {
                                let _ = black_box(storage.create("hot", 100, rate));
                            }
                        })
                    })
                    .collect();

                for h in handles {
                    let _ = h.join();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create_new_keys,
    bench_create_remove_churn,
    bench_contended_create
);
criterion_main!(benches);
