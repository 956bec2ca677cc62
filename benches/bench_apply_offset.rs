extern crate stamp_sync_sdk;
use camino::Utf8PathBuf;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use stamp_sync_sdk::stamp_sync_sdk::align::apply_offset;
use std::fs;

static NUMBER_OF_FILES: i64 = 1000;
static NUMBER_OF_ITERS: usize = 20;

fn populate(dir: &Utf8PathBuf) -> Vec<i64> {
    let timestamps: Vec<i64> = (0..NUMBER_OF_FILES)
        .map(|i| 1_700_000_000_000 + i * 33)
        .collect();
    for stamp in &timestamps {
        fs::write(dir.join(format!("{}.jpg", stamp)), b"").expect("Failed to create image");
    }
    timestamps
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rename timestamped files");
    group.sample_size(NUMBER_OF_ITERS);

    // shifting forward overlaps later sources and goes through staging names
    for (name, offset) in [("disjoint", 1_000_000), ("overlapping", 33)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let dir = tempfile::tempdir().expect("Failed to create temp dir");
                    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
                        .expect("Temp dir is not UTF-8");
                    let timestamps = populate(&path);
                    (dir, path, timestamps)
                },
                |(_dir, path, timestamps)| apply_offset(&path, &timestamps, "jpg", offset),
                BatchSize::PerIteration,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
