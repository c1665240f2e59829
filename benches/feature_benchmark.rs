use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kmerfeat::builder::FeatureTableBuilder;
use kmerfeat::features::{featurize, SampleFeatures};
use kmerfeat::kmer::{count_kmers, KmerLength};
use kmerfeat::vocabulary::{build_vocabulary, VocabSize};
use std::io::Write;
use tempfile::TempDir;

fn sequence(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

fn bench_count_kmers(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_kmers");
    let seq = sequence(100_000, 7);

    for k in [3, 5, 8] {
        let k = KmerLength::new(k).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| count_kmers(black_box(&seq), k))
        });
    }

    group.finish();
}

fn bench_featurize(c: &mut Criterion) {
    let mut group = c.benchmark_group("featurize");
    let k = KmerLength::new(3).unwrap();

    for len in [1_000, 100_000] {
        let seq = sequence(len, 11);
        group.bench_with_input(BenchmarkId::from_parameter(len), &seq, |b, seq| {
            b.iter(|| featurize(black_box(seq), k))
        });
    }

    group.finish();
}

fn bench_build_vocabulary(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_vocabulary");
    let k = KmerLength::new(5).unwrap();
    let cohort: Vec<SampleFeatures> = (0..50).map(|i| featurize(&sequence(5_000, i), k)).collect();

    for top in [50, 200] {
        let size = VocabSize::new(top).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(top), &size, |b, &size| {
            b.iter(|| build_vocabulary(black_box(&cohort), size))
        });
    }

    group.finish();
}

fn bench_build_cohort(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_cohort");

    let dir = TempDir::new().unwrap();
    let mut meta = std::fs::File::create(dir.path().join("metadata.csv")).unwrap();
    writeln!(meta, "sample_id,label").unwrap();
    for i in 0..32u64 {
        let mut file = std::fs::File::create(dir.path().join(format!("S{i}.fasta"))).unwrap();
        writeln!(file, ">S{i}").unwrap();
        file.write_all(&sequence(20_000, i)).unwrap();
        writeln!(file).unwrap();
        writeln!(meta, "S{i},{}", i % 2).unwrap();
    }
    let meta_path = dir.path().join("metadata.csv");

    group.bench_function("32_samples", |b| {
        b.iter(|| {
            FeatureTableBuilder::new()
                .build(black_box(dir.path()), black_box(&meta_path))
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_count_kmers,
    bench_featurize,
    bench_build_vocabulary,
    bench_build_cohort,
);

criterion_main!(benches);
