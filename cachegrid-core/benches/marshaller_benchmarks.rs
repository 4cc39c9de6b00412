//! Encode/decode throughput benchmarks for the global marshaller.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cachegrid_core::container::{EmbeddedMetadata, MetadataImmortalCacheEntry, NumericVersion};
use cachegrid_core::serialization::Object;
use cachegrid_core::{GlobalMarshaller, SerializationConfig};

fn marshaller() -> GlobalMarshaller {
    let marshaller = GlobalMarshaller::new(SerializationConfig::default());
    marshaller.start().unwrap();
    marshaller
}

fn bench_primitives(c: &mut Criterion) {
    let marshaller = marshaller();
    let mut group = c.benchmark_group("primitives");

    group.bench_function("i32_encode", |b| {
        b.iter(|| black_box(marshaller.to_bytes(black_box(&42i32)).unwrap()))
    });

    let i32_bytes = marshaller.to_bytes(&42i32).unwrap();
    group.bench_function("i32_decode", |b| {
        b.iter(|| black_box(marshaller.object_from_bytes(black_box(&i32_bytes)).unwrap()))
    });

    let text = "the quick brown fox jumps over the lazy dog".to_string();
    group.bench_function("string_encode", |b| {
        b.iter(|| black_box(marshaller.to_bytes(black_box(&text)).unwrap()))
    });

    let text_bytes = marshaller.to_bytes(&text).unwrap();
    group.bench_function("string_decode", |b| {
        b.iter(|| black_box(marshaller.object_from_bytes(black_box(&text_bytes)).unwrap()))
    });

    group.finish();
}

fn bench_byte_arrays(c: &mut Criterion) {
    let marshaller = marshaller();
    let mut group = c.benchmark_group("byte_arrays");

    for size in [64usize, 4 * 1024, 256 * 1024] {
        let payload = vec![0x5Au8; size];
        let encoded = marshaller.to_bytes(&payload).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &payload, |b, payload| {
            b.iter(|| black_box(marshaller.to_bytes(payload).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| black_box(marshaller.object_from_bytes(encoded).unwrap()))
        });
    }

    group.finish();
}

fn bench_cache_entries(c: &mut Criterion) {
    let marshaller = marshaller();
    let mut group = c.benchmark_group("cache_entries");

    let entry = MetadataImmortalCacheEntry {
        key: Box::new("user:1001".to_string()),
        value: Box::new(vec![7u8; 128]),
        metadata: EmbeddedMetadata::new(60_000, -1).with_version(NumericVersion::new(12)),
    };
    group.bench_function("metadata_entry_encode", |b| {
        b.iter(|| black_box(marshaller.to_bytes(black_box(&entry)).unwrap()))
    });

    let entry_bytes = marshaller.to_bytes(&entry).unwrap();
    group.bench_function("metadata_entry_decode", |b| {
        b.iter(|| black_box(marshaller.object_from_bytes(black_box(&entry_bytes)).unwrap()))
    });

    let batch: Vec<Object> = (0..100i32).map(|i| Box::new(i) as Object).collect();
    group.bench_function("list_of_100_encode", |b| {
        b.iter(|| black_box(marshaller.to_bytes(black_box(&batch)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_primitives, bench_byte_arrays, bench_cache_entries);
criterion_main!(benches);
