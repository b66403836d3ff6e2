use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde::{Deserialize, Serialize};
use serde_ply_binary::{Endianness, PlyReader, Schema};

#[derive(Serialize, Deserialize)]
struct Vertex {
    x: f32,
    y: f32,
    z: f32,
    red: u8,
    green: u8,
    blue: u8,
}

fn schema() -> Schema {
    Schema::define([
        ("x", "float"),
        ("y", "float"),
        ("z", "float"),
        ("red", "uchar"),
        ("green", "uchar"),
        ("blue", "uchar"),
    ])
    .unwrap()
}

fn generate_vertices(vertex_count: usize) -> Vec<Vertex> {
    (0..vertex_count)
        .map(|i| {
            let base = i as f32 * 0.01;
            Vertex {
                x: base,
                y: base + 1.0,
                z: base + 2.0,
                red: (i % 256) as u8,
                green: 128,
                blue: 255,
            }
        })
        .collect()
}

fn benchmark_vertices(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex");

    let vertex_count = 50_000;
    let vertices = generate_vertices(vertex_count);
    let bytes = serde_ply_binary::to_bytes(&schema(), &vertices).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("write", |b| {
        b.iter(|| serde_ply_binary::to_bytes(&schema(), black_box(&vertices)).unwrap());
    });

    group.bench_function("read_native", |b| {
        b.iter(|| {
            let (_, parsed): (_, Vec<Vertex>) =
                serde_ply_binary::from_bytes(black_box(&bytes)).unwrap();
            parsed
        });
    });

    group.bench_function("read_swapped", |b| {
        b.iter(|| {
            let mut reader = PlyReader::new(black_box(bytes.as_slice()));
            reader.read_header().unwrap();
            reader.force_endianness(Endianness::host().opposite());
            reader
                .records::<Vertex>()
                .collect::<Result<Vec<_>, _>>()
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_vertices);
criterion_main!(benches);
