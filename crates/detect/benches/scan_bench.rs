use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pico_cascade::{Cascade, Image};
use pico_detect::{find_objects, DetectParams};
use rand::Rng;

fn synthetic_cascade() -> Vec<u8> {
    let tdepth: u32 = 4;
    let ntrees: i32 = 6;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&24.0f32.to_le_bytes());
    bytes.extend_from_slice(&24.0f32.to_le_bytes());
    bytes.extend_from_slice(&(tdepth as i32).to_le_bytes());
    bytes.extend_from_slice(&ntrees.to_le_bytes());

    let num_nodes = (1usize << tdepth) - 1;
    let num_leaves = 1usize << tdepth;
    for _ in 0..ntrees {
        for _ in 0..num_nodes {
            bytes.extend_from_slice(&[30, 10, 226u8, 246u8]);
        }
        for i in 0..num_leaves {
            bytes.extend_from_slice(&(i as f32 - num_leaves as f32 / 2.0).to_le_bytes());
        }
        bytes.extend_from_slice(&(-1000.0f32).to_le_bytes());
    }
    bytes
}

fn bench_scan(c: &mut Criterion) {
    let bytes = synthetic_cascade();
    let cascade = Cascade::load(&bytes).unwrap();

    let mut rng = rand::rng();
    let pixels: Vec<u8> = (0..320 * 240).map(|_| rng.random()).collect();
    let image = Image::new(&pixels, 240, 320, 320).unwrap();

    let params = DetectParams {
        min_size: 32.0,
        max_size: 128.0,
        ..DetectParams::default()
    };

    c.bench_function("find_objects_320x240", |b| {
        b.iter(|| black_box(find_objects(&cascade, black_box(&image), black_box(&params)).unwrap()))
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
