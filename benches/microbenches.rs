//! Criterion microbenches for synthrec parsing, transform and framing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Scene annotation parsing (from_scene_str)
//! - The per-image transform (annotation_to_example), JPEG read included
//! - TFRecord framing and read-back (to_tfrecord_bytes, from_tfrecord_slice)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use prost::Message;
use std::fs;
use std::hint::black_box;

use synthrec::conversion::{annotation_to_example, ExampleContext};
use synthrec::ir::io_scene_json::from_scene_str;
use synthrec::ir::io_tfrecord::{from_tfrecord_slice, to_tfrecord_bytes};
use synthrec::ir::{CameraSettings, IdAllocator, LabelMap};

// A typical renderer scene: one worker, fully dressed.
const SCENE_FIXTURE: &str = r#"{
  "camera_data": {"location_worldframe": [0, 0, 0]},
  "objects": [
    {"class": "Body", "visibility": 0.92,
     "bounding_box": {"top_left": [120.5, 300.0], "bottom_right": [980.0, 720.25]}},
    {"class": "Shirt", "visibility": 0.81,
     "bounding_box": {"top_left": [300.0, 320.0], "bottom_right": [600.0, 700.0]}},
    {"class": "Pants", "visibility": 0.77,
     "bounding_box": {"top_left": [600.0, 340.0], "bottom_right": [960.0, 690.0]}},
    {"class": "Hat", "visibility": 0.66,
     "bounding_box": {"top_left": [110.0, 420.0], "bottom_right": [180.0, 600.0]}},
    {"class": "Mask", "visibility": 0.05,
     "bounding_box": {"top_left": [200.0, 460.0], "bottom_right": [260.0, 560.0]}},
    {"class": "LGlove", "visibility": 0.4,
     "bounding_box": {"top_left": [560.0, 300.0], "bottom_right": [620.0, 350.0]}},
    {"class": "RGlove", "visibility": 0.35,
     "bounding_box": {"top_left": [560.0, 680.0], "bottom_right": [620.0, 730.0]}}
  ]
}"#;

const JPEG_STUB: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9,
];

/// Benchmark scene annotation parsing from string.
fn bench_scene_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_parse");
    group.throughput(Throughput::Bytes(SCENE_FIXTURE.len() as u64));

    group.bench_function("from_scene_str", |b| {
        b.iter(|| {
            let scene = from_scene_str(black_box(SCENE_FIXTURE)).unwrap();
            black_box(scene)
        })
    });

    group.finish();
}

/// Benchmark building and encoding one example.
///
/// The JPEG lives in a temporary directory created outside the timed region.
fn bench_transform(c: &mut Criterion) {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let ann = tmp.path().join("000000.json");
    fs::write(tmp.path().join("000000.jpg"), JPEG_STUB).expect("Failed to write JPEG stub");

    let scene = from_scene_str(SCENE_FIXTURE).expect("Failed to parse scene fixture");
    let label_map = LabelMap::default();
    let ctx = ExampleContext {
        dataset_dir: tmp.path(),
        camera: CameraSettings::new(1280, 1024),
        label_map: &label_map,
        ignore_difficult_instances: false,
        visibility_threshold: 0.1,
    };

    let mut group = c.benchmark_group("transform");
    group.throughput(Throughput::Elements(scene.objects.len() as u64));

    group.bench_function("annotation_to_example", |b| {
        b.iter(|| {
            let mut ids = IdAllocator::new();
            let out =
                annotation_to_example(black_box(&scene), &ann, &ctx, &mut ids, None).unwrap();
            black_box(out.example.encode_to_vec())
        })
    });

    group.finish();
}

/// Benchmark TFRecord framing and CRC-checked read-back.
fn bench_tfrecord(c: &mut Criterion) {
    let records: Vec<Vec<u8>> = (0..64u8).map(|i| vec![i; 4096]).collect();
    let framed = to_tfrecord_bytes(&records);

    let mut group = c.benchmark_group("tfrecord");
    group.throughput(Throughput::Bytes(framed.len() as u64));

    group.bench_function("to_tfrecord_bytes", |b| {
        b.iter(|| black_box(to_tfrecord_bytes(black_box(&records))))
    });

    group.bench_function("from_tfrecord_slice", |b| {
        b.iter(|| black_box(from_tfrecord_slice(black_box(&framed)).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_scene_parse, bench_transform, bench_tfrecord);
criterion_main!(benches);
