//! Criterion microbenches for labelpack hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - View-space mapping (to_view_rect, from_view_rect)
//! - Media diffing (MediaDiff::between, choose_strategy)
//! - Label queries over a collection (label_index)
//! - PNG encoding of item rasters (encode_png)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeSet;
use std::hint::black_box;

use labelpack::geometry::{from_view_rect, to_view_rect, PixelSize, ViewportSize};
use labelpack::model::{Collection, Item, ItemId, Region, RegionBox};
use labelpack::raster::encode_png;
use labelpack::sync::MediaDiff;

const LABELS: [&str; 6] = ["person", "car", "dog", "tree", "sign", "bike"];

/// A batch of region boxes spread over a 1920x1080 image.
fn sample_boxes() -> Vec<RegionBox> {
    (0..512)
        .map(|i| {
            let i = i as f64;
            RegionBox::new(
                80.0 + (i * 37.0) % 1760.0,
                60.0 + (i * 23.0) % 960.0,
                16.0 + (i * 7.0) % 240.0,
                12.0 + (i * 11.0) % 180.0,
            )
        })
        .collect()
}

/// Benchmark image-to-view mapping over a batch of boxes.
fn bench_to_view_rect(c: &mut Criterion) {
    let image = PixelSize::new(1920.0, 1080.0);
    let viewport = ViewportSize::new(800.0, 600.0);
    let boxes = sample_boxes();

    let mut group = c.benchmark_group("view_mapping");
    group.throughput(Throughput::Elements(boxes.len() as u64));

    group.bench_function("to_view_rect", |b| {
        b.iter(|| {
            for bounds in &boxes {
                let rect = to_view_rect(black_box(*bounds), image, viewport).unwrap();
                black_box(rect);
            }
        })
    });

    group.finish();
}

/// Benchmark the view-to-image inverse over the same batch.
fn bench_from_view_rect(c: &mut Criterion) {
    let image = PixelSize::new(1920.0, 1080.0);
    let viewport = ViewportSize::new(800.0, 600.0);
    // Map the batch forward once (outside the timed region)
    let rects: Vec<_> = sample_boxes()
        .iter()
        .map(|bounds| to_view_rect(*bounds, image, viewport).unwrap())
        .collect();

    let mut group = c.benchmark_group("view_mapping");
    group.throughput(Throughput::Elements(rects.len() as u64));

    group.bench_function("from_view_rect", |b| {
        b.iter(|| {
            for rect in &rects {
                let bounds = from_view_rect(black_box(*rect), image, viewport).unwrap();
                black_box(bounds);
            }
        })
    });

    group.finish();
}

/// Benchmark media diffing between two large name sets.
///
/// The sets share most of their names, so the diff exercises the
/// common/removed/added split rather than a degenerate case.
fn bench_media_diff(c: &mut Criterion) {
    let old: BTreeSet<String> = (0..1000).map(|i| format!("{i:04}.png")).collect();
    let new: BTreeSet<String> = (100..1100).map(|i| format!("{i:04}.png")).collect();

    let mut group = c.benchmark_group("media_diff");
    group.throughput(Throughput::Elements(old.len() as u64));

    group.bench_function("between", |b| {
        b.iter(|| {
            let diff = MediaDiff::between(black_box(&old), black_box(&new));
            black_box(diff.choose_strategy())
        })
    });

    group.finish();
}

/// Benchmark label lookup across a collection.
fn bench_label_index(c: &mut Criterion) {
    // Build the collection once (outside the timed region)
    let items: Vec<_> = (0..200)
        .map(|i| {
            let image = image::RgbaImage::new(4, 4);
            let regions = (0..4)
                .map(|j| {
                    let label = LABELS[(i + j) % LABELS.len()];
                    Region::new(label, RegionBox::new(2.0, 2.0, 1.0, 1.0))
                })
                .collect();
            Item::with_id(ItemId::new(), image, regions)
        })
        .collect();
    let collection = Collection::from_items(items);

    let mut group = c.benchmark_group("label_query");
    group.throughput(Throughput::Elements(collection.region_count() as u64));

    group.bench_function("label_index", |b| {
        b.iter(|| {
            let hits = collection.label_index(black_box("person"));
            black_box(hits)
        })
    });

    group.finish();
}

/// Benchmark PNG encoding of a single item raster.
fn bench_encode_png(c: &mut Criterion) {
    let id = ItemId::new();
    let image = image::RgbaImage::from_fn(256, 256, |x, y| {
        image::Rgba([(x % 251) as u8, (y % 251) as u8, ((x + y) % 251) as u8, 255])
    });

    let mut group = c.benchmark_group("raster");
    group.throughput(Throughput::Bytes(image.as_raw().len() as u64));

    group.bench_function("encode_png", |b| {
        b.iter(|| {
            let bytes = encode_png(id, black_box(&image)).unwrap();
            black_box(bytes)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_to_view_rect,
    bench_from_view_rect,
    bench_media_diff,
    bench_label_index,
    bench_encode_png,
);
criterion_main!(benches);
