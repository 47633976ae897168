#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use labelpack::model::{Collection, Item, Region, RegionBox};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Round-trip tolerance for view-space conversions.
pub const EPS_VIEW: f64 = 1e-6;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

const LABELS: &[&str] = &["person", "car", "dog", "tree", "sign", "bike"];

type RegionSeed = (u8, u32, u32, u32, u32);
type ItemSeed = (u32, u32, u8, Vec<RegionSeed>);

fn region_seed_strategy() -> impl Strategy<Value = RegionSeed> {
    (
        any::<u8>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
}

fn item_seed_strategy(min_regions: usize, max_regions: usize) -> impl Strategy<Value = ItemSeed> {
    (
        2u32..=12,
        2u32..=12,
        any::<u8>(),
        proptest::collection::vec(region_seed_strategy(), min_regions..=max_regions),
    )
}

/// A collection of up to `max_items` small items, each carrying up to
/// `max_regions` regions (possibly none).
pub fn arb_collection(max_items: usize, max_regions: usize) -> BoxedStrategy<Collection> {
    proptest::collection::vec(item_seed_strategy(0, max_regions), 0..=max_items)
        .prop_map(build_collection)
        .boxed()
}

/// Like [`arb_collection`] but every item has at least one region, so
/// an export save retains all of them.
pub fn arb_annotated_collection(max_items: usize, max_regions: usize) -> BoxedStrategy<Collection> {
    proptest::collection::vec(item_seed_strategy(1, max_regions), 1..=max_items)
        .prop_map(build_collection)
        .boxed()
}

/// A collection plus an edited successor that keeps a prefix of the
/// original items and appends fresh ones, so a re-save sees genuine
/// carry-over, additions, and removals at once.
pub fn arb_collection_edit(
    max_items: usize,
    max_regions: usize,
) -> BoxedStrategy<(Collection, Collection)> {
    (
        arb_collection(max_items, max_regions),
        proptest::collection::vec(item_seed_strategy(0, max_regions), 0..=max_items),
        any::<u8>(),
    )
        .prop_map(|(before, extra_seeds, keep_seed)| {
            let keep = if before.is_empty() {
                0
            } else {
                keep_seed as usize % (before.len() + 1)
            };
            let mut items: Vec<Item> = before.items[..keep].to_vec();
            items.extend(build_collection(extra_seeds).items);
            let after = Collection::from_items(items);
            (before, after)
        })
        .boxed()
}

fn build_collection(item_seeds: Vec<ItemSeed>) -> Collection {
    let items = item_seeds
        .into_iter()
        .map(|(width, height, pixel_seed, region_seeds)| {
            let image = RgbaImage::from_fn(width, height, |x, y| {
                Rgba([pixel_seed, (x % 251) as u8, (y % 251) as u8, 255])
            });
            let regions = region_seeds
                .into_iter()
                .map(|seed| region_from_seed(width, height, seed))
                .collect();
            Item::new(image, regions)
        })
        .collect();
    Collection::from_items(items)
}

fn region_from_seed(width: u32, height: u32, seed: RegionSeed) -> Region {
    let (label_seed, sx, sy, sw, sh) = seed;
    let label = LABELS[label_seed as usize % LABELS.len()];
    // Quarter-pixel grid, boxes not necessarily inside the raster.
    let x = f64::from(sx % (width * 8)) / 4.0;
    let y = f64::from(sy % (height * 8)) / 4.0;
    let w = f64::from(sw % (width * 4)) / 4.0;
    let h = f64::from(sh % (height * 4)) / 4.0;
    Region::new(label, RegionBox::new(x, y, w, h))
}

/// Compares two collections item by item: ids, raster pixels, labels,
/// and geometry. Region ids are ignored (they are regenerated on every
/// load); geometry compares exactly, which JSON round trips preserve
/// for finite values.
pub fn assert_collections_equivalent(a: &Collection, b: &Collection) -> Result<(), String> {
    assert_items_equivalent(a, b, true)
}

/// Like [`assert_collections_equivalent`] but item ids are ignored
/// too, for export round trips where ids are regenerated.
pub fn assert_collections_equivalent_anonymous(
    a: &Collection,
    b: &Collection,
) -> Result<(), String> {
    assert_items_equivalent(a, b, false)
}

fn assert_items_equivalent(
    a: &Collection,
    b: &Collection,
    compare_ids: bool,
) -> Result<(), String> {
    if a.len() != b.len() {
        return Err(format!("item count mismatch: left={} right={}", a.len(), b.len()));
    }

    for (index, (left, right)) in a.items.iter().zip(&b.items).enumerate() {
        if compare_ids && left.id != right.id {
            return Err(format!(
                "item #{index} id mismatch: left={} right={}",
                left.id, right.id
            ));
        }
        if left.image != right.image {
            return Err(format!(
                "item #{index} raster mismatch: left={:?} right={:?}",
                left.image.dimensions(),
                right.image.dimensions()
            ));
        }
        if left.regions.len() != right.regions.len() {
            return Err(format!(
                "item #{index} region count mismatch: left={} right={}",
                left.regions.len(),
                right.regions.len()
            ));
        }
        for (slot, (lr, rr)) in left.regions.iter().zip(&right.regions).enumerate() {
            if lr.label != rr.label {
                return Err(format!(
                    "item #{index} region #{slot} label mismatch: left='{}' right='{}'",
                    lr.label, rr.label
                ));
            }
            if lr.bounds != rr.bounds {
                return Err(format!(
                    "item #{index} region #{slot} bounds mismatch: left={:?} right={:?}",
                    lr.bounds, rr.bounds
                ));
            }
        }
    }

    Ok(())
}
