#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;

use image::{Rgba, RgbaImage};
use labelpack::model::{Collection, Item, ItemId, Region, RegionBox};
use labelpack::pack::MEDIA_DIR;

/// A small deterministic raster whose pixels depend on the seed.
pub fn raster(width: u32, height: u32, seed: u8) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([seed, (x % 251) as u8, (y % 251) as u8, 255])
    })
}

pub fn region(label: &str, x: f64, y: f64, w: f64, h: f64) -> Region {
    Region::new(label, RegionBox::new(x, y, w, h))
}

/// An item with one region per label, spread across the raster.
pub fn item_with_labels(seed: u8, labels: &[&str]) -> Item {
    let image = raster(16, 12, seed);
    let regions = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let offset = i as f64;
            region(label, 4.0 + offset, 3.0 + offset, 2.0, 2.0)
        })
        .collect();
    Item::new(image, regions)
}

/// Three items: two annotated, one without regions.
pub fn sample_collection() -> Collection {
    Collection::from_items(vec![
        item_with_labels(1, &["person", "car"]),
        item_with_labels(2, &["person"]),
        Item::new(raster(8, 8, 3), Vec::new()),
    ])
}

/// The media file names a pack currently holds.
pub fn media_names(pack: &Path) -> BTreeSet<String> {
    labelpack::sync::media_file_names(&pack.join(MEDIA_DIR)).expect("list media dir")
}

/// Flattened view of a collection for comparisons that ignore region
/// ids (regenerated on every load) but respect item identity, labels,
/// geometry, and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSem {
    pub id: ItemId,
    pub width: u32,
    pub height: u32,
    pub regions: Vec<(String, f64, f64, f64, f64)>,
}

pub fn collection_semantics(collection: &Collection) -> Vec<ItemSem> {
    collection
        .items
        .iter()
        .map(|item| ItemSem {
            id: item.id,
            width: item.image.width(),
            height: item.image.height(),
            regions: item
                .regions
                .iter()
                .map(|r| {
                    (
                        r.label.clone(),
                        r.bounds.x,
                        r.bounds.y,
                        r.bounds.width,
                        r.bounds.height,
                    )
                })
                .collect(),
        })
        .collect()
}

/// Like [`collection_semantics`] but with item ids blanked, for
/// comparing across an export round trip where ids are regenerated.
pub fn collection_semantics_anonymous(collection: &Collection) -> Vec<ItemSem> {
    let mut sems = collection_semantics(collection);
    for sem in &mut sems {
        sem.id = ItemId::from_uuid(uuid::Uuid::nil());
    }
    sems
}
