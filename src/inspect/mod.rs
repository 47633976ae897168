//! Collection inspection and statistics.
//!
//! This module analyzes a collection (or a freshly loaded pack) and
//! produces a structured report with summary counts, a label
//! distribution histogram, and region geometry quality metrics.

mod report;

pub use report::{LabelCount, LabelsSection, PackReport, RegionStats, SummarySection};

use std::collections::HashMap;

use crate::model::Collection;
use crate::pack::LoadedPack;

/// Options for collection inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Number of top labels to show in the histogram.
    pub top_labels: usize,
    /// Tolerance in pixels for out-of-bounds checks.
    pub oob_tolerance_px: f64,
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            top_labels: 10,
            oob_tolerance_px: 0.5,
            bar_width: 20,
        }
    }
}

/// Inspect a loaded pack, folding load drops into the summary.
pub fn inspect_pack(loaded: &LoadedPack, opts: &InspectOptions) -> PackReport {
    let mut report = inspect_collection(&loaded.collection, opts);
    report.summary.dropped_entries = loaded.dropped.len();
    report
}

/// Inspect an in-memory collection and produce a detailed report.
///
/// This analyzes the collection to compute:
/// - Summary counts (items, regions, distinct labels)
/// - Label distribution histogram (top N labels)
/// - Region geometry statistics (dimensions, quality metrics)
pub fn inspect_collection(collection: &Collection, opts: &InspectOptions) -> PackReport {
    PackReport {
        summary: compute_summary(collection),
        labels: compute_labels(collection, opts.top_labels),
        regions: compute_region_stats(collection, opts.oob_tolerance_px),
        bar_width: opts.bar_width,
    }
}

/// Compute summary section counts.
fn compute_summary(collection: &Collection) -> SummarySection {
    let annotated_items = collection
        .items
        .iter()
        .filter(|item| !item.regions.is_empty())
        .count();

    SummarySection {
        items: collection.len(),
        regions: collection.region_count(),
        distinct_labels: collection.labels().len(),
        annotated_items,
        dropped_entries: 0,
    }
}

/// Compute label distribution histogram.
fn compute_labels(collection: &Collection, top_n: usize) -> LabelsSection {
    // Count regions per label
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in &collection.items {
        for region in &item.regions {
            *counts.entry(region.label.clone()).or_insert(0) += 1;
        }
    }

    // Sort by count descending, then by name ascending for deterministic output
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total_distinct = sorted.len();
    let total_regions = collection.region_count();

    // Split into top N and "other"
    let (top_entries, rest): (Vec<_>, Vec<_>) = sorted
        .into_iter()
        .enumerate()
        .partition(|(i, _)| *i < top_n);

    let entries: Vec<LabelCount> = top_entries
        .into_iter()
        .map(|(_, (label, count))| LabelCount { label, count })
        .collect();

    let other_count: usize = rest.into_iter().map(|(_, (_, count))| count).sum();

    LabelsSection {
        top_n,
        total_distinct,
        total_regions,
        entries,
        other_count,
    }
}

/// Compute region geometry statistics.
fn compute_region_stats(collection: &Collection, tolerance: f64) -> RegionStats {
    let mut stats = RegionStats {
        total: collection.region_count(),
        ..Default::default()
    };

    // Track min/max for width/height
    let mut min_width: Option<f64> = None;
    let mut max_width: Option<f64> = None;
    let mut min_height: Option<f64> = None;
    let mut max_height: Option<f64> = None;

    for item in &collection.items {
        let img_w = f64::from(item.image.width());
        let img_h = f64::from(item.image.height());

        for region in &item.regions {
            let b = region.bounds;

            if region.hidden {
                stats.hidden += 1;
            }

            if !b.is_finite() {
                continue;
            }
            stats.finite += 1;

            if b.width <= 0.0 || b.height <= 0.0 {
                stats.degenerate += 1;
                continue;
            }
            stats.positive_extent += 1;

            min_width = Some(min_width.map_or(b.width, |m| m.min(b.width)));
            max_width = Some(max_width.map_or(b.width, |m| m.max(b.width)));
            min_height = Some(min_height.map_or(b.height, |m| m.min(b.height)));
            max_height = Some(max_height.map_or(b.height, |m| m.max(b.height)));

            // Center-origin box against the item's pixel bounds
            let left = b.x - b.width / 2.0;
            let top = b.y - b.height / 2.0;
            let right = b.x + b.width / 2.0;
            let bottom = b.y + b.height / 2.0;

            let is_oob = left < -tolerance
                || top < -tolerance
                || right > img_w + tolerance
                || bottom > img_h + tolerance;
            if is_oob {
                stats.out_of_bounds += 1;
            }
        }
    }

    stats.min_width = min_width;
    stats.max_width = max_width;
    stats.min_height = min_height;
    stats.max_height = max_height;

    stats
}
