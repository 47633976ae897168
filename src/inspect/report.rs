//! Inspect report types and terminal formatting.
//!
//! This module provides rich, structured inspection results that are
//! displayed beautifully in the terminal and serialize cleanly for
//! machine consumers.

use std::fmt;

use serde::Serialize;

/// The result of inspecting a collection.
#[derive(Clone, Debug, Serialize)]
pub struct PackReport {
    /// Summary counts for the collection.
    pub summary: SummarySection,
    /// Label distribution histogram.
    pub labels: LabelsSection,
    /// Region geometry statistics.
    pub regions: RegionStats,
    /// Display options for formatting.
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Summary counts for the collection.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    /// Total number of items.
    pub items: usize,
    /// Total number of regions.
    pub regions: usize,
    /// Number of distinct labels in use.
    pub distinct_labels: usize,
    /// Number of items that have at least one region.
    pub annotated_items: usize,
    /// Metadata entries dropped while loading the pack.
    pub dropped_entries: usize,
}

/// Label distribution section.
#[derive(Clone, Debug, Serialize)]
pub struct LabelsSection {
    /// How many top labels to show.
    pub top_n: usize,
    /// Total distinct labels in the collection.
    pub total_distinct: usize,
    /// Total regions counted.
    pub total_regions: usize,
    /// Top label entries (sorted by count descending).
    pub entries: Vec<LabelCount>,
    /// Sum of counts for labels not in the top N.
    pub other_count: usize,
}

/// A single label with its region count.
#[derive(Clone, Debug, Serialize)]
pub struct LabelCount {
    /// The label text.
    pub label: String,
    /// Number of regions carrying this label.
    pub count: usize,
}

/// Region geometry statistics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RegionStats {
    /// Total regions analyzed.
    pub total: usize,
    /// Regions with finite (non-NaN, non-Inf) geometry.
    pub finite: usize,
    /// Regions with positive width and height.
    pub positive_extent: usize,
    /// Finite regions with zero or negative extent.
    pub degenerate: usize,
    /// Regions that extend outside their item's pixel bounds.
    pub out_of_bounds: usize,
    /// Regions currently hidden from display.
    pub hidden: usize,
    /// Minimum region width (pixels), if any valid regions exist.
    pub min_width: Option<f64>,
    /// Maximum region width (pixels).
    pub max_width: Option<f64>,
    /// Minimum region height (pixels).
    pub min_height: Option<f64>,
    /// Maximum region height (pixels).
    pub max_height: Option<f64>,
}

impl fmt::Display for PackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│              📦  Pack Inspection Report                     │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        // Summary section
        self.fmt_summary(f)?;
        writeln!(f)?;

        // Labels section
        self.fmt_labels(f)?;
        writeln!(f)?;

        // Regions section
        self.fmt_regions(f)?;

        Ok(())
    }
}

impl PackReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "┌─ Summary ─────────────────────────────────────────────────┐")?;
        writeln!(f, "│                                                           │")?;
        writeln!(
            f,
            "│   Items:         {:>8}                                  │",
            format_number(s.items)
        )?;
        writeln!(
            f,
            "│   Regions:       {:>8}                                  │",
            format_number(s.regions)
        )?;
        writeln!(
            f,
            "│   Labels:        {:>8}                                  │",
            format_number(s.distinct_labels)
        )?;
        if s.dropped_entries > 0 {
            writeln!(
                f,
                "│   Dropped:       {:>8}                                  │",
                format_number(s.dropped_entries)
            )?;
        }
        writeln!(f, "│                                                           │")?;

        // Show annotated vs total items
        let pct = if s.items > 0 {
            (s.annotated_items as f64 / s.items as f64) * 100.0
        } else {
            0.0
        };
        let pad = 59usize.saturating_sub(
            28 + format_number(s.annotated_items).len()
                + format_number(s.items).len()
                + format!("{pct:.1}").len(),
        );
        writeln!(
            f,
            "│   Annotated:     {:>8} of {} ({:.1}%){}│",
            format_number(s.annotated_items),
            format_number(s.items),
            pct,
            " ".repeat(pad)
        )?;
        writeln!(f, "│                                                           │")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_labels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.labels;

        let header = if l.total_distinct > l.top_n {
            format!("Labels (top {} of {})", l.top_n, l.total_distinct)
        } else {
            format!("Labels ({})", l.total_distinct)
        };

        writeln!(f, "┌─ {} {}┐", header, "─".repeat(57 - header.len()))?;
        writeln!(f, "│                                                           │")?;

        if l.entries.is_empty() {
            writeln!(f, "│   No labels found.                                        │")?;
        } else {
            // Find max count for bar scaling
            let max_count = l.entries.iter().map(|e| e.count).max().unwrap_or(1);

            for entry in &l.entries {
                let pct = if l.total_regions > 0 {
                    (entry.count as f64 / l.total_regions as f64) * 100.0
                } else {
                    0.0
                };

                let bar = render_bar(entry.count, max_count, self.bar_width);
                let label_display = truncate_label(&entry.label, 16);

                writeln!(
                    f,
                    "│   {:<16} {:>7} {:>5.1}%  {}│",
                    label_display,
                    format_number(entry.count),
                    pct,
                    pad_bar(&bar, self.bar_width)
                )?;
            }

            // Show "Other" bucket if there are more labels
            if l.other_count > 0 {
                let pct = if l.total_regions > 0 {
                    (l.other_count as f64 / l.total_regions as f64) * 100.0
                } else {
                    0.0
                };
                let bar = render_bar(l.other_count, max_count, self.bar_width);
                writeln!(
                    f,
                    "│   {:<16} {:>7} {:>5.1}%  {}│",
                    "(other)",
                    format_number(l.other_count),
                    pct,
                    pad_bar(&bar, self.bar_width)
                )?;
            }
        }

        writeln!(f, "│                                                           │")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }

    fn fmt_regions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.regions;

        writeln!(f, "┌─ Regions ─────────────────────────────────────────────────┐")?;
        writeln!(f, "│                                                           │")?;

        if r.total == 0 {
            writeln!(f, "│   No regions found.                                       │")?;
        } else {
            // Dimensions
            if let (Some(min_w), Some(max_w), Some(min_h), Some(max_h)) =
                (r.min_width, r.max_width, r.min_height, r.max_height)
            {
                writeln!(
                    f,
                    "│   Width  (px):    min {:>8.1}    max {:>8.1}            │",
                    min_w, max_w
                )?;
                writeln!(
                    f,
                    "│   Height (px):    min {:>8.1}    max {:>8.1}            │",
                    min_h, max_h
                )?;
            } else {
                writeln!(f, "│   Width/Height:   No valid regions to measure             │")?;
            }

            writeln!(f, "│                                                           │")?;

            // Quality metrics
            writeln!(f, "│   Quality metrics:                                        │")?;

            let finite_pct = fmt_percent(r.finite, r.total);
            writeln!(
                f,
                "│     ✓ Finite coords:     {:>7} / {:>7}  ({:>5})      │",
                format_number(r.finite),
                format_number(r.total),
                finite_pct
            )?;

            let positive_pct = fmt_percent(r.positive_extent, r.total);
            writeln!(
                f,
                "│     ✓ Positive extent:   {:>7} / {:>7}  ({:>5})      │",
                format_number(r.positive_extent),
                format_number(r.total),
                positive_pct
            )?;

            writeln!(f, "│                                                           │")?;

            // Issues (if any)
            let has_issues =
                r.degenerate > 0 || r.out_of_bounds > 0 || r.finite < r.total;

            if has_issues {
                writeln!(f, "│   Issues found:                                           │")?;

                if r.degenerate > 0 {
                    let pct = fmt_percent(r.degenerate, r.total);
                    writeln!(
                        f,
                        "│     ⚠ Degenerate extent: {:>7} / {:>7}  ({:>5})      │",
                        format_number(r.degenerate),
                        format_number(r.total),
                        pct
                    )?;
                }

                if r.out_of_bounds > 0 {
                    let pct = fmt_percent(r.out_of_bounds, r.positive_extent);
                    writeln!(
                        f,
                        "│     ⚠ Out of bounds:     {:>7} / {:>7}  ({:>5})      │",
                        format_number(r.out_of_bounds),
                        format_number(r.positive_extent),
                        pct
                    )?;
                }

                if r.finite < r.total {
                    let non_finite = r.total - r.finite;
                    let pct = fmt_percent(non_finite, r.total);
                    writeln!(
                        f,
                        "│     ✗ Non-finite coords: {:>7} / {:>7}  ({:>5})      │",
                        format_number(non_finite),
                        format_number(r.total),
                        pct
                    )?;
                }
            } else {
                writeln!(f, "│   ✓ No issues detected                                    │")?;
            }

            if r.hidden > 0 {
                writeln!(
                    f,
                    "│     • Hidden regions:    {:>7}                          │",
                    format_number(r.hidden)
                )?;
            }
        }

        writeln!(f, "│                                                           │")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")?;

        Ok(())
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = (count * width) / max_count;
    let filled = filled.min(width); // Clamp to width

    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Pad a bar string to ensure consistent column alignment.
fn pad_bar(bar: &str, width: usize) -> String {
    let visual_len = bar.chars().count();
    let padding = (width + 2).saturating_sub(visual_len);
    format!("{}{}", bar, " ".repeat(padding))
}

/// Truncate a label to fit in the display column.
///
/// Counts chars, not bytes: labels are arbitrary UTF-8 and the column is
/// padded by char width.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}
