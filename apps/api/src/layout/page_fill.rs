//! Page Fill Analysis — how well each page of a paginated invoice is used.
//!
//! Runs after pagination and never changes the result. Feeds the summary
//! endpoint and the invoice preview's debug panel.
//!
//! # Fill rules
//! - Rows used > rows available → `Overflow` (only possible for a single oversized item)
//! - Whitespace > 50%           → `TooMuchWhitespace`
//! - Otherwise                  → `Acceptable`

use std::fmt::Write as _;

use serde::Serialize;

use crate::layout::allocator::Page;
use crate::layout::assembler::PaginationResult;
use crate::layout::row_height::{ItemLayout, NOTES_MIN_HEIGHT};

/// Whitespace fraction above which a page is reported as sparse.
const MAX_WHITESPACE_FRACTION: f32 = 0.50;

/// Notes this many units taller than a single notes row get a warning.
const NOTES_OVERFLOW_WARNING_UNITS: u32 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFillVerdict {
    Acceptable,
    TooMuchWhitespace,
    Overflow,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageFillAnalysis {
    pub page_number: usize,
    pub rows_used: u32,
    pub rows_available: u32,
    pub whitespace_fraction: f32,
    pub overflow_fraction: f32,
    pub verdict: PageFillVerdict,
}

/// Human-readable overview of a pagination run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationSummary {
    pub total_pages: usize,
    /// One line per page.
    pub breakdown: Vec<String>,
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

pub fn analyze_page_fill(page: &Page) -> PageFillAnalysis {
    let fill_ratio = page.rows_used as f32 / page.rows_available as f32;
    let whitespace_fraction = (1.0_f32 - fill_ratio).max(0.0);
    let overflow_fraction = (fill_ratio - 1.0_f32).max(0.0);

    let verdict = if page.rows_used > page.rows_available {
        PageFillVerdict::Overflow
    } else if whitespace_fraction > MAX_WHITESPACE_FRACTION {
        PageFillVerdict::TooMuchWhitespace
    } else {
        PageFillVerdict::Acceptable
    };

    PageFillAnalysis {
        page_number: page.page_number,
        rows_used: page.rows_used,
        rows_available: page.rows_available,
        whitespace_fraction,
        overflow_fraction,
        verdict,
    }
}

/// Summarizes a result: a breakdown line per page plus warnings for tall notes
/// and oversized pages. `layouts` must be the layouts the result was built from.
pub fn summarize(layouts: &[ItemLayout], result: &PaginationResult) -> PaginationSummary {
    let breakdown = result
        .pages
        .iter()
        .map(|page| {
            let items = if page.item_range.count == 0 {
                "no items".to_string()
            } else {
                format!(
                    "items {}–{}",
                    page.item_range.start + 1,
                    page.item_range.end()
                )
            };
            format!(
                "Page {}: {items} ({}/{} rows{})",
                page.page_number,
                page.rows_used,
                page.rows_available,
                if page.sections.total_box { ", includes total" } else { "" }
            )
        })
        .collect();

    let mut warnings: Vec<String> = layouts
        .iter()
        .enumerate()
        .filter_map(|(index, layout)| {
            let overflow = layout.notes_height.saturating_sub(NOTES_MIN_HEIGHT);
            (overflow > NOTES_OVERFLOW_WARNING_UNITS).then(|| {
                format!(
                    "Item {} has notes that overflow by {overflow} units ({} lines{})",
                    index + 1,
                    layout.notes_line_count,
                    if layout.notes_uses_two_columns { ", two columns" } else { "" }
                )
            })
        })
        .collect();

    warnings.extend(result.pages.iter().filter(|p| p.oversized).map(|page| {
        format!(
            "Page {} holds item {} which needs {} of {} rows",
            page.page_number,
            page.item_range.start + 1,
            page.rows_used,
            page.rows_available
        )
    }));

    PaginationSummary {
        total_pages: result.total_pages,
        breakdown,
        warnings,
    }
}

/// Renders a result as boxed plain text for previews and logs.
pub fn describe(result: &PaginationResult) -> String {
    let mut out = String::new();
    let distribution: Vec<String> = result
        .item_distribution
        .iter()
        .map(usize::to_string)
        .collect();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== Invoice Pagination Result ===");
    let _ = writeln!(out, "Layout Mode: {:?}", result.layout_mode);
    let _ = writeln!(out, "Total Pages: {}", result.total_pages);
    let _ = writeln!(out, "Item Distribution: [{}]", distribution.join(", "));

    for page in &result.pages {
        let kind = match (page.is_first_page, page.is_last_page) {
            (true, true) => "single",
            (true, false) => "first",
            _ => "continuation",
        };
        let units = &page.spacing_units;
        let _ = writeln!(out);
        let _ = writeln!(out, "┌─ Page {} ({kind}) ─┐", page.page_number);
        let _ = writeln!(out, "│ Rows: {}/{}", page.rows_used, page.rows_available);
        let _ = writeln!(out, "│ Header: {:?}", page.sections.header);
        let _ = writeln!(out, "│ Items: {}", page.item_range.count);
        let _ = writeln!(out, "│ Total Box: {}", if page.sections.total_box { "YES" } else { "NO" });
        let _ = writeln!(out, "│ Footer: {:?}", page.sections.footer);
        let _ = writeln!(
            out,
            "│ Spacing (rows / units{}):",
            if units.stretched { ", stretched" } else { "" }
        );
        let _ = writeln!(out, "│   Pre-item: {} / {}", page.spacing.pre_item, units.pre_item);
        let _ = writeln!(out, "│   Between items: {} / {}", page.spacing.between_items, units.between_items);
        let _ = writeln!(out, "│   Before total: {} / {}", page.spacing.before_total, units.before_total);
        let _ = writeln!(out, "│   After total: {} / {}", page.spacing.after_total, units.after_total);
        let _ = writeln!(out, "└─────────────────────────┘");
    }

    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::page_config::PageConfig;
    use crate::layout::paginate;
    use crate::layout::row_height::estimate;
    use crate::models::invoice::LineItem;

    fn make_items(count: usize, notes: Option<&str>) -> Vec<LineItem> {
        (0..count)
            .map(|i| LineItem {
                title: format!("Service {}", i + 1),
                notes: notes.map(str::to_string),
                ..Default::default()
            })
            .collect()
    }

    fn paginate_with(items: &[LineItem], rows: u32) -> (Vec<ItemLayout>, PaginationResult) {
        let layouts = items.iter().map(estimate).collect();
        let result = paginate(items, &PageConfig::new(rows).unwrap()).unwrap();
        (layouts, result)
    }

    #[test]
    fn test_acceptable_fill_verdict() {
        // 11 plain items use 50 of 51 rows.
        let (_, result) = paginate_with(&make_items(11, None), 51);
        let analysis = analyze_page_fill(&result.pages[0]);
        assert_eq!(analysis.verdict, PageFillVerdict::Acceptable);
        assert!(analysis.whitespace_fraction < 0.05);
    }

    #[test]
    fn test_sparse_page_verdict() {
        // One plain item uses 15 of 51 rows.
        let (_, result) = paginate_with(&make_items(1, None), 51);
        let analysis = analyze_page_fill(&result.pages[0]);
        assert_eq!(analysis.verdict, PageFillVerdict::TooMuchWhitespace);
        assert_eq!(analysis.overflow_fraction, 0.0);
    }

    #[test]
    fn test_oversized_page_verdict() {
        let notes = "n".repeat(20_000);
        let (_, result) = paginate_with(&make_items(1, Some(&notes)), 51);
        let analysis = analyze_page_fill(&result.pages[0]);
        assert_eq!(analysis.verdict, PageFillVerdict::Overflow);
        assert!(analysis.overflow_fraction > 0.0);
    }

    #[test]
    fn test_summary_breakdown_lines() {
        let (layouts, result) = paginate_with(&make_items(3, None), 20);
        let summary = summarize(&layouts, &result);
        assert_eq!(summary.total_pages, 2);
        assert_eq!(summary.breakdown[0], "Page 1: items 1–2 (10/20 rows)");
        assert_eq!(summary.breakdown[1], "Page 2: items 3–3 (15/20 rows, includes total)");
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_summary_warns_about_tall_notes_and_oversized_pages() {
        let notes = "n".repeat(20_000);
        let (layouts, result) = paginate_with(&make_items(1, Some(&notes)), 51);
        let summary = summarize(&layouts, &result);
        assert_eq!(summary.warnings.len(), 2);
        assert!(summary.warnings[0].starts_with("Item 1 has notes that overflow"));
        assert!(summary.warnings[1].starts_with("Page 1 holds item 1"));
    }

    #[test]
    fn test_summary_of_empty_invoice() {
        let (layouts, result) = paginate_with(&[], 51);
        let summary = summarize(&layouts, &result);
        assert_eq!(summary.breakdown, vec!["Page 1: no items (12/51 rows, includes total)"]);
    }

    #[test]
    fn test_describe_lists_every_page() {
        let (_, result) = paginate_with(&make_items(3, None), 20);
        let text = describe(&result);
        assert!(text.contains("Total Pages: 2"));
        assert!(text.contains("Item Distribution: [2, 1]"));
        assert!(text.contains("Page 1 (first)"));
        assert!(text.contains("Page 2 (continuation)"));
        assert!(text.contains("stretched"));
    }
}
