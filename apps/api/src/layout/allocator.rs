//! Page Allocator — distributes line items over fixed-budget pages.
//!
//! # Algorithm
//! Single greedy pass, no backtracking:
//! - The first item on a page is always placed, so an item taller than the budget
//!   gets a page of its own instead of being split (or looping forever).
//! - Any later item that would push the page past `rows_available` starts a new page.
//! - Only a candidate page that ends with the final item reserves room for the
//!   total box (`before_total` + total box + `after_total`).
//! - Spacing is chosen per page from that page's own equivalent item count.
//!
//! Item heights come from `row_height::estimate`; this module only does row
//! bookkeeping.

use std::ops::Range;

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::page_config::{check_row_budget, TOTAL_BOX_ROWS};
use crate::layout::row_height::ItemLayout;
use crate::layout::spacing::{equivalent_item_count, select_spacing, SpacingRule, SpacingUnits};
use crate::layout::LayoutError;
use crate::models::invoice::LineItem;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Contiguous slice of the invoice's items, by index into the input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRange {
    pub start: usize,
    pub count: usize,
}

impl ItemRange {
    /// One past the last index on the page.
    pub fn end(&self) -> usize {
        self.start + self.count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderVariant {
    /// Company block, bill-to and invoice metadata. Page 1 only.
    Full,
    /// Invoice number and page marker.
    ContinuationMinimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FooterVariant {
    /// Payment instructions. Last page only.
    FullPayment,
    ContinuationSimple,
}

/// Which fixed sections the renderer places on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSections {
    pub header: HeaderVariant,
    pub total_box: bool,
    pub footer: FooterVariant,
}

impl PageSections {
    pub fn for_page(is_first_page: bool, is_last_page: bool) -> Self {
        Self {
            header: if is_first_page {
                HeaderVariant::Full
            } else {
                HeaderVariant::ContinuationMinimal
            },
            total_box: is_last_page,
            footer: if is_last_page {
                FooterVariant::FullPayment
            } else {
                FooterVariant::ContinuationSimple
            },
        }
    }
}

/// One printable page of the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based.
    pub page_number: usize,
    pub item_range: ItemRange,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub sections: PageSections,
    pub equivalent_item_count: u32,
    pub spacing: SpacingRule,
    pub spacing_units: SpacingUnits,
    pub rows_used: u32,
    pub rows_available: u32,
    /// A single item that does not fit even on an otherwise empty page.
    pub oversized: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Allocation
// ────────────────────────────────────────────────────────────────────────────

/// Splits `items` into pages of at most `rows_available` rows each.
///
/// `layouts` must be parallel to `items` (one `ItemLayout` per item, same order).
pub fn allocate(
    items: &[LineItem],
    layouts: &[ItemLayout],
    rows_available: u32,
) -> Result<Vec<Page>, LayoutError> {
    check_row_budget(rows_available)?;
    if items.len() != layouts.len() {
        return Err(LayoutError::LayoutMismatch {
            items: items.len(),
            layouts: layouts.len(),
        });
    }

    let ranges = break_pages(layouts, rows_available);
    let multi_page = ranges.len() > 1;
    let last_index = ranges.len() - 1;

    debug!(
        item_count = items.len(),
        page_count = ranges.len(),
        rows_available,
        "allocated invoice pages"
    );

    Ok(ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            build_page(index, range, index == last_index, layouts, rows_available, multi_page)
        })
        .collect())
}

/// Rows a page needs when laid out with its own spacing tier.
pub fn rows_needed(layouts: &[ItemLayout], is_last_page: bool) -> u32 {
    let spacing = select_spacing(equivalent_item_count(layouts));
    page_rows(layouts, &spacing, is_last_page)
}

/// `pre_item + Σ item rows + gaps × between_items`, plus the total-box block on
/// the last page. No gap precedes the first item or follows the last one.
fn page_rows(layouts: &[ItemLayout], spacing: &SpacingRule, is_last_page: bool) -> u32 {
    let item_rows: u32 = layouts.iter().map(ItemLayout::rows).sum();
    let gaps = layouts.len().saturating_sub(1) as u32;
    let mut rows = spacing.pre_item + item_rows + gaps * spacing.between_items;
    if is_last_page {
        rows += spacing.before_total + TOTAL_BOX_ROWS + spacing.after_total;
    }
    rows
}

/// The greedy walk. Returns one index range per page, in order.
fn break_pages(layouts: &[ItemLayout], rows_available: u32) -> Vec<Range<usize>> {
    if layouts.is_empty() {
        return vec![0..0];
    }

    let final_index = layouts.len() - 1;
    let mut ranges = Vec::new();
    let mut start = 0;

    // Item `start` is always placed; only the items after it can trigger a break.
    for index in 1..layouts.len() {
        let provisionally_last = index == final_index;
        if rows_needed(&layouts[start..=index], provisionally_last) > rows_available {
            debug!(page = ranges.len() + 1, start, next = index, "page break");
            ranges.push(start..index);
            start = index;
        }
    }
    ranges.push(start..layouts.len());

    settle_last_page(&mut ranges, layouts, rows_available);
    ranges
}

/// Re-checks the final page with the total box included and, if it overflows,
/// moves its last item onto a trailing page of its own. A single item is always
/// accepted, so this splits at most once.
fn settle_last_page(ranges: &mut Vec<Range<usize>>, layouts: &[ItemLayout], rows_available: u32) {
    let Some(last) = ranges.last().cloned() else {
        return;
    };
    if last.len() < 2 || rows_needed(&layouts[last.clone()], true) <= rows_available {
        return;
    }

    debug!(start = last.start, end = last.end, "last page overflows with total box, splitting");
    let split = last.end - 1;
    ranges.pop();
    ranges.push(last.start..split);
    ranges.push(split..last.end);
}

fn build_page(
    index: usize,
    range: Range<usize>,
    is_last_page: bool,
    layouts: &[ItemLayout],
    rows_available: u32,
    multi_page: bool,
) -> Page {
    let page_layouts = &layouts[range.clone()];
    let is_first_page = index == 0;
    let equivalent = equivalent_item_count(page_layouts);
    let spacing = select_spacing(equivalent);
    let rows_used = page_rows(page_layouts, &spacing, is_last_page);
    let oversized = rows_used > rows_available;

    if oversized {
        warn!(
            page = index + 1,
            item = range.start,
            rows_used,
            rows_available,
            "line item does not fit on a single page"
        );
    }

    // Leftover space is only spread out when the invoice spans several pages.
    let spacing_units = if multi_page && !oversized {
        SpacingUnits::stretched(&spacing, range.len(), is_last_page, rows_available - rows_used)
    } else {
        SpacingUnits::from_rule(&spacing)
    };

    Page {
        page_number: index + 1,
        item_range: ItemRange {
            start: range.start,
            count: range.len(),
        },
        is_first_page,
        is_last_page,
        sections: PageSections::for_page(is_first_page, is_last_page),
        equivalent_item_count: equivalent,
        spacing,
        spacing_units,
        rows_used,
        rows_available,
        oversized,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::layout::page_config::MIN_ROWS_AVAILABLE;
    use crate::layout::row_height::estimate;
    use proptest::prelude::*;

    fn arb_item() -> impl Strategy<Value = LineItem> {
        (
            "[a-zA-Z ]{0,90}",
            prop::option::of("[a-z \n]{0,900}"),
        )
            .prop_map(|(title, notes)| LineItem {
                title,
                fee_type: "Professional Fee".to_string(),
                notes,
                ..Default::default()
            })
    }

    fn arb_invoice() -> impl Strategy<Value = (Vec<LineItem>, u32)> {
        (
            prop::collection::vec(arb_item(), 0..30),
            MIN_ROWS_AVAILABLE..90u32,
        )
    }

    proptest! {
        /// Property: pages partition the input in order, with no item split or dropped.
        #[test]
        fn pages_partition_items((items, budget) in arb_invoice()) {
            let layouts: Vec<ItemLayout> = items.iter().map(estimate).collect();
            let pages = allocate(&items, &layouts, budget).unwrap();

            let mut next = 0;
            for page in &pages {
                prop_assert_eq!(page.item_range.start, next);
                next = page.item_range.end();
            }
            prop_assert_eq!(next, items.len());
            if !items.is_empty() {
                prop_assert!(pages.iter().all(|p| p.item_range.count > 0));
            }
        }

        /// Property: only the first page is first, only the final page is last.
        #[test]
        fn first_and_last_flags((items, budget) in arb_invoice()) {
            let layouts: Vec<ItemLayout> = items.iter().map(estimate).collect();
            let pages = allocate(&items, &layouts, budget).unwrap();

            prop_assert_eq!(pages.iter().filter(|p| p.is_first_page).count(), 1);
            prop_assert_eq!(pages.iter().filter(|p| p.is_last_page).count(), 1);
            prop_assert!(pages[0].is_first_page);
            prop_assert!(pages[pages.len() - 1].is_last_page);
        }

        /// Property: a page only exceeds the budget when it holds a single item.
        #[test]
        fn budget_respected_unless_single_item((items, budget) in arb_invoice()) {
            let layouts: Vec<ItemLayout> = items.iter().map(estimate).collect();
            for page in allocate(&items, &layouts, budget).unwrap() {
                if page.rows_used > page.rows_available {
                    prop_assert_eq!(page.item_range.count, 1);
                    prop_assert!(page.oversized);
                }
            }
        }

        /// Property: an invoice that fits one page at its own spacing tier stays on one page.
        #[test]
        fn fitting_invoice_is_single_page((items, budget) in arb_invoice()) {
            let layouts: Vec<ItemLayout> = items.iter().map(estimate).collect();
            if rows_needed(&layouts, true) <= budget {
                prop_assert_eq!(allocate(&items, &layouts, budget).unwrap().len(), 1);
            }
        }

        /// Property: allocation is deterministic.
        #[test]
        fn allocation_is_idempotent((items, budget) in arb_invoice()) {
            let layouts: Vec<ItemLayout> = items.iter().map(estimate).collect();
            prop_assert_eq!(
                allocate(&items, &layouts, budget).unwrap(),
                allocate(&items, &layouts, budget).unwrap()
            );
        }
    }
}
