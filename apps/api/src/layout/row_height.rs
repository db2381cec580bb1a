//! Row-height estimation for invoice line items.
//!
//! Heights come from character counts against fixed characters-per-line
//! constants, modelling the monospace columns the renderer prints into. This is
//! an intentional approximation layer: the renderer wraps text under the same
//! fixed-width assumption, so real glyph metrics here would make the two
//! disagree.
//!
//! All heights are in layout units (see `page_config`).

use serde::Serialize;

use crate::layout::page_config::{units_to_rows, ROW_HEIGHT};
use crate::models::invoice::LineItem;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

/// Title row height for titles that fit on one line.
pub const TITLE_BASE_HEIGHT: u32 = 35;
/// Titles up to this many characters never wrap.
pub const TITLE_WRAP_THRESHOLD: usize = 45;
/// Characters per wrapped title line (19pt across columns A–H).
pub const TITLE_CHARS_PER_LINE: usize = 28;
/// Wrapped title line height in half units (32.5 units: 25-unit glyphs at 1.3 line height).
pub const TITLE_LINE_HEIGHT_HALVES: u32 = 65;
pub const TITLE_PADDING: u32 = 4;

/// The fee-type row under the title never changes height.
pub const FEE_TYPE_ROW_HEIGHT: u32 = 24;

/// Characters per notes line in the single-column layout (456-unit column, 8 units per char).
pub const NOTES_CHARS_PER_LINE: usize = 57;
/// Characters per notes line in each half of the two-column layout.
pub const NOTES_TWO_COLUMN_CHARS_PER_LINE: usize = 32;
pub const NOTES_LINE_HEIGHT: u32 = 16;
/// Floor for any non-empty notes block: one spacer row.
pub const NOTES_MIN_HEIGHT: u32 = ROW_HEIGHT;
/// Single-column notes taller than this switch to two columns.
pub const TWO_COLUMN_THRESHOLD: u32 = 120;
pub const TWO_COLUMN_PADDING: u32 = 8;

/// Rows taken by an item with a short title and no notes.
pub const BASE_ITEM_ROWS: u32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Estimated vertical footprint of one line item.
///
/// Depends only on the item's title and notes, never on where the item lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLayout {
    pub title_row_height: u32,
    /// 0 when the item has no printable notes.
    pub notes_height: u32,
    pub notes_uses_two_columns: bool,
    /// Wrapped line count under the single-column assumption.
    pub notes_line_count: u32,
}

impl ItemLayout {
    /// Total height in layout units: title row + fee-type row + notes.
    pub fn height(&self) -> u32 {
        self.title_row_height + FEE_TYPE_ROW_HEIGHT + self.notes_height
    }

    /// Height rounded up to whole rows, the unit the page budget is counted in.
    pub fn rows(&self) -> u32 {
        units_to_rows(self.height())
    }

    /// Weight of this item when picking a spacing tier.
    ///
    /// A base item weighs 1; every full `BASE_ITEM_ROWS` of extra height adds one.
    /// Notes are counted at their single-column height, so switching to two
    /// columns never makes a longer note weigh less.
    pub fn equivalent_items(&self) -> u32 {
        let notes_units = if self.notes_line_count == 0 {
            0
        } else {
            (self.notes_line_count * NOTES_LINE_HEIGHT).max(NOTES_MIN_HEIGHT)
        };
        let rows = units_to_rows(self.title_row_height + FEE_TYPE_ROW_HEIGHT + notes_units);
        1 + rows.saturating_sub(BASE_ITEM_ROWS) / BASE_ITEM_ROWS
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Estimation
// ────────────────────────────────────────────────────────────────────────────

/// Estimates the layout of a single line item.
pub fn estimate(item: &LineItem) -> ItemLayout {
    let title_row_height = title_row_height(&item.title);

    let Some(notes) = item.printable_notes() else {
        return ItemLayout {
            title_row_height,
            notes_height: 0,
            notes_uses_two_columns: false,
            notes_line_count: 0,
        };
    };

    let notes_line_count = wrapped_line_count(notes, NOTES_CHARS_PER_LINE);
    let single_column_height = (notes_line_count * NOTES_LINE_HEIGHT).max(NOTES_MIN_HEIGHT);

    let (notes_height, notes_uses_two_columns) = if single_column_height > TWO_COLUMN_THRESHOLD {
        // Narrower columns wrap sooner; the two halves then share the height.
        let lines = wrapped_line_count(notes, NOTES_TWO_COLUMN_CHARS_PER_LINE);
        let height = (lines * NOTES_LINE_HEIGHT).div_ceil(2) + TWO_COLUMN_PADDING;
        (height.max(NOTES_MIN_HEIGHT), true)
    } else {
        (single_column_height, false)
    };

    ItemLayout {
        title_row_height,
        notes_height,
        notes_uses_two_columns,
        notes_line_count,
    }
}

/// Title row height: fixed for short titles, grown by wrapped line count otherwise.
pub fn title_row_height(title: &str) -> u32 {
    let len = title.chars().count();
    if len <= TITLE_WRAP_THRESHOLD {
        return TITLE_BASE_HEIGHT;
    }
    let lines = len.div_ceil(TITLE_CHARS_PER_LINE) as u32;
    ((lines * TITLE_LINE_HEIGHT_HALVES).div_ceil(2) + TITLE_PADDING).max(TITLE_BASE_HEIGHT)
}

/// Counts printed lines for `text` wrapped at `chars_per_line`.
///
/// Explicit line breaks are honoured and an empty line still takes one line.
fn wrapped_line_count(text: &str, chars_per_line: usize) -> u32 {
    text.split('\n')
        .map(|line| {
            let len = line.trim_end_matches('\r').chars().count();
            len.div_ceil(chars_per_line).max(1) as u32
        })
        .sum()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
