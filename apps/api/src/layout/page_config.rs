//! Page budget and the fixed layout constants shared by the estimator, the
//! spacing selector and the allocator.
//!
//! Heights are measured in layout units (one unit ≈ one pixel at the reference
//! print scale). Page budgets and spacing are counted in rows of `ROW_HEIGHT`
//! units, matching the spacer rows the renderer emits.

use serde::Serialize;

use crate::layout::LayoutError;

/// Height of one spacer row, in layout units.
pub const ROW_HEIGHT: u32 = 21;

/// Rows taken by the total box (22 + 34 + 22 units).
pub const TOTAL_BOX_ROWS: u32 = 4;

/// Body rows on an A4 page at the reference scale.
pub const DEFAULT_ROWS_AVAILABLE: u32 = 51;

/// Smallest budget that still holds a final page with one base-height item at
/// the roomiest spacing tier: 3 pre-item + 3 item + 3 before-total + 4 total box
/// + 2 after-total.
pub const MIN_ROWS_AVAILABLE: u32 = 15;

/// Validated per-page row budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    rows_available: u32,
}

impl PageConfig {
    pub fn new(rows_available: u32) -> Result<Self, LayoutError> {
        check_row_budget(rows_available)?;
        Ok(Self { rows_available })
    }

    pub fn rows_available(&self) -> u32 {
        self.rows_available
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            rows_available: DEFAULT_ROWS_AVAILABLE,
        }
    }
}

/// Rejects budgets too small to hold a single minimal final page.
pub fn check_row_budget(rows_available: u32) -> Result<(), LayoutError> {
    if rows_available < MIN_ROWS_AVAILABLE {
        return Err(LayoutError::RowBudgetTooSmall {
            rows_available,
            minimum: MIN_ROWS_AVAILABLE,
        });
    }
    Ok(())
}

/// Converts a height in layout units to whole rows, rounding up.
pub fn units_to_rows(units: u32) -> u32 {
    units.div_ceil(ROW_HEIGHT)
}
