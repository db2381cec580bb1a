//! Spacing tiers for invoice pages.
//!
//! Sparse pages get more breathing room; dense pages compress spacing so the
//! rows go to content. The tier values are visual-design decisions, not derived
//! constants.

use serde::Serialize;

use crate::layout::page_config::ROW_HEIGHT;
use crate::layout::row_height::ItemLayout;

/// Spacer rows around and between the items of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingRule {
    /// Rows between the table header and the first item.
    pub pre_item: u32,
    /// Rows between consecutive items on the same page.
    pub between_items: u32,
    /// Rows between the last item and the total box.
    pub before_total: u32,
    /// Rows between the total box and the footer.
    pub after_total: u32,
}

const TIERS: [SpacingRule; 5] = [
    SpacingRule { pre_item: 3, between_items: 0, before_total: 3, after_total: 2 },
    SpacingRule { pre_item: 2, between_items: 2, before_total: 3, after_total: 2 },
    SpacingRule { pre_item: 1, between_items: 2, before_total: 2, after_total: 2 },
    SpacingRule { pre_item: 1, between_items: 1, before_total: 2, after_total: 1 },
    SpacingRule { pre_item: 1, between_items: 1, before_total: 1, after_total: 1 },
];

/// Picks the spacing tier for a page with the given equivalent item count.
///
/// Counts of 0 and 1 share the first tier; anything at or past 5 uses the last.
pub fn select_spacing(equivalent_item_count: u32) -> SpacingRule {
    let tier = (equivalent_item_count.max(1) as usize).min(TIERS.len());
    TIERS[tier - 1]
}

/// Sum of the spacing weights of a page's items.
pub fn equivalent_item_count(layouts: &[ItemLayout]) -> u32 {
    layouts.iter().map(ItemLayout::equivalent_items).sum()
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution into layout units
// ────────────────────────────────────────────────────────────────────────────

/// A page's spacing resolved to layout units, after any stretching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingUnits {
    pub pre_item: u32,
    pub between_items: u32,
    pub before_total: u32,
    pub after_total: u32,
    /// True when leftover page space was distributed into the slots.
    pub stretched: bool,
}

impl SpacingUnits {
    /// Plain conversion of a rule, without stretching.
    pub fn from_rule(rule: &SpacingRule) -> Self {
        Self {
            pre_item: rule.pre_item * ROW_HEIGHT,
            between_items: rule.between_items * ROW_HEIGHT,
            before_total: rule.before_total * ROW_HEIGHT,
            after_total: rule.after_total * ROW_HEIGHT,
            stretched: false,
        }
    }

    /// Spreads `spare_rows` of leftover page space evenly over the spacing slots.
    ///
    /// Slots: one pre-item, one per gap between items, one before the total or
    /// footer, and one after the total box when the page carries it.
    pub fn stretched(rule: &SpacingRule, item_count: usize, has_total_box: bool, spare_rows: u32) -> Self {
        let base = Self::from_rule(rule);
        let gaps = item_count.saturating_sub(1) as u32;
        let slots = 1 + gaps + 1 + u32::from(has_total_box);
        let extra = spare_rows * ROW_HEIGHT / slots;
        if extra == 0 {
            return base;
        }

        Self {
            pre_item: base.pre_item + extra,
            between_items: base.between_items + extra,
            before_total: base.before_total + extra,
            after_total: base.after_total + if has_total_box { extra } else { 0 },
            stretched: true,
        }
    }
}
