//! Packages allocated pages into the result handed to the renderer.
//!
//! Pure bookkeeping. The structural checks here catch allocator bugs; a failed
//! check is reported as `LayoutError::Invariant` and never repaired.

use serde::Serialize;

use crate::layout::allocator::Page;
use crate::layout::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    SinglePage,
    MultiPage,
}

/// The engine's output: the ordered per-page manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub pages: Vec<Page>,
    pub total_pages: usize,
    /// Item count per page, in page order.
    pub item_distribution: Vec<usize>,
    pub layout_mode: LayoutMode,
}

impl PaginationResult {
    pub fn item_count(&self) -> usize {
        self.item_distribution.iter().sum()
    }
}

/// Builds the result, verifying the pages form a valid manifest first.
pub fn assemble(pages: Vec<Page>) -> Result<PaginationResult, LayoutError> {
    validate(&pages)?;

    let total_pages = pages.len();
    let item_distribution = pages.iter().map(|p| p.item_range.count).collect();
    let layout_mode = if total_pages == 1 {
        LayoutMode::SinglePage
    } else {
        LayoutMode::MultiPage
    };

    Ok(PaginationResult {
        pages,
        total_pages,
        item_distribution,
        layout_mode,
    })
}

fn validate(pages: &[Page]) -> Result<(), LayoutError> {
    let Some(last_index) = pages.len().checked_sub(1) else {
        return Err(invariant("no pages were produced".to_string()));
    };

    let mut next_item = 0;
    for (index, page) in pages.iter().enumerate() {
        if page.page_number != index + 1 {
            return Err(invariant(format!(
                "page at position {index} is numbered {}",
                page.page_number
            )));
        }
        if page.item_range.start != next_item {
            return Err(invariant(format!(
                "page {} starts at item {} but item {next_item} is next",
                page.page_number, page.item_range.start
            )));
        }
        if page.item_range.count == 0 && pages.len() > 1 {
            return Err(invariant(format!("page {} holds no items", page.page_number)));
        }
        if page.is_first_page != (index == 0) {
            return Err(invariant(format!(
                "page {} has is_first_page = {}",
                page.page_number, page.is_first_page
            )));
        }
        if page.is_last_page != (index == last_index) {
            return Err(invariant(format!(
                "page {} has is_last_page = {}",
                page.page_number, page.is_last_page
            )));
        }
        next_item = page.item_range.end();
    }
    Ok(())
}

fn invariant(message: String) -> LayoutError {
    tracing::error!("pagination invariant violated: {message}");
    LayoutError::Invariant(message)
}
