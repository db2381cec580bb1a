// Invoice pagination engine.
// Pure and synchronous: estimate item heights, break pages, assemble the manifest.
// Handlers run it inside tokio::task::spawn_blocking.

pub mod allocator;
pub mod assembler;
pub mod cache;
pub mod handlers;
pub mod page_config;
pub mod page_fill;
pub mod row_height;
pub mod spacing;

use thiserror::Error;

use crate::models::invoice::LineItem;

pub use assembler::PaginationResult;
pub use cache::LayoutCache;
pub use page_config::PageConfig;
pub use row_height::ItemLayout;

/// Errors raised by the pagination engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("rows_available {rows_available} is below the minimum of {minimum}")]
    RowBudgetTooSmall { rows_available: u32, minimum: u32 },

    #[error("{items} line items but {layouts} item layouts")]
    LayoutMismatch { items: usize, layouts: usize },

    #[error("pagination invariant violated: {0}")]
    Invariant(String),
}

/// Paginates an invoice's line items onto pages of `config.rows_available()` rows.
pub fn paginate(items: &[LineItem], config: &PageConfig) -> Result<PaginationResult, LayoutError> {
    let layouts: Vec<ItemLayout> = items.iter().map(row_height::estimate).collect();
    paginate_layouts(items, &layouts, config)
}

/// Same as [`paginate`], reusing and filling `cache` for the height estimates.
pub fn paginate_with_cache(
    items: &[LineItem],
    config: &PageConfig,
    cache: &mut LayoutCache,
) -> Result<PaginationResult, LayoutError> {
    let layouts = cache.estimate_all(items);
    paginate_layouts(items, &layouts, config)
}

/// Paginates with layouts the caller already estimated.
pub fn paginate_layouts(
    items: &[LineItem],
    layouts: &[ItemLayout],
    config: &PageConfig,
) -> Result<PaginationResult, LayoutError> {
    let pages = allocator::allocate(items, layouts, config.rows_available())?;
    assembler::assemble(pages)
}
