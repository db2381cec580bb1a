//! Axum route handlers for the Invoice Layout API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Span};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::page_fill::{analyze_page_fill, describe, summarize, PageFillAnalysis, PaginationSummary};
use crate::layout::row_height::estimate;
use crate::layout::{paginate_layouts, paginate_with_cache, ItemLayout, LayoutCache, PageConfig, PaginationResult};
use crate::models::invoice::LineItem;
use crate::state::AppState;

/// Upper bound on invoices in one batch request.
const MAX_BATCH_INVOICES: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateRequest {
    pub items: Vec<LineItem>,
    /// Overrides the configured page budget for this request.
    #[serde(default)]
    pub rows_available: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginateResponse {
    pub request_id: Uuid,
    pub result: PaginationResult,
    /// Per-item layouts, parallel to the request's items.
    pub layouts: Vec<ItemLayout>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceItems {
    pub items: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPaginateRequest {
    pub invoices: Vec<InvoiceItems>,
    #[serde(default)]
    pub rows_available: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPaginateResponse {
    pub request_id: Uuid,
    pub results: Vec<PaginationResult>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: PaginationSummary,
    pub text: String,
    pub fill: Vec<PageFillAnalysis>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/invoices/paginate
///
/// Returns the page manifest and per-item layouts the renderer draws from.
pub async fn handle_paginate(
    State(state): State<AppState>,
    Json(request): Json<PaginateRequest>,
) -> Result<Json<PaginateResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let config = resolve_page_config(&state, request.rows_available)?;
    check_item_count(&state, request.items.len())?;

    let span = info_span!("paginate", %request_id);
    let (layouts, result) = run_pagination(request.items, config, span).await?;

    info!(
        %request_id,
        total_pages = result.total_pages,
        item_count = result.item_count(),
        "invoice paginated"
    );

    Ok(Json(PaginateResponse {
        request_id,
        result,
        layouts,
    }))
}

/// POST /api/v1/invoices/paginate/batch
///
/// Paginates several invoices with one shared layout cache; recurring line
/// items are estimated once.
pub async fn handle_paginate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchPaginateRequest>,
) -> Result<Json<BatchPaginateResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let config = resolve_page_config(&state, request.rows_available)?;

    if request.invoices.len() > MAX_BATCH_INVOICES {
        return Err(AppError::Validation(format!(
            "at most {MAX_BATCH_INVOICES} invoices per batch, got {}",
            request.invoices.len()
        )));
    }
    for invoice in &request.invoices {
        check_item_count(&state, invoice.items.len())?;
    }

    let invoices = request.invoices;
    let span = info_span!("paginate_batch", %request_id, invoices = invoices.len());
    let (results, cache_hits, cache_misses) = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut cache = LayoutCache::new();
        let results = invoices
            .iter()
            .map(|invoice| paginate_with_cache(&invoice.items, &config, &mut cache))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(distinct_layouts = cache.len(), "batch layout cache filled");
        Ok::<_, AppError>((results, cache.hits(), cache.misses()))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in batch pagination: {e}")))??;

    info!(
        %request_id,
        invoices = results.len(),
        cache_hits,
        cache_misses,
        "invoice batch paginated"
    );

    Ok(Json(BatchPaginateResponse {
        request_id,
        results,
        cache_hits,
        cache_misses,
    }))
}

/// POST /api/v1/invoices/summary
///
/// Paginates and returns a readable breakdown, warnings and per-page fill.
pub async fn handle_summary(
    State(state): State<AppState>,
    Json(request): Json<PaginateRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let config = resolve_page_config(&state, request.rows_available)?;
    check_item_count(&state, request.items.len())?;

    let span = info_span!("summary", %request_id);
    let (layouts, result) = run_pagination(request.items, config, span).await?;

    Ok(Json(SummaryResponse {
        summary: summarize(&layouts, &result),
        text: describe(&result),
        fill: result.pages.iter().map(analyze_page_fill).collect(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn resolve_page_config(state: &AppState, rows_available: Option<u32>) -> Result<PageConfig, AppError> {
    match rows_available {
        Some(rows) => Ok(PageConfig::new(rows)?),
        None => Ok(state.page_config),
    }
}

fn check_item_count(state: &AppState, count: usize) -> Result<(), AppError> {
    if count > state.config.max_line_items {
        return Err(AppError::Validation(format!(
            "invoice has {count} line items, the limit is {}",
            state.config.max_line_items
        )));
    }
    Ok(())
}

/// Estimates and paginates on the blocking pool, inside the request's span.
async fn run_pagination(
    items: Vec<LineItem>,
    config: PageConfig,
    span: Span,
) -> Result<(Vec<ItemLayout>, PaginationResult), AppError> {
    tokio::task::spawn_blocking(move || paginate_in_span(&span, &items, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}")))?
}

fn paginate_in_span(
    span: &Span,
    items: &[LineItem],
    config: &PageConfig,
) -> Result<(Vec<ItemLayout>, PaginationResult), AppError> {
    let _entered = span.enter();
    let layouts: Vec<ItemLayout> = items.iter().map(estimate).collect();
    let result = paginate_layouts(items, &layouts, config)?;
    Ok((layouts, result))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    /// Records the name of every span enclosing each event.
    #[derive(Clone, Default)]
    struct EnclosingSpans(Arc<Mutex<Vec<String>>>);

    impl<S> Layer<S> for EnclosingSpans
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            if let Some(scope) = ctx.event_scope(event) {
                let mut names = self.0.lock().unwrap();
                names.extend(scope.map(|span| span.name().to_string()));
            }
        }
    }

    #[test]
    fn test_engine_logs_inside_request_span() {
        let recorded = EnclosingSpans::default();
        let subscriber = tracing_subscriber::registry().with(recorded.clone());
        let items: Vec<LineItem> = (0..3)
            .map(|i| LineItem {
                title: format!("Service {}", i + 1),
                ..Default::default()
            })
            .collect();

        let (layouts, result) = tracing::subscriber::with_default(subscriber, || {
            let span = info_span!("paginate", request_id = %Uuid::new_v4());
            paginate_in_span(&span, &items, &PageConfig::default())
        })
        .unwrap();

        assert_eq!(layouts.len(), 3);
        assert_eq!(result.total_pages, 1);
        let names = recorded.0.lock().unwrap();
        assert!(!names.is_empty());
        assert!(names.iter().all(|name| name == "paginate"));
    }
}
