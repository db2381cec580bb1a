pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::layout::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Invoice layout API
        .route("/api/v1/invoices/paginate", post(handlers::handle_paginate))
        .route(
            "/api/v1/invoices/paginate/batch",
            post(handlers::handle_paginate_batch),
        )
        .route("/api/v1/invoices/summary", post(handlers::handle_summary))
        .fallback(not_found)
        .with_state(state)
}
