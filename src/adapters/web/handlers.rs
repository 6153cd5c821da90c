//! HTTP request handlers for the web adapter.

use askama::Template;
use axum::{
    extract::State,
    response::Html,
};
use std::sync::Arc;
use tracing::debug;

use crate::domain::analysis::analyze;

use super::templates::IndexTemplate;
use super::{AppState, WebError};

/// Fetches fresh market data and renders the full report.
///
/// The pipeline does blocking I/O, so it runs off the async executor.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    let worker = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        analyze(&*worker.market_data, &worker.config)
    })
    .await
    .map_err(|e| WebError::internal(format!("analysis task failed: {e}")))??;

    debug!(
        signals = report.signal_count(),
        trades = report.trade_history.len(),
        "rendering report"
    );
    let template = IndexTemplate::from_report(&report, &state.config);
    template
        .render()
        .map(Html)
        .map_err(|e| WebError::internal(format!("template error: {e}")))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
