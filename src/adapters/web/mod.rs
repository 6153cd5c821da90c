//! Web server adapter.
//!
//! A single page at `/` recomputes the whole analysis on every request and
//! renders it with Askama.

mod error;
mod handlers;
mod templates;

pub use error::{WebError, status_from_error};
pub use handlers::*;
pub use templates::*;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::config::TrackerConfig;
use crate::ports::market_data_port::MarketDataPort;

pub struct AppState {
    pub market_data: Arc<dyn MarketDataPort + Send + Sync>,
    pub config: Arc<TrackerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
