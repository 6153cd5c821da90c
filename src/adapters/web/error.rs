//! HTTP error responses for the web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::domain::error::TrackerError;

use super::templates::ErrorTemplate;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &TrackerError) -> StatusCode {
    match err {
        TrackerError::DataUnavailable { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TrackerError> for WebError {
    fn from(err: TrackerError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, "request failed");
        }
        let template = ErrorTemplate {
            title: "Stock Portfolio Tracker",
            message: &self.message,
            status: self.status.as_u16(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failure_maps_to_bad_gateway() {
        let err = TrackerError::DataUnavailable {
            symbol: "AAPL".into(),
            reason: "timeout".into(),
        };
        let web: WebError = err.into();
        assert_eq!(web.status, StatusCode::BAD_GATEWAY);
        assert!(web.message.contains("AAPL"));
    }

    #[test]
    fn other_errors_map_to_internal() {
        let err = TrackerError::ConfigMissing {
            section: "portfolio".into(),
            key: "symbols".into(),
        };
        assert_eq!(status_from_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_status() {
        let response = WebError::not_found("Page not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
