//! Request spans.
//!
//! Every request handled by the pipeline runs inside a span carrying its
//! method, path and request ID, so handler logs correlate with access logs.

use axum::http::Request;
use tower_http::trace::MakeSpan;
use tracing::Span;

use crate::http::X_REQUEST_ID;

/// Builds the per-request span used by the pipeline's `TraceLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    }
}
