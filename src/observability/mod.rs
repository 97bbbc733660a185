//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! listener lifecycle, pipeline, dispatch, docs
//!     → logging.rs (global subscriber: pretty / compact / json)
//!     → tracing.rs (one span per request, tagged with x-request-id)
//!     → metrics.rs (dispatch counts and latency, doc hits, open connections)
//!
//! Sinks:
//!     → stdout
//!     → Prometheus exporter on its own address, when enabled
//! ```
//!
//! # Design Decisions
//! - Handler logs run inside the request span, so they carry the request ID
//! - Recording metrics without an installed exporter costs nothing

pub mod logging;
pub mod metrics;
pub mod tracing;
