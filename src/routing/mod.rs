//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → request id / trace / body limit / timeout layers
//!     → static assets (ServeDir, when the web root exists)
//!     → documentation routes (exact matches only)
//!     → dispatch.rs (catch-all → MessageHandler)
//! ```
//!
//! # Design Decisions
//! - The pipeline is compiled once at start and immutable afterwards
//! - Deterministic: a path claimed by an earlier stage never reaches a later one

pub mod dispatch;
pub mod router;

pub use dispatch::{dispatch_request, DispatchState};
pub use router::build_pipeline;
