//! API documentation publishing.
//!
//! # Data Flow
//! ```text
//! ServiceEntryProvider snapshot
//!     → grouping.rs (primary document + one per module title)
//!     → document.rs (OpenAPI document per group)
//!     → viewer.rs (links, swagger-ui page, swagger-config.json)
//!     → publisher.rs (exact GET routes mounted ahead of the catch-all)
//! ```

pub mod document;
pub mod grouping;
pub mod publisher;
pub mod viewer;

pub use document::{ApiDocument, NameStyle};
pub use grouping::DocumentGroups;
pub use publisher::{DocumentationError, DocumentationPublisher, PublishedDocument};
pub use viewer::ViewerLink;
