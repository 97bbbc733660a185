//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → passed by value to the listener and observability setup
//! ```
//!
//! # Design Decisions
//! - Config is an explicit value handed to each component, never global state
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DocumentationConfig, DocumentationInfo, DocumentationOptions, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig,
};
pub use validation::{validate_config, validate_documentation, ValidationError};
