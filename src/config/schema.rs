//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::service::ServiceEntry;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, limits, web root).
    pub listener: ListenerConfig,

    /// API documentation publishing.
    pub documentation: DocumentationConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Statically declared service entries.
    pub entries: Vec<ServiceEntry>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8001").
    pub bind_address: String,

    /// Directory served as static assets when it exists on disk.
    pub web_root_path: PathBuf,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Request timeout in seconds. 0 disables the timeout.
    pub request_timeout_secs: u64,

    /// How long dispose waits for connections to drain.
    pub shutdown_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8001".to_string(),
            web_root_path: PathBuf::from("wwwroot"),
            max_connections: 10_000,
            max_body_size: 4 * 1024 * 1024,
            request_timeout_secs: 0,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Documentation publishing configuration.
///
/// Publishing is enabled when either `info` or `defaults` is present;
/// `info` wins when both are.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DocumentationConfig {
    pub info: Option<DocumentationInfo>,

    /// Fallback document description.
    pub defaults: Option<DocumentationInfo>,

    pub options: Option<DocumentationOptions>,
}

impl DocumentationConfig {
    /// The document description in effect, if documentation is enabled.
    pub fn resolved_info(&self) -> Option<&DocumentationInfo> {
        self.info.as_ref().or(self.defaults.as_ref())
    }
}

/// Describes the primary API document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DocumentationInfo {
    pub title: String,

    /// Version identifier; also names the primary document.
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl DocumentationInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }
}

/// Documentation routing and rendering options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentationOptions {
    /// Strip namespaces from type and module names.
    pub ignore_fully_qualified: bool,

    /// Path prefix the gateway is exposed under by an ingress.
    pub ingress_name: Option<String>,

    /// First path segment of document routes.
    pub route_prefix: String,

    /// Last path segment of document routes.
    pub document_file: String,

    /// Path segment of the interactive viewer.
    pub viewer_path: String,
}

impl Default for DocumentationOptions {
    fn default() -> Self {
        Self {
            ignore_fully_qualified: false,
            ingress_name: None,
            route_prefix: "swagger".to_string(),
            document_file: "swagger.json".to_string(),
            viewer_path: "swagger-ui".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
