//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, limits and documentation route segments
//! - Detect duplicate entry ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::schema::{DocumentationConfig, GatewayConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not an ip:port address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }

    validate_documentation(&config.documentation, &mut errors);

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("invalid filter '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not an ip:port address", config.observability.metrics_address),
        ));
    }

    let mut seen = HashSet::new();
    for entry in &config.entries {
        if !seen.insert(entry.id.as_str()) {
            errors.push(ValidationError::new("entries", format!("duplicate entry id '{}'", entry.id)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Documentation checks shared with the publisher, which refuses to mount
/// routes from an invalid description.
pub fn validate_documentation(config: &DocumentationConfig, errors: &mut Vec<ValidationError>) {
    for (field, info) in [("documentation.info", &config.info), ("documentation.defaults", &config.defaults)] {
        let Some(info) = info else { continue };
        if info.title.trim().is_empty() {
            errors.push(ValidationError::new(format!("{field}.title"), "must not be empty"));
        }
        if info.version.trim().is_empty() {
            errors.push(ValidationError::new(format!("{field}.version"), "must not be empty"));
        }
    }

    let Some(options) = &config.options else { return };
    for (field, value) in [
        ("documentation.options.route_prefix", &options.route_prefix),
        ("documentation.options.document_file", &options.document_file),
        ("documentation.options.viewer_path", &options.viewer_path),
    ] {
        if !is_single_segment(value) {
            errors.push(ValidationError::new(field, format!("'{value}' must be a single non-empty path segment")));
        }
    }
    if options.route_prefix == options.viewer_path {
        errors.push(ValidationError::new(
            "documentation.options.viewer_path",
            "must differ from route_prefix",
        ));
    }
    if let Some(ingress) = &options.ingress_name {
        if ingress.is_empty() || ingress.starts_with('/') || ingress.ends_with('/') {
            errors.push(ValidationError::new(
                "documentation.options.ingress_name",
                format!("'{ingress}' must be non-empty without leading or trailing '/'"),
            ));
        }
    }
}

fn is_single_segment(value: &str) -> bool {
    !value.is_empty()
        && !value.contains('/')
        && !value.starts_with(':')
        && !value.starts_with('*')
        && !value.contains(|c: char| c == '{' || c == '}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DocumentationInfo, DocumentationOptions};
    use crate::service::{ServiceEntry, ServiceModule};

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost".into();
        config.listener.max_connections = 0;
        config.observability.log_level = "rpc_http_gateway=loud".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["listener.bind_address", "listener.max_connections", "observability.log_level"]
        );
    }

    #[test]
    fn rejects_bad_documentation_segments() {
        let mut config = GatewayConfig::default();
        config.documentation.info = Some(DocumentationInfo::new("", "v1"));
        config.documentation.options = Some(DocumentationOptions {
            route_prefix: "docs/api".into(),
            viewer_path: "docs/api".into(),
            ingress_name: Some("/orders/".into()),
            ..DocumentationOptions::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().any(|e| e.field == "documentation.info.title"));
        assert!(errors.iter().any(|e| e.field == "documentation.options.ingress_name"));
    }

    #[test]
    fn rejects_duplicate_entries() {
        let mut config = GatewayConfig::default();
        let entry = ServiceEntry::new("Users.Get", "api/user/get", ServiceModule::new("Users"));
        config.entries = vec![entry.clone(), entry];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].message, "duplicate entry id 'Users.Get'");
    }
}
