//! Documentation publishing.
//!
//! # Responsibilities
//! - Generate every document once from the entry snapshot
//! - Mount one exact GET route per document plus the viewer routes
//! - Build viewer links, prefixed by the ingress name when configured
//!
//! # Design Decisions
//! - Documents are rendered to JSON up front; serving never regenerates
//! - Routes are exact so unknown doc-like paths fall through to the catch-all

use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::config::{validate_documentation, DocumentationConfig, DocumentationOptions, ValidationError};
use crate::docs::document::{self, ApiInfo, NameStyle};
use crate::docs::grouping::DocumentGroups;
use crate::docs::viewer::{self, ViewerConfig, ViewerLink};
use crate::observability::metrics;
use crate::service::ServiceEntry;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, thiserror::Error)]
pub enum DocumentationError {
    #[error("invalid documentation configuration: {}", join(.0))]
    Invalid(Vec<ValidationError>),
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to render viewer: {0}")]
    Template(#[from] minijinja::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A generated document and the route it is served on.
#[derive(Debug, Clone)]
pub struct PublishedDocument {
    pub name: String,
    /// Route path on this listener (no ingress prefix).
    pub route: String,
    pub body: Bytes,
}

/// Snapshot of every document, the viewer page and its link list.
#[derive(Debug, Clone)]
pub struct DocumentationPublisher {
    documents: Vec<PublishedDocument>,
    links: Vec<ViewerLink>,
    viewer_routes: [String; 2],
    viewer_html: String,
    config_route: String,
    config_body: Bytes,
}

impl DocumentationPublisher {
    /// Build the publisher, or `None` when neither `info` nor `defaults`
    /// is configured.
    pub fn from_config(
        config: &DocumentationConfig,
        entries: Vec<ServiceEntry>,
    ) -> Result<Option<Self>, DocumentationError> {
        let Some(info) = config.resolved_info() else {
            return Ok(None);
        };

        let mut errors = Vec::new();
        validate_documentation(config, &mut errors);
        if !errors.is_empty() {
            return Err(DocumentationError::Invalid(errors));
        }

        let options = config.options.clone().unwrap_or_default();
        let style = NameStyle {
            ignore_fully_qualified: options.ignore_fully_qualified,
        };
        let ingress = options.ingress_name.as_deref();
        let groups = DocumentGroups::compute(&info.version, &entries);

        let mut documents = Vec::new();
        for name in groups.document_names() {
            let api_info = ApiInfo {
                title: if name == groups.primary() {
                    info.title.clone()
                } else {
                    name.to_string()
                },
                version: info.version.clone(),
                description: info.description.clone(),
            };
            let doc = document::generate(api_info, &groups.entries_for(name, &entries), style);
            documents.push(PublishedDocument {
                name: name.to_string(),
                route: document_route(&options, name),
                body: Bytes::from(serde_json::to_vec(&doc)?),
            });
        }

        let mut links = vec![ViewerLink {
            name: info.title.clone(),
            url: viewer::with_ingress(ingress, &document_route(&options, groups.primary())),
        }];
        links.extend(groups.document_names().skip(1).map(|name| ViewerLink {
            name: name.to_string(),
            url: viewer::with_ingress(ingress, &document_route(&options, name)),
        }));
        links.extend(entries.iter().map(|entry| {
            let doc_route = document_route(&options, groups.document_for(entry));
            ViewerLink {
                name: entry.id.clone(),
                url: format!(
                    "{}{}",
                    viewer::with_ingress(ingress, &doc_route),
                    document::operation_anchor(entry, style)
                ),
            }
        }));

        let viewer_root = format!("/{}", options.viewer_path);
        let config_route = format!("{viewer_root}/{}", viewer::CONFIG_FILE);
        let viewer_html = viewer::render(&info.title, &links, &viewer::with_ingress(ingress, &config_route))?;
        let config_body = Bytes::from(serde_json::to_vec(&ViewerConfig {
            urls: links.clone(),
            deep_linking: true,
        })?);

        tracing::debug!(
            documents = documents.len(),
            links = links.len(),
            viewer = %viewer_root,
            "Documentation generated"
        );

        Ok(Some(Self {
            documents,
            links,
            viewer_routes: [viewer_root.clone(), format!("{viewer_root}/index.html")],
            viewer_html,
            config_route,
            config_body,
        }))
    }

    pub fn documents(&self) -> &[PublishedDocument] {
        &self.documents
    }

    /// Viewer links: the primary document, each titled document, then one
    /// per entry.
    pub fn links(&self) -> &[ViewerLink] {
        &self.links
    }

    /// Routes serving documents, the viewer and its config.
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for doc in &self.documents {
            let name: Arc<str> = Arc::from(doc.name.as_str());
            let body = doc.body.clone();
            router = router.route(
                &doc.route,
                get(move || {
                    let name = name.clone();
                    let body = body.clone();
                    async move {
                        metrics::record_document_served(&name);
                        json_response(body)
                    }
                }),
            );
        }

        let html = Arc::new(self.viewer_html.clone());
        for route in &self.viewer_routes {
            let html = html.clone();
            router = router.route(route, get(move || async move { Html(html.as_str().to_owned()) }));
        }

        let config_body = self.config_body.clone();
        router.route(
            &self.config_route,
            get(move || async move { json_response(config_body) }),
        )
    }
}

fn document_route(options: &DocumentationOptions, document: &str) -> String {
    format!(
        "/{}/{}/{}",
        options.route_prefix,
        urlencoding::encode(document),
        options.document_file
    )
}

fn json_response(body: Bytes) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}
