//! Request pipeline construction.
//!
//! # Responsibilities
//! - Order the three request stages: static assets, documentation, catch-all
//! - Wrap every stage in the shared middleware stack
//!
//! # Design Decisions
//! - Each stage is the fallback of the one before it, so a request reaches
//!   the catch-all only when no earlier stage claimed it
//! - Static assets are mounted only when the web root exists on disk
//! - The pipeline is built once per listener and cloned per connection

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::docs::DocumentationPublisher;
use crate::observability::tracing::RequestSpan;
use crate::routing::dispatch::{dispatch_request, DispatchState};

/// Build the request pipeline of one listener.
#[allow(deprecated)]
pub fn build_pipeline(
    config: &ListenerConfig,
    documentation: Option<&DocumentationPublisher>,
    dispatch: DispatchState,
) -> Router {
    let catch_all = Router::new().fallback(dispatch_request).with_state(dispatch);

    let app = match documentation {
        Some(publisher) => publisher.router().fallback_service(catch_all),
        None => catch_all,
    };

    let mut app = if config.web_root_path.is_dir() {
        tracing::debug!(web_root = %config.web_root_path.display(), "Serving static assets");
        let assets = ServeDir::new(&config.web_root_path)
            .append_index_html_on_directories(false)
            .call_fallback_on_method_not_allowed(true)
            .fallback(app);
        Router::new().fallback_service(assets)
    } else {
        app
    };

    if config.request_timeout_secs > 0 {
        app = app.layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));
    }

    app.layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::{DocumentationConfig, DocumentationInfo};
    use crate::http::{HttpMessageSender, MessageContext, X_REQUEST_ID};
    use crate::service::{JsonSerializer, MessageHandler, ServiceEntry, ServiceModule};

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MessageHandler for CountingHandler {
        async fn on_received(&self, mut sender: HttpMessageSender, context: MessageContext) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = format!("handled {} {}", context.method(), context.path());
            sender.send_bytes(StatusCode::ACCEPTED, body).unwrap();
        }
    }

    fn pipeline(config: &ListenerConfig, docs: Option<&DocumentationPublisher>) -> (Router, Arc<CountingHandler>) {
        let handler = Arc::new(CountingHandler::default());
        let state = DispatchState::new(handler.clone(), Arc::new(JsonSerializer));
        (build_pipeline(config, docs, state), handler)
    }

    fn no_web_root() -> ListenerConfig {
        ListenerConfig {
            web_root_path: "does-not-exist".into(),
            ..ListenerConfig::default()
        }
    }

    fn publisher() -> DocumentationPublisher {
        let config = DocumentationConfig {
            info: Some(DocumentationInfo::new("Svc", "v1")),
            ..DocumentationConfig::default()
        };
        let entries = vec![ServiceEntry::new("Users.Get", "api/user/get", ServiceModule::new("Users"))];
        DocumentationPublisher::from_config(&config, entries).unwrap().unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn unmatched_request_reaches_handler() {
        let (app, handler) = pipeline(&no_web_root(), None);
        let response = app
            .oneshot(Request::post("/api/user/get").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(body_text(response).await, "handled POST /api/user/get");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn doc_like_paths_reach_handler_without_documentation() {
        let (app, handler) = pipeline(&no_web_root(), None);
        for path in ["/swagger/v1/swagger.json", "/swagger-ui", "/swagger-ui/index.html"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED, "{path}");
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn documentation_routes_are_served_before_catch_all() {
        let publisher = publisher();
        let (app, handler) = pipeline(&no_web_root(), Some(&publisher));

        let response = app
            .clone()
            .oneshot(Request::get("/swagger/v1/swagger.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(doc["info"]["title"], "Svc");

        let response = app
            .clone()
            .oneshot(Request::get("/swagger-ui/swagger-config.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Unknown documents are not claimed by the publisher.
        let response = app
            .oneshot(Request::get("/swagger/v2/swagger.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn static_assets_win_and_misses_fall_through() {
        let web_root = tempfile::tempdir().unwrap();
        std::fs::write(web_root.path().join("app.js"), "console.log(1)").unwrap();
        std::fs::create_dir(web_root.path().join("assets")).unwrap();
        std::fs::write(web_root.path().join("assets").join("index.html"), "<html></html>").unwrap();

        let config = ListenerConfig {
            web_root_path: web_root.path().to_path_buf(),
            ..ListenerConfig::default()
        };
        let (app, handler) = pipeline(&config, None);

        let response = app
            .clone()
            .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "console.log(1)");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

        for request in [
            Request::get("/api/user/get").body(Body::empty()).unwrap(),
            Request::post("/app.js").body(Body::empty()).unwrap(),
            Request::get("/assets/").body(Body::empty()).unwrap(),
        ] {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = ListenerConfig {
            max_body_size: 8,
            ..no_web_root()
        };
        let (app, handler) = pipeline(&config, None);
        let response = app
            .oneshot(Request::post("/api/echo").body(Body::from("0123456789abcdef")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn client_request_id_is_kept() {
        let (app, _) = pipeline(&no_web_root(), None);
        let response = app
            .oneshot(
                Request::get("/anything")
                    .header(X_REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }
}
