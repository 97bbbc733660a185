//! Documentation routes over real sockets.

use std::sync::Arc;

use axum::http::StatusCode;
use rpc_http_gateway::config::{DocumentationInfo, DocumentationOptions, GatewayConfig};
use rpc_http_gateway::service::{InMemoryEntryRegistry, ServiceEntry, ServiceModule};

mod common;

use common::{any_port, client, test_config, url, RecordingHandler};

fn documented_config() -> GatewayConfig {
    let mut config = test_config();
    config.documentation.info = Some(DocumentationInfo::new("Acme Platform", "v1"));
    config
}

fn user_entry(id: &str, path: &str) -> ServiceEntry {
    ServiceEntry::new(id, path, ServiceModule::titled("Acme.IUserService", "Users"))
}

#[tokio::test]
async fn document_reflects_entries_at_start() {
    let registry = Arc::new(InMemoryEntryRegistry::with_entries([user_entry("Users.Get", "api/user/get")]));
    let test = common::listener_with_registry(&documented_config(), RecordingHandler::ok(""), registry);

    let addr = test.listener.start(any_port()).unwrap();
    // Registered after the snapshot: not expected in the document.
    test.registry.register(user_entry("Users.Delete", "api/user/delete"));
    test.lifetime.notify_started();
    common::wait_for_state(&test.listener, rpc_http_gateway::http::ListenerState::Accepting).await;

    let response = client().get(url(addr, "/swagger/v1/swagger.json")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc: serde_json::Value = response.json().await.unwrap();

    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/api/user/get"]);
    assert_eq!(doc["info"]["title"], "Acme Platform");
    assert_eq!(doc["info"]["version"], "v1");
}

#[tokio::test]
async fn viewer_lists_primary_and_entry_links() {
    let registry = Arc::new(InMemoryEntryRegistry::with_entries([
        user_entry("Users.Get", "api/user/get"),
        ServiceEntry::new("Orders.List", "api/order/list", ServiceModule::new("Acme.IOrderService")),
    ]));
    let test = common::listener_with_registry(&documented_config(), RecordingHandler::ok(""), registry);
    let addr = test.serve().await;
    let client = client();

    let config: serde_json::Value = client
        .get(url(addr, "/swagger-ui/swagger-config.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let urls = config["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 4);
    assert_eq!(urls[0]["name"], "Acme Platform");
    assert_eq!(urls[0]["url"], "/swagger/v1/swagger.json");
    assert_eq!(urls[1]["name"], "Users");
    assert_eq!(urls[1]["url"], "/swagger/Users/swagger.json");
    assert_eq!(urls[2]["url"], "/swagger/Users/swagger.json#/Acme.IUserService/Users.Get");
    assert_eq!(urls[3]["url"], "/swagger/v1/swagger.json#/Acme.IOrderService/Orders.List");

    for path in ["/swagger-ui", "/swagger-ui/index.html"] {
        let response = client.get(url(addr, path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = response.text().await.unwrap();
        assert!(html.contains("Acme Platform"));
        assert!(html.contains("swagger-config.json"));
    }
}

#[tokio::test]
async fn titled_document_contains_only_its_group() {
    let registry = Arc::new(InMemoryEntryRegistry::with_entries([
        user_entry("Users.Get", "api/user/get"),
        ServiceEntry::new("Orders.List", "api/order/list", ServiceModule::new("Acme.IOrderService")),
    ]));
    let mut config = documented_config();
    config.documentation.options = Some(DocumentationOptions {
        ignore_fully_qualified: true,
        ..DocumentationOptions::default()
    });
    let test = common::listener_with_registry(&config, RecordingHandler::ok(""), registry);
    let addr = test.serve().await;

    let doc: serde_json::Value = client()
        .get(url(addr, "/swagger/Users/swagger.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/api/user/get"]);
    assert_eq!(doc["tags"][0]["name"], "IUserService");
}

#[tokio::test]
async fn without_documentation_doc_paths_reach_handler() {
    let handler = RecordingHandler::ok("from handler");
    let test = common::listener(&test_config(), handler.clone());
    let addr = test.serve().await;
    let client = client();

    for path in ["/swagger/v1/swagger.json", "/swagger-ui", "/swagger-ui/swagger-config.json"] {
        let response = client.get(url(addr, path)).send().await.unwrap();
        assert_eq!(response.text().await.unwrap(), "from handler");
    }
    assert_eq!(handler.calls(), 3);
}

#[tokio::test]
async fn ingress_prefixes_viewer_links_only() {
    let registry = Arc::new(InMemoryEntryRegistry::with_entries([user_entry("Users.Get", "api/user/get")]));
    let mut config = documented_config();
    config.documentation.options = Some(DocumentationOptions {
        ingress_name: Some("acme".into()),
        ..DocumentationOptions::default()
    });
    let test = common::listener_with_registry(&config, RecordingHandler::ok(""), registry);
    let addr = test.serve().await;
    let client = client();

    let config: serde_json::Value = client
        .get(url(addr, "/swagger-ui/swagger-config.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(config["urls"][0]["url"], "/acme/swagger/v1/swagger.json");

    let response = client.get(url(addr, "/swagger/v1/swagger.json")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
