//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use parking_lot::Mutex;
use tokio::sync::Notify;

use rpc_http_gateway::config::GatewayConfig;
use rpc_http_gateway::http::{HttpMessageListener, HttpMessageSender, ListenerState, MessageContext, PlatformServices};
use rpc_http_gateway::lifecycle::EngineLifetime;
use rpc_http_gateway::service::{InMemoryEntryRegistry, JsonSerializer, MessageHandler};

/// What the handler saw of one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Vec<u8>,
    pub peer_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
}

/// How the recording handler answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Bytes {
        status: StatusCode,
        headers: Vec<(&'static str, &'static str)>,
        body: &'static str,
    },
    /// Set the status and drop the sender without sending.
    StatusOnly(StatusCode),
}

/// A handler that records every request and answers with a fixed reply.
pub struct RecordingHandler {
    requests: Mutex<Vec<RecordedRequest>>,
    reply: Reply,
    delay: Duration,
    invoked: Notify,
}

impl RecordingHandler {
    pub fn new(reply: Reply) -> Arc<Self> {
        Self::delayed(reply, Duration::ZERO)
    }

    pub fn ok(body: &'static str) -> Arc<Self> {
        Self::new(Reply::Bytes {
            status: StatusCode::OK,
            headers: Vec::new(),
            body,
        })
    }

    /// Wait `delay` inside the handler before replying.
    pub fn delayed(reply: Reply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply,
            delay,
            invoked: Notify::new(),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Resolve once the handler has been invoked.
    pub async fn invoked(&self) {
        self.invoked.notified().await;
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn on_received(&self, mut sender: HttpMessageSender, context: MessageContext) {
        self.requests.lock().push(RecordedRequest {
            method: context.method().to_string(),
            path: context.path().to_string(),
            query: context.query().map(str::to_string),
            body: context.body().to_vec(),
            peer_addr: context.peer_addr(),
            request_id: context.request_id().map(str::to_string),
        });
        self.invoked.notify_one();

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.reply {
            Reply::Bytes { status, headers, body } => {
                for (name, value) in headers {
                    sender.try_insert_header(name, value).unwrap();
                }
                sender.send_bytes(*status, *body).unwrap();
            }
            Reply::StatusOnly(status) => sender.set_status(*status).unwrap(),
        }
    }
}

/// A listener wired to test collaborators.
pub struct TestListener {
    pub listener: HttpMessageListener,
    pub lifetime: EngineLifetime,
    pub registry: Arc<InMemoryEntryRegistry>,
}

pub fn listener(config: &GatewayConfig, handler: Arc<dyn MessageHandler>) -> TestListener {
    listener_with_registry(config, handler, Arc::new(InMemoryEntryRegistry::new()))
}

pub fn listener_with_registry(
    config: &GatewayConfig,
    handler: Arc<dyn MessageHandler>,
    registry: Arc<InMemoryEntryRegistry>,
) -> TestListener {
    let lifetime = EngineLifetime::new();
    let services = PlatformServices {
        lifetime: lifetime.clone(),
        entries: registry.clone(),
        handler,
        serializer: Arc::new(JsonSerializer),
    };
    TestListener {
        listener: HttpMessageListener::new(config, services),
        lifetime,
        registry,
    }
}

impl TestListener {
    /// Start on an ephemeral port, fire `started` and wait until accepting.
    pub async fn serve(&self) -> SocketAddr {
        let addr = self.listener.start(any_port()).unwrap();
        self.lifetime.notify_started();
        wait_for_state(&self.listener, ListenerState::Accepting).await;
        addr
    }
}

/// A configuration that never serves static assets from the working directory.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.web_root_path = "target/no-such-web-root".into();
    config.listener.shutdown_timeout_secs = 5;
    config
}

pub fn any_port() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

pub async fn wait_for_state(listener: &HttpMessageListener, state: ListenerState) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while listener.state() != state {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("listener never reached {state:?}, stuck in {:?}", listener.state()));
}

/// In-memory log sink for a `tracing_subscriber` fmt layer.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// A subscriber writing every event, without colours, into this sink.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
