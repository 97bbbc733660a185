//! HTTP listener lifecycle.
//!
//! # Responsibilities
//! - Bind the endpoint synchronously on `start`
//! - Defer accepting until the engine's `started` signal fired
//! - Serve HTTP/1.1 and HTTP/2 connections through the request pipeline
//! - Stop accepting and drain connections on `dispose`
//!
//! # States
//! ```text
//! Unbound ──start──▶ Bound ──started──▶ Accepting ──dispose──▶ Disposed
//!    │                 │                                          ▲
//!    └──start fails──▶ Failed ─────────────dispose────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::ConnectInfo, Router};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as AutoBuilder,
};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use crate::config::{DocumentationConfig, GatewayConfig, ListenerConfig};
use crate::docs::{DocumentationError, DocumentationPublisher};
use crate::lifecycle::{EngineLifetime, LifecycleSignal, Shutdown, ShutdownSignal};
use crate::net::{BoundSocket, ConnectionTracker, Listener, ListenerError};
use crate::routing::{build_pipeline, DispatchState};
use crate::service::{MessageHandler, Serializer, ServiceEntryProvider};

/// Platform collaborators a listener depends on.
#[derive(Clone)]
pub struct PlatformServices {
    pub lifetime: EngineLifetime,
    pub entries: Arc<dyn ServiceEntryProvider>,
    pub handler: Arc<dyn MessageHandler>,
    pub serializer: Arc<dyn Serializer>,
}

/// Error returned by [`HttpMessageListener::start`].
///
/// Start failures are reported and logged but leave the host process running.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("listener already started")]
    AlreadyStarted,
    #[error("listener disposed")]
    Disposed,
    #[error("no tokio runtime available")]
    NoRuntime,
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: SocketAddr,
        #[source]
        source: ListenerError,
    },
    #[error(transparent)]
    Pipeline(#[from] DocumentationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Unbound,
    /// Port claimed, waiting for the engine to start.
    Bound,
    Accepting,
    /// `start` was attempted and failed.
    Failed,
    Disposed,
}

#[derive(Debug)]
struct Inner {
    state: ListenerState,
    local_addr: Option<SocketAddr>,
    /// Held until the continuation takes it, or released by dispose.
    socket: Option<BoundSocket>,
    task: Option<JoinHandle<()>>,
}

impl Inner {
    fn ensure_unbound(&self) -> Result<(), StartError> {
        match self.state {
            ListenerState::Unbound => Ok(()),
            ListenerState::Disposed => Err(StartError::Disposed),
            _ => Err(StartError::AlreadyStarted),
        }
    }
}

/// The HTTP listener of one service engine.
pub struct HttpMessageListener {
    config: ListenerConfig,
    documentation: DocumentationConfig,
    services: PlatformServices,
    inner: Arc<Mutex<Inner>>,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    closed: LifecycleSignal,
}

impl HttpMessageListener {
    pub fn new(config: &GatewayConfig, services: PlatformServices) -> Self {
        Self {
            config: config.listener.clone(),
            documentation: config.documentation.clone(),
            services,
            inner: Arc::new(Mutex::new(Inner {
                state: ListenerState::Unbound,
                local_addr: None,
                socket: None,
                task: None,
            })),
            shutdown: Shutdown::new(),
            tracker: ConnectionTracker::new(),
            closed: LifecycleSignal::new(),
        }
    }

    /// Bind `endpoint` and accept connections once the engine has started.
    ///
    /// Returns the bound address. On failure exactly one error record naming
    /// the endpoint is logged and the listener is left `Failed`.
    pub fn start(&self, endpoint: SocketAddr) -> Result<SocketAddr, StartError> {
        match self.try_start(endpoint) {
            Ok(local_addr) => {
                tracing::info!(
                    endpoint = %endpoint,
                    address = %local_addr,
                    "HTTP listener bound, waiting for engine start"
                );
                Ok(local_addr)
            }
            Err(e) => {
                tracing::error!(endpoint = %endpoint, error = %e, "Failed to start HTTP listener");
                Err(e)
            }
        }
    }

    fn try_start(&self, endpoint: SocketAddr) -> Result<SocketAddr, StartError> {
        self.inner.lock().ensure_unbound()?;

        // Built outside the lock: the entry provider is external and may
        // call back into this listener.
        let app = match self.prepare() {
            Ok(app) => app,
            Err(e) => return Err(self.fail_unbound(e)),
        };

        let mut inner = self.inner.lock();
        inner.ensure_unbound()?;
        let socket = match BoundSocket::bind(endpoint) {
            Ok(socket) => socket,
            Err(source) => {
                inner.state = ListenerState::Failed;
                return Err(StartError::Bind { endpoint, source });
            }
        };
        let local_addr = socket.local_addr();
        inner.state = ListenerState::Bound;
        inner.local_addr = Some(local_addr);
        inner.socket = Some(socket);
        drop(inner);

        let task = self.services.lifetime.started().register(accept_when_started(
            Arc::clone(&self.inner),
            app,
            ServeOptions {
                max_connections: self.config.max_connections,
                drain_timeout: Duration::from_secs(self.config.shutdown_timeout_secs),
            },
            self.shutdown.subscribe(),
            self.tracker.clone(),
            self.closed.clone(),
        ));

        let mut inner = self.inner.lock();
        if inner.state == ListenerState::Disposed {
            task.abort();
        } else {
            inner.task = Some(task);
        }
        Ok(local_addr)
    }

    fn prepare(&self) -> Result<Router, StartError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(StartError::NoRuntime);
        }
        self.pipeline()
    }

    /// Record a failure that happened before binding.
    fn fail_unbound(&self, error: StartError) -> StartError {
        let mut inner = self.inner.lock();
        if inner.state == ListenerState::Unbound {
            inner.state = ListenerState::Failed;
        }
        error
    }

    /// Snapshot the entries and build the request pipeline.
    fn pipeline(&self) -> Result<Router, StartError> {
        let documentation =
            DocumentationPublisher::from_config(&self.documentation, self.services.entries.entries())?;
        let dispatch = DispatchState::new(
            Arc::clone(&self.services.handler),
            Arc::clone(&self.services.serializer),
        );
        Ok(build_pipeline(&self.config, documentation.as_ref(), dispatch))
    }

    /// Stop the listener. Safe to call any number of times; never rebinds.
    pub fn dispose(&self) {
        let mut inner = self.inner.lock();
        let previous = inner.state;
        if previous == ListenerState::Disposed {
            return;
        }
        inner.state = ListenerState::Disposed;

        // Releases the port when the engine never started.
        drop(inner.socket.take());
        self.shutdown.trigger();

        match previous {
            ListenerState::Accepting => {}
            _ => {
                if let Some(task) = inner.task.take() {
                    task.abort();
                }
                self.closed.fire();
            }
        }
        drop(inner);

        tracing::info!(previous_state = ?previous, "HTTP listener disposed");
    }

    /// Resolve once the listener stopped and connections drained.
    ///
    /// Only resolves after [`dispose`](Self::dispose) was called.
    pub async fn closed(&self) {
        self.closed.fired().await;
    }

    pub fn state(&self) -> ListenerState {
        self.inner.lock().state
    }

    /// The bound address, once `start` succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.lock().local_addr
    }

    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }
}

impl Drop for HttpMessageListener {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for HttpMessageListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("HttpMessageListener")
            .field("state", &inner.state)
            .field("local_addr", &inner.local_addr)
            .field("active_connections", &self.tracker.active_count())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct ServeOptions {
    max_connections: usize,
    drain_timeout: Duration,
}

/// Continuation registered on the engine's `started` signal.
async fn accept_when_started(
    inner: Arc<Mutex<Inner>>,
    app: Router,
    options: ServeOptions,
    shutdown: ShutdownSignal,
    tracker: ConnectionTracker,
    closed: LifecycleSignal,
) {
    let socket = {
        let mut inner = inner.lock();
        if inner.state != ListenerState::Bound {
            return;
        }
        match inner.socket.take() {
            Some(socket) => socket,
            None => return,
        }
    };

    let listener = socket.into_listener(options.max_connections);
    {
        let mut inner = inner.lock();
        // Disposed while the socket was out of the lock.
        if inner.state != ListenerState::Bound {
            closed.fire();
            return;
        }
        match &listener {
            Ok(_) => inner.state = ListenerState::Accepting,
            Err(_) => inner.state = ListenerState::Failed,
        }
    }

    match listener {
        Ok(listener) => serve(listener, app, shutdown, &tracker, options.drain_timeout).await,
        Err(e) => tracing::error!(error = %e, "Failed to start accepting connections"),
    }
    closed.fire();
}

/// Accept loop: runs until shutdown, then waits for connections to drain.
async fn serve(
    listener: Listener,
    app: Router,
    mut shutdown: ShutdownSignal,
    tracker: &ConnectionTracker,
    drain_timeout: Duration,
) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            accepted = listener.accept() => accepted,
        };

        let (stream, peer_addr, permit) = match accepted {
            Ok(accepted) => accepted,
            Err(ListenerError::Closed) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(Duration::from_millis(50)).await;
                continue;
            }
        };

        let guard = tracker.track(peer_addr);
        let app = app.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            serve_connection(stream, peer_addr, app, shutdown).await;
            drop(permit);
            drop(guard);
        });
    }

    // Stop accepting before draining so the port is released promptly.
    drop(listener);
    tracing::info!(active_connections = tracker.active_count(), "HTTP listener draining");

    if tokio::time::timeout(drain_timeout, tracker.wait_for_idle()).await.is_err() {
        tracing::warn!(
            active_connections = tracker.active_count(),
            timeout_secs = drain_timeout.as_secs(),
            "Connections still open after drain timeout"
        );
    }
    tracing::info!("HTTP listener stopped");
}

async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, app: Router, mut shutdown: ShutdownSignal) {
    let service = hyper::service::service_fn(move |mut request: hyper::Request<hyper::body::Incoming>| {
        request.extensions_mut().insert(ConnectInfo(peer_addr));
        app.clone().oneshot(request)
    });

    let builder = AutoBuilder::new(TokioExecutor::new());
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let mut shutting_down = false;
    loop {
        tokio::select! {
            result = connection.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(peer_addr = %peer_addr, error = %e, "Connection ended with error");
                }
                break;
            }
            _ = shutdown.recv(), if !shutting_down => {
                shutting_down = true;
                connection.as_mut().graceful_shutdown();
            }
        }
    }
}
