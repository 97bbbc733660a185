//! rpc-http-gateway
//!
//! Runs an HTTP listener in front of a service engine. Without an attached
//! platform the engine is a stand-in: entries come from the configuration
//! file and every request is answered by the echo handler.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 HTTP LISTENER                │
//!                     │                                              │
//!   Client Request    │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ──────────────────┼─▶│   net   │──▶│  http    │──▶│  routing  │  │
//!                     │  │ listener│   │  server  │   │ pipeline  │  │
//!                     │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                     │                                     │        │
//!                     │           ┌───────────────┬─────────┴───┐    │
//!                     │           ▼               ▼             ▼    │
//!                     │     static assets     docs routes   catch-all│
//!                     │                                       │      │
//!                     │                                       ▼      │
//!                     │                          MessageHandler      │
//!                     │                                              │
//!                     │  ┌────────────────────────────────────────┐  │
//!                     │  │ config · lifecycle · observability     │  │
//!                     │  └────────────────────────────────────────┘  │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use rpc_http_gateway::config::{load_config, GatewayConfig};
use rpc_http_gateway::lifecycle::{signals, EngineLifetime};
use rpc_http_gateway::observability::{logging, metrics};
use rpc_http_gateway::service::{EchoHandler, InMemoryEntryRegistry, JsonSerializer};
use rpc_http_gateway::{HttpMessageListener, PlatformServices};

#[derive(Debug, Parser)]
#[command(name = "rpc-http-gateway")]
#[command(about = "HTTP listener front-end for an RPC service engine", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener endpoint (ip:port).
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rpc-http-gateway starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let endpoint = match cli.bind {
        Some(endpoint) => endpoint,
        None => config.listener.bind_address.parse()?,
    };

    tracing::info!(
        endpoint = %endpoint,
        max_connections = config.listener.max_connections,
        entries = config.entries.len(),
        documentation = config.documentation.resolved_info().is_some(),
        "Configuration loaded"
    );

    let lifetime = EngineLifetime::new();
    let services = PlatformServices {
        lifetime: lifetime.clone(),
        entries: Arc::new(InMemoryEntryRegistry::with_entries(config.entries.clone())),
        handler: Arc::new(EchoHandler),
        serializer: Arc::new(JsonSerializer),
    };

    let listener = HttpMessageListener::new(&config, services);
    // Failure is already logged; the engine keeps running without HTTP.
    let _ = listener.start(endpoint);

    let signal_task = signals::spawn_signal_handler(lifetime.clone());
    lifetime.notify_started();

    lifetime.stopping().fired().await;
    signal_task.abort();

    listener.dispose();
    listener.closed().await;
    lifetime.notify_stopped();

    tracing::info!("Shutdown complete");
    Ok(())
}
