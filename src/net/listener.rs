//! Two-phase TCP socket: claim the port first, accept later.
//!
//! # Responsibilities
//! - Bind the endpoint synchronously, before any runtime work happens
//! - Turn the bound socket into an accepting listener on demand
//! - Cap concurrent connections with a semaphore
//!
//! # Design Decisions
//! - A [`BoundSocket`] is bound but not listening, so clients are refused
//!   while the port stays reserved
//! - `SO_REUSEADDR` is set (except on Windows), as `TcpListener::bind` does,
//!   so a restart is not blocked by TIME_WAIT sockets of the last run. The
//!   reservation then only holds against sockets without `SO_REUSEADDR`; a
//!   second reuse-enabled socket can bind the same port until one of them
//!   listens
//! - Permits are taken before `accept`, so a full listener leaves new
//!   connections queued in the kernel backlog

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

const LISTEN_BACKLOG: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),
    #[error("failed to listen: {0}")]
    Listen(#[source] std::io::Error),
    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
    /// The connection limiter was closed.
    #[error("listener closed")]
    Closed,
}

/// A socket holding its endpoint without accepting connections.
#[derive(Debug)]
pub struct BoundSocket {
    socket: TcpSocket,
    local_addr: SocketAddr,
}

impl BoundSocket {
    /// Bind to `endpoint`. Works outside a tokio runtime.
    pub fn bind(endpoint: SocketAddr) -> Result<Self, ListenerError> {
        let socket = if endpoint.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Bind)?;
        #[cfg(not(windows))]
        socket.set_reuseaddr(true).map_err(ListenerError::Bind)?;
        socket.bind(endpoint).map_err(ListenerError::Bind)?;
        let local_addr = socket.local_addr().map_err(ListenerError::Bind)?;

        tracing::debug!(endpoint = %endpoint, address = %local_addr, "Socket bound");
        Ok(Self { socket, local_addr })
    }

    /// The bound address, with port 0 resolved.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Start listening. Must run inside a tokio runtime.
    pub fn into_listener(self, max_connections: usize) -> Result<Listener, ListenerError> {
        let socket = self.socket.listen(LISTEN_BACKLOG).map_err(ListenerError::Listen)?;

        tracing::info!(address = %self.local_addr, max_connections, "Listener accepting");
        Ok(Listener {
            socket,
            slots: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        })
    }
}

/// An accepting socket with a cap on open connections.
#[derive(Debug)]
pub struct Listener {
    socket: TcpListener,
    slots: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Wait for a free slot, then for the next connection.
    ///
    /// The returned permit must live as long as the connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Closed)?;
        let (stream, peer_addr) = self.socket.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %peer_addr,
            free_slots = self.slots.available_permits(),
            "Connection accepted"
        );
        Ok((stream, peer_addr, ConnectionPermit { _slot: permit }))
    }

    pub fn available_permits(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// One connection slot; released on drop.
#[derive(Debug)]
pub struct ConnectionPermit {
    _slot: OwnedSemaphorePermit,
}
