//! Live connection accounting for one listener.
//!
//! Every accepted connection holds a [`ConnectionGuard`] until its task
//! ends. Dispose waits on [`ConnectionTracker::wait_for_idle`] so in-flight
//! exchanges finish before the listener reports itself closed.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::observability::metrics;

#[derive(Debug)]
struct TrackerState {
    /// Number of open connections; watchers wake on every change.
    active: watch::Sender<u64>,
    next_id: AtomicU64,
}

/// Counts the open connections of a listener.
///
/// Clones share the same count.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: Arc<TrackerState>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        let (active, _) = watch::channel(0);
        Self {
            state: Arc::new(TrackerState {
                active,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register an accepted connection. The count drops with the guard.
    pub fn track(&self, peer_addr: SocketAddr) -> ConnectionGuard {
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        self.state.active.send_modify(|count| *count += 1);
        metrics::record_active_connections(self.active_count());

        tracing::trace!(connection_id = id, peer_addr = %peer_addr, "Connection opened");
        ConnectionGuard {
            state: Arc::clone(&self.state),
            id,
            peer_addr,
        }
    }

    pub fn active_count(&self) -> u64 {
        *self.state.active.borrow()
    }

    /// Resolve once no connection is open.
    pub async fn wait_for_idle(&self) {
        let mut rx = self.state.active.subscribe();
        // The sender is owned by `self`, so the channel stays open.
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Held by a connection task for as long as the connection is open.
#[derive(Debug)]
pub struct ConnectionGuard {
    state: Arc<TrackerState>,
    id: u64,
    peer_addr: SocketAddr,
}

impl ConnectionGuard {
    /// Listener-local connection number, for log correlation.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.active.send_modify(|count| *count = count.saturating_sub(1));
        metrics::record_active_connections(*self.state.active.borrow());
        tracing::trace!(connection_id = self.id, peer_addr = %self.peer_addr, "Connection closed");
    }
}
