//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! start(endpoint)
//!     → listener.rs (synchronous bind → BoundSocket)
//! engine started
//!     → listener.rs (BoundSocket → Listener, accept loop, connection limits)
//!     → connection.rs (lifecycle tracking)
//!     → Hand off to HTTP layer
//!
//! Socket States:
//!     Bound → Accepting → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - The port is claimed before traffic is allowed
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionTracker};
pub use listener::{BoundSocket, ConnectionPermit, Listener, ListenerError};
