//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Engine lifetime (startup.rs):
//!     engine initializes → notify_started → registered continuations run
//!     stop_application → stopping → components dispose → notify_stopped
//!
//! Listener shutdown (shutdown.rs):
//!     dispose → trigger → accept loop stops → connections drain
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop_application
//! ```
//!
//! # Design Decisions
//! - Listeners bind early but accept only after `started` fired
//! - Every signal is a latch, so late subscribers never miss it

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{EngineLifetime, LifecycleSignal};
