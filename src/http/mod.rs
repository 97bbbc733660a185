//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! HttpMessageListener::start (server.rs)
//!     → bind, build pipeline, wait for engine start
//!     → accept loop (hyper-util auto: HTTP/1.1 + HTTP/2)
//!     → routing pipeline
//!     → catch-all: request.rs (MessageContext) + response.rs (HttpMessageSender)
//!     → MessageHandler::on_received
//!     → finalized response → client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MessageContext, X_REQUEST_ID};
pub use response::{HttpMessageSender, SendError};
pub use server::{HttpMessageListener, ListenerState, PlatformServices, StartError};
