//! Platform collaborator seams.
//!
//! # Data Flow
//! ```text
//! Platform registry ──▶ ServiceEntryProvider ──▶ docs (snapshot at start)
//!
//! Catch-all request ──▶ MessageHandler::on_received(sender, context)
//!                            │
//!                            └──▶ HttpMessageSender ──▶ Serializer ──▶ wire
//! ```
//!
//! # Design Decisions
//! - Seams are trait objects shared via `Arc`, injected per listener
//! - The serializer is stateless and shared by every sender

pub mod echo;
pub mod entry;
pub mod handler;
pub mod provider;
pub mod serializer;

pub use echo::EchoHandler;
pub use entry::{EntryParameter, ServiceEntry, ServiceModule};
pub use handler::MessageHandler;
pub use provider::{InMemoryEntryRegistry, ServiceEntryProvider};
pub use serializer::{JsonSerializer, Serializer, SerializerError};
