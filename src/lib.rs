//! HTTP listener front-end for an RPC service platform.
//!
//! A [`HttpMessageListener`] binds its endpoint as soon as it is started but
//! only accepts connections after the service engine signalled startup. Each
//! request is served by the first stage that claims it: static assets from
//! the web root, generated API documentation, or the platform's
//! [`MessageHandler`].

pub mod config;
pub mod docs;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod service;

pub use config::schema::GatewayConfig;
pub use http::{HttpMessageListener, HttpMessageSender, MessageContext, PlatformServices, StartError};
pub use lifecycle::EngineLifetime;
pub use service::{MessageHandler, ServiceEntry, ServiceEntryProvider};
