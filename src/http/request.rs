//! The inbound exchange handed to the message handler.
//!
//! # Responsibilities
//! - Carry method, URI, headers and body verbatim
//! - Expose the peer address and request ID assigned by the pipeline
//! - Decode the body with the listener's shared serializer

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{request::Parts, HeaderMap, Method, Uri, Version};
use serde::de::DeserializeOwned;

use crate::service::{Serializer, SerializerError};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A fully buffered inbound request.
pub struct MessageContext {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    peer_addr: Option<SocketAddr>,
    serializer: Arc<dyn Serializer>,
}

impl MessageContext {
    pub(crate) fn new(
        parts: Parts,
        body: Bytes,
        peer_addr: Option<SocketAddr>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
            peer_addr,
            serializer,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Address of the remote end of the connection, when known.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// The request ID, either supplied by the client or generated on entry.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    /// Decode the body into `T` with the shared serializer.
    pub fn read_message<T: DeserializeOwned>(&self) -> Result<T, SerializerError> {
        let value = self.serializer.deserialize(&self.body)?;
        serde_json::from_value(value).map_err(SerializerError::Decode)
    }
}

impl std::fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContext")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("peer_addr", &self.peer_addr)
            .field("body_len", &self.body.len())
            .finish()
    }
}
