//! Response writing for a single in-flight exchange.
//!
//! # Responsibilities
//! - Collect status and headers set by the message handler
//! - Encode structured payloads with the shared serializer
//! - Finalize the response exactly once
//!
//! # Design Decisions
//! - The finalized response travels back to the pipeline over a oneshot
//!   channel, so the sender may outlive the handler call if it must
//! - A sender dropped without being finalized completes with its pending
//!   status/headers and an empty body

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{
    header::{self, HeaderName, HeaderValue},
    response::Parts,
    Response, StatusCode,
};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::service::{Serializer, SerializerError};

/// Error returned by sender operations.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("response already completed")]
    AlreadyCompleted,
    #[error(transparent)]
    Serialize(#[from] SerializerError),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

struct Pending {
    parts: Parts,
    reply: oneshot::Sender<Response<Body>>,
}

/// Writes the response of one request.
pub struct HttpMessageSender {
    serializer: Arc<dyn Serializer>,
    pending: Option<Pending>,
}

impl HttpMessageSender {
    /// Create a sender and the receiver the pipeline awaits.
    pub(crate) fn new(serializer: Arc<dyn Serializer>) -> (Self, oneshot::Receiver<Response<Body>>) {
        let (reply, rx) = oneshot::channel();
        let (parts, ()) = Response::new(()).into_parts();
        let sender = Self {
            serializer,
            pending: Some(Pending { parts, reply }),
        };
        (sender, rx)
    }

    /// Whether the response has been finalized.
    pub fn is_completed(&self) -> bool {
        self.pending.is_none()
    }

    pub fn set_status(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.parts()?.status = status;
        Ok(())
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) -> Result<(), SendError> {
        self.parts()?.headers.insert(name, value);
        Ok(())
    }

    /// Insert a header from string forms, validating both.
    pub fn try_insert_header(&mut self, name: &str, value: &str) -> Result<(), SendError> {
        let name = HeaderName::try_from(name).map_err(|_| SendError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::try_from(value).map_err(|_| SendError::InvalidHeader(name.as_str().to_string()))?;
        self.insert_header(name, value)
    }

    /// Encode `message` with the shared serializer and finalize the response.
    pub fn send_message<T: Serialize>(&mut self, status: StatusCode, message: &T) -> Result<(), SendError> {
        if self.is_completed() {
            return Err(SendError::AlreadyCompleted);
        }
        let value = serde_json::to_value(message).map_err(SerializerError::Encode)?;
        let bytes = self.serializer.serialize(&value)?;
        let content_type = HeaderValue::from_static(self.serializer.content_type());
        let parts = self.parts()?;
        parts.headers.insert(header::CONTENT_TYPE, content_type);
        self.finish(status, bytes)
    }

    /// Finalize the response with a raw body.
    pub fn send_bytes(&mut self, status: StatusCode, body: impl Into<Bytes>) -> Result<(), SendError> {
        self.finish(status, body.into())
    }

    fn parts(&mut self) -> Result<&mut Parts, SendError> {
        self.pending
            .as_mut()
            .map(|p| &mut p.parts)
            .ok_or(SendError::AlreadyCompleted)
    }

    fn finish(&mut self, status: StatusCode, body: Bytes) -> Result<(), SendError> {
        let Pending { mut parts, reply } = self.pending.take().ok_or(SendError::AlreadyCompleted)?;
        parts.status = status;
        // The pipeline stops listening only if the client went away.
        let _ = reply.send(Response::from_parts(parts, Body::from(body)));
        Ok(())
    }
}

impl Drop for HttpMessageSender {
    fn drop(&mut self) {
        if let Some(Pending { parts, reply }) = self.pending.take() {
            let _ = reply.send(Response::from_parts(parts, Body::empty()));
        }
    }
}

impl std::fmt::Debug for HttpMessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMessageSender")
            .field("completed", &self.is_completed())
            .finish()
    }
}
