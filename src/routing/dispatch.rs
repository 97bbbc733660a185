//! Catch-all dispatch to the platform message handler.
//!
//! # Responsibilities
//! - Buffer the request body (bounded by the pipeline's body limit)
//! - Build one [`MessageContext`] and one [`HttpMessageSender`] per request
//! - Await the handler, then answer with whatever the sender finalized

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{request::Parts, Response},
};

use crate::http::{HttpMessageSender, MessageContext};
use crate::observability::metrics;
use crate::service::{MessageHandler, Serializer};

/// Shared state of the catch-all route.
#[derive(Clone)]
pub struct DispatchState {
    pub handler: Arc<dyn MessageHandler>,
    pub serializer: Arc<dyn Serializer>,
}

impl DispatchState {
    pub fn new(handler: Arc<dyn MessageHandler>, serializer: Arc<dyn Serializer>) -> Self {
        Self { handler, serializer }
    }
}

/// Forward a request to the message handler.
pub async fn dispatch_request(
    State(state): State<DispatchState>,
    parts: Parts,
    body: Bytes,
) -> Response<Body> {
    let start = Instant::now();
    let peer_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let method = parts.method.clone();

    let context = MessageContext::new(parts, body, peer_addr, Arc::clone(&state.serializer));
    tracing::debug!(
        method = %context.method(),
        path = %context.path(),
        peer_addr = ?peer_addr,
        body_len = context.body().len(),
        "Dispatching request"
    );

    let (sender, reply) = HttpMessageSender::new(Arc::clone(&state.serializer));
    state.handler.on_received(sender, context).await;

    // A sender always finalizes, at the latest when it is dropped.
    let response = reply.await.unwrap_or_else(|_| Response::new(Body::empty()));

    metrics::record_dispatch(method.as_str(), response.status().as_u16(), start);
    tracing::debug!(status = response.status().as_u16(), "Request dispatched");
    response
}
