//! A handler that reflects the received request back to the caller.
//!
//! Used by the binary when no platform is attached, and handy for smoke
//! testing a deployment.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;

use crate::http::{HttpMessageSender, MessageContext};
use crate::service::handler::MessageHandler;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

#[derive(Debug, Serialize)]
struct EchoReply<'a> {
    method: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    request_id: Option<&'a str>,
    body: serde_json::Value,
}

#[async_trait]
impl MessageHandler for EchoHandler {
    async fn on_received(&self, mut sender: HttpMessageSender, context: MessageContext) {
        let body = context
            .read_message::<serde_json::Value>()
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(context.body()).into_owned()));

        let reply = EchoReply {
            method: context.method().as_str(),
            path: context.path(),
            query: context.query(),
            request_id: context.request_id(),
            body,
        };

        if let Err(e) = sender.send_message(StatusCode::OK, &reply) {
            tracing::warn!(error = %e, "Failed to send echo reply");
        }
    }
}
