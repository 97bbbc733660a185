//! The platform's generic message-received entry point.

use async_trait::async_trait;

use crate::http::{HttpMessageSender, MessageContext};

/// Receives every request that is not claimed by static assets or
/// documentation routes.
///
/// The handler owns its failure policy: whatever it writes through the
/// sender is what the client sees. A sender dropped without an explicit
/// send finalizes the response with its pending status and headers.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn on_received(&self, sender: HttpMessageSender, context: MessageContext);
}
