//! Wire serialization shared by every in-flight request.

use axum::body::Bytes;
use serde_json::Value;

/// Error raised while encoding or decoding a message.
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encodes structured messages to the wire format and back.
///
/// Implementations are stateless and shared read-only across all senders.
pub trait Serializer: Send + Sync + 'static {
    /// `Content-Type` header value for encoded payloads.
    fn content_type(&self) -> &'static str;

    fn serialize(&self, value: &Value) -> Result<Bytes, SerializerError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, SerializerError>;
}

/// UTF-8 JSON serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn content_type(&self) -> &'static str {
        "application/json; charset=utf-8"
    }

    fn serialize(&self, value: &Value) -> Result<Bytes, SerializerError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(SerializerError::Encode)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, SerializerError> {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(bytes).map_err(SerializerError::Decode)
    }
}
