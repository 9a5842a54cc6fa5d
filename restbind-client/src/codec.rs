//! Body serialization seam.
//!
//! The engine is codec-agnostic: bodies pass through [`Codec`] as
//! `serde_json::Value`, the common in-memory representation, and the
//! codec owns the wire format. [`JsonCodec`] is the default.

use bytes::Bytes;
use serde_json::Value;

use crate::error::ApiError;

/// Converts between in-memory values and wire bytes.
pub trait Codec: Send + Sync {
    /// The `Content-Type` this codec produces.
    fn content_type(&self) -> &'static str;

    /// Serialize a value into a request body.
    fn encode(&self, value: &Value) -> Result<Bytes, ApiError>;

    /// Deserialize a response body.
    ///
    /// An empty body decodes to `Value::Null` so that unit-shaped and
    /// bodyless responses need no special casing upstream.
    fn decode(&self, bytes: &[u8]) -> Result<Value, ApiError>;
}

/// JSON codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes, ApiError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| ApiError::Encode(format!("JSON encoding failed: {e}")))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, ApiError> {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::Decode(format!("JSON decoding failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_json() {
        let codec = JsonCodec;
        let value = json!({"id": "7", "name": "Ada"});
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn empty_body_decodes_to_null() {
        assert_eq!(JsonCodec.decode(b"").unwrap(), Value::Null);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            JsonCodec.decode(b"{not json"),
            Err(ApiError::Decode(_))
        ));
    }
}
