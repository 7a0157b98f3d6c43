//! Wire codec used to read request bodies and write response bodies

use serde_json::Value;
use thiserror::Error;

use crate::response::JsonRpcMessage;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{format} decode error: {source}")]
    Decode {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{format} encode error: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Encoding between raw bytes and structured values
pub trait Codec: Send + Sync {
    /// Short format identifier, e.g. `"json"`
    fn format(&self) -> &'static str;

    /// Content type marker handed to the transport
    fn content_type(&self) -> &'static str;

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError>;

    fn encode(&self, message: &JsonRpcMessage) -> Result<Vec<u8>, CodecError>;
}

/// JSON codec on `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn decode(&self, raw: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(raw).map_err(|source| CodecError::Decode {
            format: self.format(),
            source,
        })
    }

    fn encode(&self, message: &JsonRpcMessage) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(message).map_err(|source| CodecError::Encode {
            format: self.format(),
            source,
        })
    }
}
