use serde_json::Value;
use tracing::debug;

use crate::{
    codec::{Codec, JsonCodec},
    error::{DispatchError, JsonRpcError},
    request::{JsonRpcRequest, RequestParams},
    types::{JsonRpcVersion, RequestId},
};

/// Parse raw JSON bytes into a validated request
pub fn parse_request(raw: &[u8]) -> Result<JsonRpcRequest, JsonRpcError> {
    parse_request_with(&JsonCodec, raw)
}

/// Parse raw bytes with `codec` and validate the envelope.
///
/// Undecodable input yields a parse error with a null id; every later failure
/// is an invalid-request error echoing whatever id was present.
pub fn parse_request_with(codec: &dyn Codec, raw: &[u8]) -> Result<JsonRpcRequest, JsonRpcError> {
    let value = codec.decode(raw).map_err(|e| {
        debug!("rejecting undecodable request: {}", e);
        JsonRpcError::parse_error()
    })?;
    validate_request(value)
}

/// Check the envelope shape of an already decoded request
pub fn validate_request(value: Value) -> Result<JsonRpcRequest, JsonRpcError> {
    let Value::Object(mut obj) = value else {
        return Err(invalid(RequestId::Null, "Request must be a single JSON object"));
    };

    let id = obj
        .remove("id")
        .map(RequestId::from_value)
        .unwrap_or_default();

    match obj.get("jsonrpc") {
        Some(Value::String(version)) if version == crate::JSONRPC_VERSION => {}
        Some(other) => {
            return Err(invalid(
                id,
                format!("Unsupported jsonrpc version {}", other),
            ));
        }
        None => return Err(invalid(id, "Missing 'jsonrpc' member")),
    }

    let method = match obj.remove("method") {
        Some(Value::String(method)) => method,
        Some(_) => return Err(invalid(id, "'method' must be a string")),
        None => return Err(invalid(id, "Missing 'method' member")),
    };

    let params = match obj.remove("params") {
        None | Some(Value::Null) => None,
        Some(Value::Array(values)) => Some(RequestParams::Array(values)),
        Some(Value::Object(map)) => Some(RequestParams::Object(map)),
        Some(_) => return Err(invalid(id, "'params' must be an array or an object")),
    };

    Ok(JsonRpcRequest {
        version: JsonRpcVersion::V2_0,
        method,
        params,
        id,
    })
}

fn invalid(id: RequestId, detail: impl Into<String>) -> JsonRpcError {
    DispatchError::InvalidRequest(detail.into()).into_response(id)
}
