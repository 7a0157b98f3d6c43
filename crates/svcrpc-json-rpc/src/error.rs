use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::types::{JsonRpcVersion, RequestId};

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => crate::error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => crate::error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => crate::error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => crate::error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => crate::error_codes::INTERNAL_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    /// The message always comes from the catalog; details travel in `data`.
    pub fn new(code: JsonRpcErrorCode, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(JsonRpcErrorCode::ParseError, None)
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(
            JsonRpcErrorCode::InternalError,
            Some(Value::String(detail.into())),
        )
    }
}

/// JSON-RPC Error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub error: JsonRpcErrorObject,
    #[serde(default)]
    pub id: RequestId,
}

impl JsonRpcError {
    pub fn new(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            error,
            id,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(RequestId::Null, JsonRpcErrorObject::parse_error())
    }

    pub fn internal_error(id: RequestId, detail: impl Into<String>) -> Self {
        Self::new(id, JsonRpcErrorObject::internal_error(detail))
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

/// Failure raised by a pipeline stage.
///
/// Every variant maps onto exactly one catalog code. Stages return this by
/// value; the dispatcher turns it into a [`JsonRpcError`] carrying the request id.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("malformed JSON: {0}")]
    Parse(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    MethodNotFound(String),

    #[error("Expected between {required} and {total} params, got {supplied}")]
    Arity {
        supplied: usize,
        required: usize,
        total: usize,
    },

    #[error("Missing required parameter '{0}'")]
    MissingParam(String),

    #[error("Parameter '{name}' could not be decoded: {message}")]
    ParamDecode { name: String, message: String },

    #[error("{0}")]
    Fault(String),
}

impl DispatchError {
    pub fn code(&self) -> JsonRpcErrorCode {
        match self {
            DispatchError::Parse(_) => JsonRpcErrorCode::ParseError,
            DispatchError::InvalidRequest(_) => JsonRpcErrorCode::InvalidRequest,
            DispatchError::MethodNotFound(_) => JsonRpcErrorCode::MethodNotFound,
            DispatchError::Arity { .. }
            | DispatchError::MissingParam(_)
            | DispatchError::ParamDecode { .. } => JsonRpcErrorCode::InvalidParams,
            DispatchError::Fault(_) => JsonRpcErrorCode::InternalError,
        }
    }

    /// Diagnostic detail for the `data` member; parse errors carry none.
    pub fn data(&self) -> Option<Value> {
        match self {
            DispatchError::Parse(_) => None,
            other => Some(Value::String(other.to_string())),
        }
    }

    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject::new(self.code(), self.data())
    }

    pub fn into_response(self, id: RequestId) -> JsonRpcError {
        JsonRpcError::new(id, self.to_error_object())
    }
}

/// Errors returned by service method implementations.
///
/// Any of these surfaces to the client as an internal error whose `data` is
/// the display text.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Failed(String),

    #[error("argument {index}: {message}")]
    Argument { index: usize, message: String },

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        ServiceError::Failed(message.into())
    }

    pub fn argument(index: usize, message: impl Into<String>) -> Self {
        ServiceError::Argument {
            index,
            message: message.into(),
        }
    }
}

impl From<String> for ServiceError {
    fn from(message: String) -> Self {
        ServiceError::Failed(message)
    }
}

impl From<&str> for ServiceError {
    fn from(message: &str) -> Self {
        ServiceError::Failed(message.to_string())
    }
}
