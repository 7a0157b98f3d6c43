//! # JSON-RPC 2.0 Service Dispatcher
//!
//! A transport-agnostic JSON-RPC 2.0 dispatcher for `service:method` style calls.
//! Services are registered once at startup together with statically declared
//! method signatures; the dispatcher then validates each request, resolves the
//! target method, binds positional or named params onto the declared parameter
//! list and invokes the method with fault isolation.
//!
//! ## Pipeline
//! - **validate**: envelope checks (`jsonrpc`, `method`, `params` shape)
//! - **resolver**: `service:method` lookup in the [`ServiceRegistry`]
//! - **binder**: arity check, named-to-positional reordering, object decoding
//! - **invoker**: the call itself, with errors and panics turned into internal errors
//! - **response**: success or error envelope, always echoing the request id
//!
//! Every stage short-circuits to an error envelope; nothing escapes to the caller.

pub mod binder;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod invoker;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod response;
pub mod signature;
pub mod types;
pub mod validate;

// Re-export main types
pub use binder::Arguments;
pub use codec::{Codec, CodecError, JsonCodec};
pub use dispatcher::JsonRpcDispatcher;
pub use error::{DispatchError, JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, ServiceError};
pub use registry::{
    Capability, RegistryError, RpcService, ServiceEntry, ServiceRegistry, ServiceRegistryBuilder,
};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use signature::{MethodSignature, ParamDescriptor, ParamKind, TypeDecoder};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}
