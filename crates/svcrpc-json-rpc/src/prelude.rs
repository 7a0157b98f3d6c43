//! # Dispatcher Prelude
//!
//! Re-exports of the types needed to implement and register services.
//!
//! ```rust
//! use svcrpc_json_rpc::prelude::*;
//! ```

pub use crate::binder::Arguments;
pub use crate::dispatcher::JsonRpcDispatcher;
pub use crate::error::{JsonRpcError, JsonRpcErrorCode, ServiceError};
pub use crate::registry::{Capability, RpcService, ServiceRegistry};
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcMessage, JsonRpcResponse};
pub use crate::signature::{MethodSignature, ParamDescriptor};
pub use crate::types::RequestId;

// Standard error codes
pub use crate::error_codes::*;
