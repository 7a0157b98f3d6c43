//! # HTTP JSON-RPC Server
//!
//! HTTP/1.1 transport for the `svcrpc-json-rpc` dispatcher. Request bodies
//! POSTed to the configured path are dispatched as JSON-RPC 2.0 calls and the
//! encoded envelope is returned with `200 OK`, whether the call succeeded or
//! produced a protocol error.
//!
//! ## Features
//! - Builder-based configuration with sensible defaults
//! - CORS support for browser-based clients
//! - Request body size limit

pub mod cors;
pub mod handler;
pub mod prelude;
pub mod server;

// Re-export main types
pub use cors::CorsLayer;
pub use handler::RpcHttpHandler;
pub use server::{HttpRpcServer, HttpRpcServerBuilder, ServerConfig};

// Re-export foundational types
pub use svcrpc_json_rpc::{JsonRpcDispatcher, RpcService, ServiceRegistry};

/// Result type for HTTP JSON-RPC operations
pub type Result<T> = std::result::Result<T, HttpRpcError>;

/// HTTP JSON-RPC server errors
#[derive(Debug, thiserror::Error)]
pub enum HttpRpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("Registry error: {0}")]
    Registry(#[from] svcrpc_json_rpc::RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
