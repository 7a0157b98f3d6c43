//! HTTP JSON-RPC server
//!
//! Accepts HTTP/1.1 connections and hands POSTed bodies on the RPC path to a
//! [`JsonRpcDispatcher`] built over an immutable service registry.

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use svcrpc_json_rpc::{JsonRpcDispatcher, RpcService, ServiceRegistry, ServiceRegistryBuilder};

use crate::{HttpRpcError, Result, RpcHttpHandler};

/// Configuration for the HTTP JSON-RPC server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path of the JSON-RPC endpoint
    pub rpc_path: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            rpc_path: "/rpc".to_string(),
            enable_cors: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<()> {
        if !self.rpc_path.starts_with('/') {
            return Err(HttpRpcError::InvalidConfig(format!(
                "rpc_path must start with '/': {}",
                self.rpc_path
            )));
        }
        if self.max_body_size == 0 {
            return Err(HttpRpcError::InvalidConfig(
                "max_body_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

enum RegistrySource {
    Builder(ServiceRegistryBuilder),
    Built(Arc<ServiceRegistry>),
}

/// Builder for the HTTP JSON-RPC server
pub struct HttpRpcServerBuilder {
    config: ServerConfig,
    registry: RegistrySource,
    /// Validation errors collected during builder configuration
    validation_errors: Vec<String>,
}

impl HttpRpcServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            registry: RegistrySource::Builder(ServiceRegistryBuilder::new()),
            validation_errors: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.config.bind_address = addr;
        self
    }

    /// Set the JSON-RPC endpoint path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.config.rpc_path = path.into();
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set maximum request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Register a service under `name` (and its declared capabilities)
    pub fn service<S>(mut self, name: impl Into<String>, service: S) -> Self
    where
        S: RpcService + 'static,
    {
        let name = name.into();
        self.registry = match self.registry {
            RegistrySource::Builder(builder) => {
                RegistrySource::Builder(builder.register(name, service))
            }
            RegistrySource::Built(registry) => {
                self.validation_errors.push(format!(
                    "Service '{}' cannot be added to a prebuilt registry",
                    name
                ));
                RegistrySource::Built(registry)
            }
        };
        self
    }

    /// Use an already built registry
    pub fn registry(mut self, registry: Arc<ServiceRegistry>) -> Self {
        self.registry = RegistrySource::Built(registry);
        self
    }

    /// Build the server, freezing the registry
    pub fn build(self) -> Result<HttpRpcServer> {
        self.config.validate()?;
        if !self.validation_errors.is_empty() {
            return Err(HttpRpcError::InvalidConfig(self.validation_errors.join("\n")));
        }

        let registry = match self.registry {
            RegistrySource::Builder(builder) => Arc::new(builder.build()?),
            RegistrySource::Built(registry) => registry,
        };

        let config = Arc::new(self.config);
        let dispatcher = Arc::new(JsonRpcDispatcher::new(registry));
        let handler = RpcHttpHandler::new(Arc::clone(&config), dispatcher);

        Ok(HttpRpcServer { config, handler })
    }
}

impl Default for HttpRpcServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP JSON-RPC server
#[derive(Clone)]
pub struct HttpRpcServer {
    config: Arc<ServerConfig>,
    handler: RpcHttpHandler,
}

impl HttpRpcServer {
    pub fn builder() -> HttpRpcServerBuilder {
        HttpRpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &RpcHttpHandler {
        &self.handler
    }

    /// Bind the configured address and serve forever
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve connections accepted from `listener`
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("HTTP JSON-RPC server listening on {}", local_addr);
        info!("JSON-RPC endpoint available at: {}", self.config.rpc_path);
        info!(
            "Registered services: {}",
            self.handler.dispatcher.registry().service_names().join(", ")
        );

        loop {
            let (stream, peer_addr) = listener.accept().await?;
            debug!("New connection from {}", peer_addr);

            let handler = self.handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { Ok::<_, Infallible>(handler.handle(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::net::{IpAddr, Ipv4Addr};
    use svcrpc_json_rpc::{Arguments, MethodSignature, ServiceError};

    struct NoopService;

    #[async_trait]
    impl RpcService for NoopService {
        fn signatures(&self) -> Vec<MethodSignature> {
            vec![MethodSignature::new("noop")]
        }

        async fn call(&self, _method: &str, _args: Arguments) -> std::result::Result<Value, ServiceError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.rpc_path, "/rpc");
        assert!(config.enable_cors);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(config.bind_address.port(), 8000);
    }

    #[test]
    fn test_builder() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 3000);
        let server = HttpRpcServer::builder()
            .bind_address(addr)
            .rpc_path("/api/rpc")
            .cors(false)
            .max_body_size(2048)
            .build()
            .unwrap();

        assert_eq!(server.config().bind_address, addr);
        assert_eq!(server.config().rpc_path, "/api/rpc");
        assert!(!server.config().enable_cors);
        assert_eq!(server.config().max_body_size, 2048);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            HttpRpcServer::builder().rpc_path("rpc").build(),
            Err(HttpRpcError::InvalidConfig(_))
        ));
        assert!(matches!(
            HttpRpcServer::builder().max_body_size(0).build(),
            Err(HttpRpcError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_prebuilt_registry_is_frozen() {
        let registry = Arc::new(ServiceRegistry::builder().build().unwrap());
        let result = HttpRpcServer::builder()
            .registry(registry)
            .service("late", NoopService)
            .build();
        assert!(matches!(result, Err(HttpRpcError::InvalidConfig(_))));
    }

    #[test]
    fn test_services_are_registered() {
        let server = HttpRpcServer::builder()
            .service("noop", NoopService)
            .build()
            .unwrap();
        assert!(server.handler().dispatcher.registry().contains("noop"));
    }

    #[test]
    fn test_registry_errors_surface_at_build() {
        let result = HttpRpcServer::builder()
            .service("noop", NoopService)
            .service("noop", NoopService)
            .build();
        assert!(matches!(result, Err(HttpRpcError::Registry(_))));
    }
}
