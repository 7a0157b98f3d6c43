//! Service registration
//!
//! Services are registered on a [`ServiceRegistryBuilder`] during startup. Once
//! `build()` has run the resulting [`ServiceRegistry`] is immutable and can be
//! shared across any number of concurrent dispatches.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::binder::Arguments;
use crate::error::ServiceError;
use crate::signature::MethodSignature;

/// Typed tag naming an abstract capability a service provides.
///
/// A service declaring a capability is additionally reachable under the
/// capability's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability(&'static str);

impl Capability {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn id(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A named handler exposing callable methods
#[async_trait]
pub trait RpcService: Send + Sync {
    /// Signatures of every callable method, read once at registration
    fn signatures(&self) -> Vec<MethodSignature>;

    /// Capabilities this service is also registered under
    fn capabilities(&self) -> Vec<Capability> {
        vec![]
    }

    /// Invoke `method` with arguments bound against its signature
    async fn call(&self, method: &str, args: Arguments) -> Result<Value, ServiceError>;
}

/// A registered service together with its method table
#[derive(Clone)]
pub struct ServiceEntry {
    name: String,
    handler: Arc<dyn RpcService>,
    methods: Arc<HashMap<String, MethodSignature>>,
}

impl ServiceEntry {
    /// Name the handler was registered with (not the capability alias)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn RpcService> {
        &self.handler
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.get(name)
    }

    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Configuration problems detected while building a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Service registration errors:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// Collects services during startup
#[derive(Default)]
pub struct ServiceRegistryBuilder {
    services: HashMap<String, ServiceEntry>,
    validation_errors: Vec<String>,
}

impl ServiceRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name` and under each declared capability
    pub fn register<S>(mut self, name: impl Into<String>, handler: S) -> Self
    where
        S: RpcService + 'static,
    {
        self.register_arc(name, Arc::new(handler));
        self
    }

    /// Register an already shared handler
    pub fn register_arc(&mut self, name: impl Into<String>, handler: Arc<dyn RpcService>) {
        let name = name.into();
        if !is_addressable(&name) {
            self.validation_errors
                .push(format!("Invalid service name '{}'", name));
            return;
        }

        let mut methods = HashMap::new();
        for signature in handler.signatures() {
            let method = signature.name().to_string();
            if methods.insert(method.clone(), signature).is_some() {
                self.validation_errors.push(format!(
                    "Service '{}' declares method '{}' more than once",
                    name, method
                ));
            }
        }

        let entry = ServiceEntry {
            name: name.clone(),
            handler: Arc::clone(&handler),
            methods: Arc::new(methods),
        };

        let capabilities = handler.capabilities();
        debug!(
            service = %name,
            methods = entry.methods.len(),
            capabilities = capabilities.len(),
            "registering service"
        );

        self.insert(name.clone(), entry.clone());
        for capability in capabilities {
            if !is_addressable(capability.id()) {
                self.validation_errors.push(format!(
                    "Service '{}' declares invalid capability '{}'",
                    name, capability
                ));
                continue;
            }
            self.insert(capability.id().to_string(), entry.clone());
        }
    }

    fn insert(&mut self, key: String, entry: ServiceEntry) {
        if self.services.contains_key(&key) {
            self.validation_errors
                .push(format!("Service name '{}' is already registered", key));
            return;
        }
        self.services.insert(key, entry);
    }

    /// Freeze the registry
    pub fn build(self) -> Result<ServiceRegistry, RegistryError> {
        if !self.validation_errors.is_empty() {
            return Err(RegistryError::Invalid(self.validation_errors));
        }
        Ok(ServiceRegistry {
            services: self.services,
        })
    }
}

/// Names reachable through `service:method`
fn is_addressable(name: &str) -> bool {
    !name.is_empty() && !name.contains(crate::resolver::METHOD_DELIMITER)
}

/// Immutable mapping from service name to handler
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// All addressable names, capability aliases included, sorted
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
