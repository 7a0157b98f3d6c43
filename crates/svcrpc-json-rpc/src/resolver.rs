//! Resolution of `service:method` identifiers against the registry

use std::sync::Arc;

use crate::error::DispatchError;
use crate::registry::{RpcService, ServiceRegistry};
use crate::signature::MethodSignature;

/// Separates the service name from the method name
pub const METHOD_DELIMITER: char = ':';

/// A method located on a registered service
#[derive(Clone)]
pub struct ResolvedMethod<'a> {
    pub service_name: &'a str,
    pub method_name: &'a str,
    pub handler: Arc<dyn RpcService>,
    pub signature: &'a MethodSignature,
}

/// Split a composite identifier into `(service, method)`.
///
/// Exactly one delimiter is required and neither side may be empty.
pub fn split_method(method: &str) -> Option<(&str, &str)> {
    let (service, name) = method.split_once(METHOD_DELIMITER)?;
    if service.is_empty() || name.is_empty() || name.contains(METHOD_DELIMITER) {
        return None;
    }
    Some((service, name))
}

/// Look up the service and method named by `method`
pub fn resolve<'a>(
    registry: &'a ServiceRegistry,
    method: &'a str,
) -> Result<ResolvedMethod<'a>, DispatchError> {
    let (service_name, method_name) = split_method(method).ok_or_else(|| {
        DispatchError::MethodNotFound(format!(
            "Method '{}' must have the form 'service{}method'",
            method, METHOD_DELIMITER
        ))
    })?;

    let entry = registry.get(service_name).ok_or_else(|| {
        DispatchError::MethodNotFound(format!("Service '{}' is not registered", service_name))
    })?;

    let signature = entry.method(method_name).ok_or_else(|| {
        DispatchError::MethodNotFound(format!(
            "Service '{}' has no method '{}'",
            service_name, method_name
        ))
    })?;

    Ok(ResolvedMethod {
        service_name,
        method_name,
        handler: Arc::clone(entry.handler()),
        signature,
    })
}
