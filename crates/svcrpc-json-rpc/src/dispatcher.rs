use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    binder::bind,
    codec::{Codec, JsonCodec},
    error::{DispatchError, JsonRpcError},
    invoker::invoke,
    registry::ServiceRegistry,
    request::JsonRpcRequest,
    resolver::resolve,
    response::JsonRpcMessage,
    validate::parse_request_with,
};

/// Routes validated requests to registered services.
///
/// The dispatcher owns a shared, immutable registry and keeps no other state,
/// so one instance can serve concurrent requests from any number of tasks.
#[derive(Clone)]
pub struct JsonRpcDispatcher {
    registry: Arc<ServiceRegistry>,
    codec: Arc<dyn Codec>,
}

impl JsonRpcDispatcher {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self::with_codec(registry, Arc::new(JsonCodec))
    }

    pub fn with_codec(registry: Arc<ServiceRegistry>, codec: Arc<dyn Codec>) -> Self {
        Self { registry, codec }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Resolve, bind and invoke a validated request
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        let JsonRpcRequest {
            method, params, id, ..
        } = request;

        match self.execute(&method, params).await {
            Ok(result) => {
                debug!(%method, %id, "request succeeded");
                JsonRpcMessage::success(id, result)
            }
            Err(error) => {
                warn!(%method, %id, code = error.code().code(), %error, "request failed");
                JsonRpcMessage::failure(id, error)
            }
        }
    }

    async fn execute(
        &self,
        method: &str,
        params: Option<crate::request::RequestParams>,
    ) -> Result<serde_json::Value, DispatchError> {
        let resolved = resolve(&self.registry, method)?;
        let args = bind(params, resolved.signature)?;
        invoke(resolved.handler.as_ref(), resolved.method_name, args).await
    }

    /// Validate a raw request body and dispatch it
    pub async fn handle_bytes(&self, raw: &[u8]) -> JsonRpcMessage {
        match parse_request_with(self.codec.as_ref(), raw) {
            Ok(request) => self.dispatch(request).await,
            Err(error) => {
                warn!(code = error.error.code, "rejected request envelope");
                JsonRpcMessage::error(error)
            }
        }
    }

    /// Like [`handle_bytes`](Self::handle_bytes) but returns the encoded response body
    pub async fn handle_bytes_encoded(&self, raw: &[u8]) -> Vec<u8> {
        let message = self.handle_bytes(raw).await;
        self.encode(&message)
    }

    /// Encode `message`, falling back to an internal-error envelope
    pub fn encode(&self, message: &JsonRpcMessage) -> Vec<u8> {
        match self.codec.encode(message) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to encode response: {}", e);
                let fallback = JsonRpcMessage::error(JsonRpcError::internal_error(
                    message.id().clone(),
                    e.to_string(),
                ));
                self.codec.encode(&fallback).unwrap_or_default()
            }
        }
    }
}
