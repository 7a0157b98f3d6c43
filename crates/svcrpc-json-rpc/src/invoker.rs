//! Invocation with fault isolation

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tracing::warn;

use crate::binder::Arguments;
use crate::error::DispatchError;
use crate::registry::RpcService;

/// Call `method` on `handler`.
///
/// Errors returned by the handler and panics raised while it runs both come
/// back as [`DispatchError::Fault`] carrying the fault's message.
pub async fn invoke(
    handler: &dyn RpcService,
    method: &str,
    args: Arguments,
) -> Result<Value, DispatchError> {
    match AssertUnwindSafe(handler.call(method, args))
        .catch_unwind()
        .await
    {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(DispatchError::Fault(err.to_string())),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(method, %message, "service method panicked");
            Err(DispatchError::Fault(message))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "service method panicked".to_string()
    }
}
