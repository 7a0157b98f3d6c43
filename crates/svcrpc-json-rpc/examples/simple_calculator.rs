//! Simple Calculator JSON-RPC Example
//!
//! Registers a `calc` service and pushes a handful of raw requests through the
//! dispatcher, printing each response envelope.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use svcrpc_json_rpc::prelude::*;

#[derive(Debug, Deserialize)]
struct Vector {
    x: f64,
    y: f64,
}

/// Calculator service with a defaulted parameter and an object-typed one
struct CalculatorService;

#[async_trait]
impl RpcService for CalculatorService {
    fn signatures(&self) -> Vec<MethodSignature> {
        vec![
            MethodSignature::new("add")
                .param(ParamDescriptor::required("a"))
                .param(ParamDescriptor::optional("b")),
            MethodSignature::new("divide")
                .param(ParamDescriptor::required("a"))
                .param(ParamDescriptor::required("b")),
            MethodSignature::new("length").param(ParamDescriptor::object::<Vector>("v")),
        ]
    }

    async fn call(&self, method: &str, mut args: Arguments) -> Result<Value, ServiceError> {
        match method {
            "add" => {
                let a: f64 = args.require(0)?;
                let b: f64 = args.take(1)?.unwrap_or(0.0);
                Ok(json!(a + b))
            }
            "divide" => {
                let a: f64 = args.require(0)?;
                let b: f64 = args.require(1)?;
                if b == 0.0 {
                    return Err(ServiceError::failed("division by zero"));
                }
                Ok(json!(a / b))
            }
            "length" => {
                let v: Vector = args.require(0)?;
                Ok(json!((v.x * v.x + v.y * v.y).sqrt()))
            }
            other => Err(ServiceError::failed(format!("unhandled method {}", other))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = ServiceRegistry::builder()
        .register("calc", CalculatorService)
        .build()?;
    let dispatcher = JsonRpcDispatcher::new(Arc::new(registry));

    let requests = [
        r#"{"jsonrpc": "2.0", "method": "calc:add", "params": [5, 3], "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "calc:add", "params": {"a": 10}, "id": 2}"#,
        r#"{"jsonrpc": "2.0", "method": "calc:length", "params": {"v": {"x": 3, "y": 4}}, "id": 3}"#,
        r#"{"jsonrpc": "2.0", "method": "calc:divide", "params": [1, 0], "id": 4}"#,
        r#"{"jsonrpc": "2.0", "method": "calc:multiply", "params": [2, 3], "id": 5}"#,
        r#"{"jsonrpc": "2.0", "method": "calc:add", "params": [1, 2, 3], "id": 6}"#,
        r#"{"jsonrpc": "2.0", "method": "calc:add", "id": 7"#,
    ];

    for request in requests {
        let response = dispatcher.handle_bytes_encoded(request.as_bytes()).await;
        println!("--> {}", request);
        println!("<-- {}", String::from_utf8_lossy(&response));
    }

    Ok(())
}
