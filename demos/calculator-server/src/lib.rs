//! Services exposed by the calculator demo server

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use svcrpc_json_rpc::prelude::*;

/// Capability tag under which [`HealthService`] is also reachable
pub const HEALTH: Capability = Capability::new("health");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Arithmetic over numbers, number lists and points
#[derive(Debug, Default)]
pub struct CalculatorService;

#[async_trait]
impl RpcService for CalculatorService {
    fn signatures(&self) -> Vec<MethodSignature> {
        vec![
            MethodSignature::new("add")
                .param(ParamDescriptor::required("a"))
                .param(ParamDescriptor::optional("b")),
            MethodSignature::new("subtract")
                .param(ParamDescriptor::required("minuend"))
                .param(ParamDescriptor::required("subtrahend")),
            MethodSignature::new("divide")
                .param(ParamDescriptor::required("dividend"))
                .param(ParamDescriptor::required("divisor")),
            MethodSignature::new("sum").param(ParamDescriptor::array("values")),
            MethodSignature::new("distance")
                .param(ParamDescriptor::object::<Point>("from"))
                .param(ParamDescriptor::optional_object::<Point>("to")),
        ]
    }

    async fn call(&self, method: &str, mut args: Arguments) -> Result<Value, ServiceError> {
        debug!(method, args = ?args, "calculator call");
        match method {
            "add" => {
                let a: f64 = args.require(0)?;
                let b: f64 = args.take(1)?.unwrap_or(0.0);
                Ok(number(a + b))
            }
            "subtract" => {
                let minuend: f64 = args.require(0)?;
                let subtrahend: f64 = args.require(1)?;
                Ok(number(minuend - subtrahend))
            }
            "divide" => {
                let dividend: f64 = args.require(0)?;
                let divisor: f64 = args.require(1)?;
                if divisor == 0.0 {
                    return Err(ServiceError::failed("Division by zero"));
                }
                Ok(number(dividend / divisor))
            }
            "sum" => {
                let values: Vec<f64> = args.require(0)?;
                Ok(number(values.iter().sum()))
            }
            "distance" => {
                let from: Point = args.require(0)?;
                let to = args.take::<Point>(1)?.unwrap_or(Point { x: 0.0, y: 0.0 });
                Ok(json!(((from.x - to.x).powi(2) + (from.y - to.y).powi(2)).sqrt()))
            }
            other => Err(ServiceError::failed(format!("Unhandled method '{}'", other))),
        }
    }
}

/// Integral results are reported as integers
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Liveness probe, addressable as `system` and as the `health` capability
#[derive(Debug)]
pub struct HealthService {
    started: Instant,
}

impl HealthService {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcService for HealthService {
    fn signatures(&self) -> Vec<MethodSignature> {
        vec![
            MethodSignature::new("ping"),
            MethodSignature::new("status"),
            MethodSignature::new("fail").param(ParamDescriptor::optional("message")),
        ]
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![HEALTH]
    }

    async fn call(&self, method: &str, mut args: Arguments) -> Result<Value, ServiceError> {
        match method {
            "ping" => Ok(json!("pong")),
            "status" => Ok(json!({
                "status": "running",
                "uptime_seconds": self.started.elapsed().as_secs(),
            })),
            "fail" => {
                let message: String = args
                    .take(0)?
                    .unwrap_or_else(|| "requested failure".to_string());
                Err(ServiceError::Failed(message))
            }
            other => Err(ServiceError::failed(format!("Unhandled method '{}'", other))),
        }
    }
}

/// Registry with every demo service
pub fn registry() -> Result<ServiceRegistry, svcrpc_json_rpc::RegistryError> {
    ServiceRegistry::builder()
        .register("calc", CalculatorService)
        .register("system", HealthService::new())
        .build()
}
