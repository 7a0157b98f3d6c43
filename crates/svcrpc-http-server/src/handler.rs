//! HTTP request handler for JSON-RPC calls

use bytes::Bytes;
use http_body::Body;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::{CorsLayer, ServerConfig};
use svcrpc_json_rpc::JsonRpcDispatcher;

/// Routes HTTP requests on the RPC path to the dispatcher.
///
/// Every JSON-RPC outcome, protocol errors included, is answered with
/// `200 OK`; non-200 statuses are reserved for transport problems.
#[derive(Clone)]
pub struct RpcHttpHandler {
    pub(crate) config: Arc<ServerConfig>,
    pub(crate) dispatcher: Arc<JsonRpcDispatcher>,
}

impl RpcHttpHandler {
    pub fn new(config: Arc<ServerConfig>, dispatcher: Arc<JsonRpcDispatcher>) -> Self {
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle one HTTP request
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("Handling {} {}", method, path);

        let mut response = if path != self.config.rpc_path {
            plain(StatusCode::NOT_FOUND, "Not Found")
        } else {
            match method {
                Method::POST => self.handle_json_rpc_request(req).await,
                Method::OPTIONS => plain(StatusCode::NO_CONTENT, ""),
                _ => {
                    let mut response = plain(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
                    response
                        .headers_mut()
                        .insert(ALLOW, HeaderValue::from_static("POST, OPTIONS"));
                    response
                }
            }
        };

        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    /// Handle JSON-RPC requests over HTTP POST
    async fn handle_json_rpc_request<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let body = Limited::new(req.into_body(), self.config.max_body_size);
        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.is::<LengthLimitError>() => {
                warn!(
                    "Request body exceeds {} bytes",
                    self.config.max_body_size
                );
                return plain(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(err) => {
                error!("Failed to read request body: {}", err);
                return plain(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };

        let encoded = self.dispatcher.handle_bytes_encoded(&body_bytes).await;

        let mut response = Response::new(Full::new(Bytes::from(encoded)));
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static(self.dispatcher.codec().content_type()),
        );
        response
    }
}

fn plain(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(text.as_bytes())));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use http_body::Frame;
    use http_body_util::StreamBody;
    use serde_json::{Value, json};
    use std::convert::Infallible;
    use svcrpc_json_rpc::prelude::*;

    struct Greeter;

    #[async_trait]
    impl RpcService for Greeter {
        fn signatures(&self) -> Vec<MethodSignature> {
            vec![MethodSignature::new("hello").param(ParamDescriptor::required("name"))]
        }

        async fn call(&self, _method: &str, mut args: Arguments) -> Result<Value, ServiceError> {
            let name: String = args.require(0)?;
            Ok(json!(format!("Hello, {}", name)))
        }
    }

    fn create_test_handler(config: ServerConfig) -> RpcHttpHandler {
        let registry = ServiceRegistry::builder()
            .register("greeter", Greeter)
            .build()
            .unwrap();
        RpcHttpHandler::new(
            Arc::new(config),
            Arc::new(JsonRpcDispatcher::new(Arc::new(registry))),
        )
    }

    fn post(path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_success() {
        let handler = create_test_handler(ServerConfig::default());
        let response = handler
            .handle(post(
                "/rpc",
                r#"{"jsonrpc":"2.0","method":"greeter:hello","params":["Ada"],"id":1}"#,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(
            body_json(response).await,
            json!({"jsonrpc": "2.0", "result": "Hello, Ada", "id": 1})
        );
    }

    #[tokio::test]
    async fn test_protocol_errors_are_http_200() {
        let handler = create_test_handler(ServerConfig::default());
        for (body, code) in [
            ("not json", -32700),
            (r#"{"jsonrpc":"1.0","method":"greeter:hello","id":1}"#, -32600),
            (r#"{"jsonrpc":"2.0","method":"greeter:bye","id":1}"#, -32601),
            (r#"{"jsonrpc":"2.0","method":"greeter:hello","params":[],"id":1}"#, -32602),
        ] {
            let response = handler.handle(post("/rpc", body)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await["error"]["code"], json!(code));
        }
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let handler = create_test_handler(ServerConfig::default());

        let response = handler.handle(post("/other", "{}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let get = Request::builder()
            .method(Method::GET)
            .uri("/rpc")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handler.handle(get).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "POST, OPTIONS");
    }

    #[tokio::test]
    async fn test_preflight_and_cors() {
        let handler = create_test_handler(ServerConfig::default());
        let options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/rpc")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handler.handle(options).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get("Access-Control-Allow-Origin").unwrap(), "*");

        let handler = create_test_handler(ServerConfig {
            enable_cors: false,
            ..ServerConfig::default()
        });
        let response = handler.handle(post("/rpc", "{}")).await;
        assert!(!response.headers().contains_key("Access-Control-Allow-Origin"));
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let handler = create_test_handler(ServerConfig {
            max_body_size: 16,
            ..ServerConfig::default()
        });
        let response = handler
            .handle(post(
                "/rpc",
                r#"{"jsonrpc":"2.0","method":"greeter:hello","params":["Ada"],"id":1}"#,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    type Chunk = Result<Frame<Bytes>, Infallible>;
    type ChunkStream = stream::Iter<std::vec::IntoIter<Chunk>>;

    fn streamed(chunks: Vec<&'static str>) -> Request<StreamBody<ChunkStream>> {
        let frames: Vec<Chunk> = chunks
            .into_iter()
            .map(|chunk| Ok(Frame::data(Bytes::from_static(chunk.as_bytes()))))
            .collect();
        Request::builder()
            .method(Method::POST)
            .uri("/rpc")
            .body(StreamBody::new(stream::iter(frames)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_chunked_body_within_limit() {
        let handler = create_test_handler(ServerConfig {
            max_body_size: 128,
            ..ServerConfig::default()
        });
        let response = handler
            .handle(streamed(vec![
                r#"{"jsonrpc":"2.0","#,
                r#""method":"greeter:hello","#,
                r#""params":["Ada"],"id":1}"#,
            ]))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], json!("Hello, Ada"));
    }

    #[tokio::test]
    async fn test_chunked_body_over_limit() {
        let handler = create_test_handler(ServerConfig {
            max_body_size: 16,
            ..ServerConfig::default()
        });
        let response = handler
            .handle(streamed(vec!["{\"jsonrpc\":", "\"2.0\",", "\"method\":\"x:y\"}"]))
            .await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_endless_body_is_cut_off() {
        let handler = create_test_handler(ServerConfig {
            max_body_size: 1024,
            ..ServerConfig::default()
        });
        let endless = stream::repeat_with(|| -> Chunk {
            Ok(Frame::data(Bytes::from_static(b"[1,2,3,4,5,6,7,8],")))
        });
        let request = Request::builder()
            .method(Method::POST)
            .uri("/rpc")
            .body(StreamBody::new(endless))
            .unwrap();
        let response = handler.handle(request).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
