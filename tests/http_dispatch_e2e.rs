//! End-to-end tests against the calculator server over real HTTP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use serial_test::serial;
use svcrpc_http_server::HttpRpcServer;
use tokio::net::TcpListener;

/// Start the calculator server on a free port and return its endpoint URL
async fn start_server() -> String {
    let port = portpicker::pick_unused_port().expect("No available port");
    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();

    let server = HttpRpcServer::builder()
        .bind_address(addr)
        .registry(Arc::new(calculator_server::registry().unwrap()))
        .build()
        .expect("Failed to build server");

    let listener = TcpListener::bind(addr).await.expect("Failed to bind");
    tokio::spawn(async move {
        server.serve(listener).await.ok();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{}/rpc", addr)
}

async fn post_raw(client: &Client, url: &str, body: impl Into<String>) -> (StatusCode, Value) {
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .body(body.into())
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body: Value = response.json().await.expect("Failed to parse JSON");
    (status, body)
}

async fn post(client: &Client, url: &str, request: Value) -> Value {
    let (status, body) = post_raw(client, url, request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
#[serial]
async fn test_positional_and_named_calls() {
    let url = start_server().await;
    let client = Client::new();

    let body = post(
        &client,
        &url,
        json!({"jsonrpc": "2.0", "method": "calc:add", "params": [2, 3], "id": 7}),
    )
    .await;
    assert_eq!(body, json!({"jsonrpc": "2.0", "result": 5, "id": 7}));

    let body = post(
        &client,
        &url,
        json!({"jsonrpc": "2.0", "method": "calc:add", "params": {"a": 2}, "id": 8}),
    )
    .await;
    assert_eq!(body, json!({"jsonrpc": "2.0", "result": 2, "id": 8}));
}

#[tokio::test]
#[serial]
async fn test_error_codes_over_http() {
    let url = start_server().await;
    let client = Client::new();

    let (status, body) = post_raw(&client, &url, "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], json!(-32700));
    assert_eq!(body["id"], Value::Null);

    let cases = [
        (json!({"jsonrpc": "1.0", "method": "calc:add", "id": 1}), -32600),
        (json!({"jsonrpc": "2.0", "method": 5, "id": 2}), -32600),
        (json!({"jsonrpc": "2.0", "method": "calc:add", "params": 3, "id": 3}), -32600),
        (json!({"jsonrpc": "2.0", "method": "calc", "id": 4}), -32601),
        (json!({"jsonrpc": "2.0", "method": "nope:add", "id": 5}), -32601),
        (json!({"jsonrpc": "2.0", "method": "calc:pow", "id": 6}), -32601),
        (json!({"jsonrpc": "2.0", "method": "calc:add", "params": [], "id": 7}), -32602),
        (json!({"jsonrpc": "2.0", "method": "calc:add", "params": [1, 2, 3], "id": 8}), -32602),
        (json!({"jsonrpc": "2.0", "method": "calc:add", "params": {"b": 1}, "id": 9}), -32602),
        (json!({"jsonrpc": "2.0", "method": "calc:divide", "params": [1, 0], "id": 10}), -32603),
    ];

    for (request, code) in cases {
        let id = request["id"].clone();
        let body = post(&client, &url, request).await;
        assert_eq!(body["error"]["code"], json!(code), "unexpected response {}", body);
        assert_eq!(body["id"], id);
        assert!(body.get("result").is_none());
    }
}

#[tokio::test]
#[serial]
async fn test_object_params_are_decoded() {
    let url = start_server().await;
    let client = Client::new();

    let body = post(
        &client,
        &url,
        json!({
            "jsonrpc": "2.0",
            "method": "calc:distance",
            "params": [{"x": 0, "y": 0}, {"x": 6, "y": 8}],
            "id": "d1"
        }),
    )
    .await;
    assert_eq!(body["result"], json!(10.0));
    assert_eq!(body["id"], json!("d1"));

    let body = post(
        &client,
        &url,
        json!({
            "jsonrpc": "2.0",
            "method": "calc:distance",
            "params": [{"x": "three"}],
            "id": "d2"
        }),
    )
    .await;
    assert_eq!(body["error"]["code"], json!(-32602));
}

#[tokio::test]
#[serial]
async fn test_capability_alias_and_concurrency() {
    let url = start_server().await;
    let client = Client::new();

    let mut tasks = Vec::new();
    for i in 0..8i64 {
        let client = client.clone();
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            let (method, params) = if i % 2 == 0 {
                ("health:ping", json!([]))
            } else {
                ("calc:add", json!([i, i]))
            };
            let body = post(
                &client,
                &url,
                json!({"jsonrpc": "2.0", "method": method, "params": params, "id": i}),
            )
            .await;
            (i, body)
        }));
    }

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body["id"], json!(i));
        if i % 2 == 0 {
            assert_eq!(body["result"], json!("pong"));
        } else {
            assert_eq!(body["result"], json!(i * 2));
        }
    }
}

#[tokio::test]
#[serial]
async fn test_non_post_is_rejected() {
    let url = start_server().await;
    let response = Client::new().get(&url).send().await.expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
