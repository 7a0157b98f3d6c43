//! # Calculator JSON-RPC Server
//!
//! Serves the `calc` and `system` services (the latter also reachable through
//! the `health` capability) over HTTP.
//!
//! ## Usage
//! ```bash
//! cargo run --package calculator-server -- --bind 127.0.0.1:8000
//! ```
//!
//! ```bash
//! curl -X POST http://127.0.0.1:8000/rpc \
//!   -H "Content-Type: application/json" \
//!   -d '{"jsonrpc":"2.0","method":"calc:add","params":[2,3],"id":7}'
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use svcrpc_http_server::HttpRpcServer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Path of the JSON-RPC endpoint
    #[arg(short, long, default_value = "/rpc")]
    path: String,

    /// Disable CORS headers
    #[arg(long, default_value = "false")]
    no_cors: bool,

    /// Maximum request body size in bytes
    #[arg(long, default_value = "1048576")]
    max_body_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let registry = calculator_server::registry().context("failed to build service registry")?;
    info!("Starting calculator server on {}{}", args.bind, args.path);

    let server = HttpRpcServer::builder()
        .bind_address(args.bind)
        .rpc_path(args.path)
        .cors(!args.no_cors)
        .max_body_size(args.max_body_size)
        .registry(Arc::new(registry))
        .build()
        .context("invalid server configuration")?;

    server.run().await?;
    Ok(())
}
