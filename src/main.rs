//! Greeting demo server.
//!
//! Serves the generated `GreetingService` bindings:
//!
//! ```text
//! POST /v1/greeting/hello        {"ping":"x"} → {"pong":"Hello x"}
//! GET  /v1/greet/{name}?title=t               → {"pong":"Hello t name"}
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rpc_http_bridge::config::{load_config, BridgeConfig};
use rpc_http_bridge::demo::greeting_mux;
use rpc_http_bridge::http::{DispatchOptions, HttpServer};
use rpc_http_bridge::lifecycle::{spawn_signal_listener, Shutdown};
use rpc_http_bridge::observability::{init_logging, init_metrics};

#[derive(Parser)]
#[command(name = "rpc-http-bridge")]
#[command(about = "Greeting demo server for the HTTP/JSON bridge", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };

    init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rpc-http-bridge starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = greeting_mux(DispatchOptions::from_config(&config.server))?.build();
    tracing::info!(routes = dispatcher.route_count(), "Routes registered");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signals = spawn_signal_listener(shutdown.clone());
    HttpServer::new(dispatcher, &config.server).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
