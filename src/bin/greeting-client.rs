//! Polls the greeting demo server with `SayHello` every couple of seconds.

use std::time::Duration;

use clap::Parser;

use rpc_http_bridge::config::ObservabilityConfig;
use rpc_http_bridge::context::CallContext;
use rpc_http_bridge::greeting_service::{GreetingServiceHttpClient, SayHelloRequest};
use rpc_http_bridge::lifecycle::wait_for_termination;
use rpc_http_bridge::observability::init_logging;

#[derive(Parser)]
#[command(name = "greeting-client")]
#[command(about = "Polling client for the greeting demo server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Seconds between calls
    #[arg(short, long, default_value_t = 2)]
    interval: u64,

    /// Per-call deadline in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Stop after this many calls; runs until interrupted when omitted
    #[arg(short, long)]
    count: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&ObservabilityConfig::default())?;

    let client = GreetingServiceHttpClient::new(&cli.url)?;
    let mut ticker = tokio::time::interval(Duration::from_secs(cli.interval.max(1)));
    let stop = wait_for_termination();
    tokio::pin!(stop);

    let mut sent = 0u64;
    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {}
        }

        let request = SayHelloRequest {
            ping: format!("Hello {}", fastrand::u32(..100)),
        };
        let ctx = CallContext::new().with_timeout(Duration::from_millis(cli.timeout_ms));
        match client.say_hello(&ctx, &request).await {
            Ok(reply) => tracing::info!(ping = %request.ping, pong = %reply.pong, "SayHello"),
            Err(e) => tracing::warn!(code = %e.code(), error = %e, "SayHello failed"),
        }

        sent += 1;
        if cli.count.is_some_and(|count| sent >= count) {
            break;
        }
    }
    Ok(())
}
