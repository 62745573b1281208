//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use rpc_http_bridge::client::HttpClient;
use rpc_http_bridge::config::ServerConfig;
use rpc_http_bridge::demo::greeting_mux;
use rpc_http_bridge::greeting_service::GreetingServiceHttpClient;
use rpc_http_bridge::http::{DispatchOptions, HttpServer};
use rpc_http_bridge::lifecycle::Shutdown;

/// Serve the greeting demo on an ephemeral port.
pub async fn start_greeting_server(config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let dispatcher = greeting_mux(DispatchOptions::from_config(&config)).unwrap().build();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(dispatcher, &config);
    tokio::spawn(server.run(listener, shutdown.clone()));
    (addr, shutdown)
}

/// A reqwest client that ignores proxy environment variables.
pub fn plain_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[allow(dead_code)]
pub fn greeting_client(addr: SocketAddr) -> GreetingServiceHttpClient {
    let inner = HttpClient::with_client(plain_client(), &format!("http://{addr}")).unwrap();
    GreetingServiceHttpClient::with_client(inner).unwrap()
}

/// Start a raw HTTP backend whose status and body come from `f`.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    403 => "403 Forbidden",
                    404 => "404 Not Found",
                    429 => "429 Too Many Requests",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "500 Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });
    addr
}
