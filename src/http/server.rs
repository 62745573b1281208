//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the dispatcher in an axum `Router`
//! - Wire up middleware (request ID, tracing spans)
//! - Serve until shutdown, then drain in-flight requests for a bounded time

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::lifecycle::Shutdown;

/// HTTP front end for a `Dispatcher`.
pub struct HttpServer {
    router: Router,
    grace: Duration,
}

impl HttpServer {
    pub fn new(dispatcher: Dispatcher, config: &ServerConfig) -> Self {
        Self {
            router: Self::build_router(dispatcher),
            grace: Duration::from_secs(config.shutdown_grace_secs),
        }
    }

    /// Request ID is assigned outermost so the trace span can record it.
    fn build_router(dispatcher: Dispatcher) -> Router {
        dispatcher
            .into_router()
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "rpc_http",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = request_id(request.headers()).unwrap_or("-"),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` triggers.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let stop = shutdown.signalled();
        let drain = shutdown.signalled();
        let mut serve = tokio::spawn(
            axum::serve(listener, self.router)
                .with_graceful_shutdown(stop)
                .into_future(),
        );

        tokio::select! {
            result = &mut serve => return flatten(result),
            _ = drain => {
                tracing::info!(grace_secs = self.grace.as_secs(), "Draining in-flight requests");
            }
        }

        match tokio::time::timeout(self.grace, &mut serve).await {
            Ok(result) => flatten(result)?,
            Err(_) => {
                tracing::warn!("Drain deadline passed, aborting remaining requests");
                serve.abort();
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn flatten(result: Result<Result<(), std::io::Error>, tokio::task::JoinError>) -> Result<(), std::io::Error> {
    result.map_err(std::io::Error::other)?
}
