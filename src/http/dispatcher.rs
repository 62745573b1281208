//! Server dispatcher.
//!
//! # Per-request state machine
//! ```text
//! RECEIVED → MATCHED → DECODED → INVOKED → ENCODED → SENT
//!               │          │         │          │
//!               ▼          ▼         ▼          ▼
//!           NOT_FOUND  INVALID_   service    INTERNAL
//!                      ARGUMENT   code /
//!                                 INTERNAL
//! ```
//!
//! # Design Decisions
//! - `ServeMux` collects routes; `build()` freezes them into a `Dispatcher`
//!   whose route table is shared read-only behind an `Arc`
//! - No stage is retried; one match, one decode, one invocation, one encode
//! - The response body is fully encoded before any header is produced
//! - Each request owns a cancellation token that fires when the request
//!   future is dropped, so an abandoned connection aborts the service call

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures_util::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::codec::{decode_request, encode_response, DecodeOptions, Message};
use crate::config::ServerConfig;
use crate::context::CallContext;
use crate::descriptor::{HttpRule, HttpVerb};
use crate::http::request::{grpc_timeout, request_id};
use crate::http::response::{error_response, json_response};
use crate::observability::metrics;
use crate::routing::{CompileError, PathParams, RoutePattern, RouteTable};
use crate::status::{OutcomeCode, Status};

/// Stage at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Matched,
    Decoded,
    Invoked,
    Encoded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Matched => "matched",
            Stage::Decoded => "decoded",
            Stage::Invoked => "invoked",
            Stage::Encoded => "encoded",
        })
    }
}

/// Dispatcher limits and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Deadline for requests without a `grpc-timeout` header.
    pub default_timeout: Option<Duration>,
    pub max_body_size: usize,
    pub decode: DecodeOptions,
}

impl DispatchOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            default_timeout: (config.default_timeout_ms > 0)
                .then(|| Duration::from_millis(config.default_timeout_ms)),
            max_body_size: config.max_body_size,
            decode: DecodeOptions {
                strict: config.strict_decoding,
            },
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// What a route handler receives once the route matched.
struct Invocation {
    params: PathParams,
    query: Option<String>,
    body: Bytes,
}

type Failure = (Stage, Status);
type ErasedHandler = dyn Fn(CallContext, Invocation) -> BoxFuture<'static, Result<Vec<u8>, Failure>> + Send + Sync;

struct Route {
    /// `Service.Method`, used in logs and metrics.
    name: String,
    handler: Arc<ErasedHandler>,
}

/// Route registry filled by generated `register_*_handler_server` functions.
pub struct ServeMux {
    routes: RouteTable<Route>,
    options: DispatchOptions,
}

impl ServeMux {
    pub fn new() -> Self {
        Self::with_options(DispatchOptions::default())
    }

    pub fn with_options(options: DispatchOptions) -> Self {
        Self {
            routes: RouteTable::new(),
            options,
        }
    }

    /// Bind `handler` to the route described by `rule`.
    ///
    /// Fails on a malformed template or when the route is ambiguous with one
    /// already registered.
    pub fn handle<Req, Resp, F, Fut>(
        &mut self,
        service: &str,
        method: &str,
        rule: HttpRule,
        handler: F,
    ) -> Result<(), CompileError>
    where
        Req: Message,
        Resp: Message,
        F: Fn(CallContext, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, Status>> + Send + 'static,
    {
        let pattern = RoutePattern::compile(rule.verb, &rule.path)?;
        let name = format!("{service}.{method}");
        let decode_options = self.options.decode;
        let rule = Arc::new(rule);

        let erased = move |ctx: CallContext, input: Invocation| -> BoxFuture<'static, Result<Vec<u8>, Failure>> {
            let request = match decode_request::<Req>(
                &rule,
                &input.params,
                input.query.as_deref(),
                &input.body,
                decode_options,
            ) {
                Ok(request) => request,
                Err(e) => {
                    return futures_util::future::ready(Err((Stage::Decoded, Status::invalid_argument(e.to_string()))))
                        .boxed()
                }
            };

            let call = match std::panic::catch_unwind(AssertUnwindSafe(|| handler(ctx.clone(), request))) {
                Ok(call) => call,
                Err(panic) => return futures_util::future::ready(Err((Stage::Invoked, panicked(panic)))).boxed(),
            };

            let rule = Arc::clone(&rule);
            async move {
                let response = match ctx.run(AssertUnwindSafe(call).catch_unwind()).await {
                    Err(status) => return Err((Stage::Invoked, status)),
                    Ok(Err(panic)) => return Err((Stage::Invoked, panicked(panic))),
                    Ok(Ok(Err(status))) => return Err((Stage::Invoked, status)),
                    Ok(Ok(Ok(response))) => response,
                };
                encode_response(&response, rule.response_body.as_deref())
                    .map_err(|e| (Stage::Encoded, Status::internal(e.to_string())))
            }
            .boxed()
        };

        tracing::debug!(route = %pattern, method = %name, "Registered route");
        self.routes.insert(
            pattern,
            Route {
                name,
                handler: Arc::new(erased),
            },
        )
    }

    /// Registered patterns in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.patterns()
    }

    /// Freeze the registry.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            inner: Arc::new(Inner {
                routes: self.routes,
                options: self.options,
            }),
        }
    }
}

impl Default for ServeMux {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    routes: RouteTable<Route>,
    options: DispatchOptions,
}

/// Immutable request dispatcher; cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn options(&self) -> &DispatchOptions {
        &self.inner.options
    }

    pub fn route_count(&self) -> usize {
        self.inner.routes.len()
    }

    /// Serve one request end to end. Never fails; errors become responses.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request_id(request.headers())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let (parts, body) = request.into_parts();

        let matched = HttpVerb::from_method(&parts.method)
            .and_then(|verb| self.inner.routes.lookup(verb, parts.uri.path()));
        let Some(matched) = matched else {
            tracing::debug!(
                request_id = %request_id,
                stage = %Stage::Matched,
                method = %parts.method,
                path = %parts.uri.path(),
                "No route matched"
            );
            let status = Status::not_found(format!("no route for {} {}", parts.method, parts.uri.path()));
            metrics::record_request("none", status.code(), start);
            return error_response(&status, &request_id);
        };
        let route = matched.value;

        let result = self.invoke(route, matched.params, parts, body, &request_id).await;
        match result {
            Ok(bytes) => {
                tracing::debug!(request_id = %request_id, method = %route.name, "Request completed");
                metrics::record_request(&route.name, OutcomeCode::Ok, start);
                json_response(StatusCode::OK, bytes, &request_id)
            }
            Err((stage, status)) => {
                if status.code().http_status().is_server_error() {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %route.name,
                        stage = %stage,
                        code = %status.code(),
                        error = %status.message(),
                        "Request failed"
                    );
                } else {
                    tracing::debug!(
                        request_id = %request_id,
                        method = %route.name,
                        stage = %stage,
                        code = %status.code(),
                        "Request rejected"
                    );
                }
                metrics::record_request(&route.name, status.code(), start);
                error_response(&status, &request_id)
            }
        }
    }

    async fn invoke(
        &self,
        route: &Route,
        params: PathParams,
        parts: axum::http::request::Parts,
        body: Body,
        request_id: &str,
    ) -> Result<Vec<u8>, Failure> {
        let timeout = grpc_timeout(&parts.headers)
            .map_err(|raw| (Stage::Decoded, Status::invalid_argument(format!("invalid grpc-timeout {raw:?}"))))?
            .or(self.inner.options.default_timeout);

        let max = self.inner.options.max_body_size;
        let body = axum::body::to_bytes(body, max).await.map_err(|e| {
            (
                Stage::Decoded,
                Status::invalid_argument(format!("failed to read request body (limit {max} bytes): {e}")),
            )
        })?;

        let token = CancellationToken::new();
        let _cancel_on_drop = token.clone().drop_guard();
        let mut ctx = CallContext::new()
            .with_cancellation(token)
            .with_request_id(request_id);
        if let Some(timeout) = timeout {
            ctx = ctx.with_timeout(timeout);
        }

        let input = Invocation {
            params,
            query: parts.uri.query().map(str::to_string),
            body,
        };
        (route.handler)(ctx, input).await
    }

    /// An axum router that sends every request through `dispatch`.
    pub fn into_router(self) -> Router {
        Router::new().fallback(move |request: Request<Body>| {
            let dispatcher = self.clone();
            async move { dispatcher.dispatch(request).await }
        })
    }
}

fn panicked(panic: Box<dyn Any + Send>) -> Status {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "Service method panicked");
    Status::internal("service method panicked")
}
