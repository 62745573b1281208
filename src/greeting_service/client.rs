//! HTTP client for `GreetingService`.
//!
//! Generated by rpc-http-gen. Do not edit.

use ::rpc_http_bridge::client::{ClientError, ClientRoute, HttpClient};
use ::rpc_http_bridge::context::CallContext;

use super::messages::{GreetRequest, SayHelloRequest, SayHelloResponse};

/// Calls `GreetingService` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct GreetingServiceHttpClient {
    inner: HttpClient,
    say_hello_route: ClientRoute,
    greet_by_name_route: ClientRoute,
}

impl GreetingServiceHttpClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(HttpClient::new(base_url)?)
    }

    /// Wrap an existing transport, sharing its connection pool.
    pub fn with_client(inner: HttpClient) -> Result<Self, ClientError> {
        Ok(Self {
            inner,
            say_hello_route: ClientRoute::new("GreetingService.SayHello", super::say_hello_rule())?,
            greet_by_name_route: ClientRoute::new("GreetingService.GreetByName", super::greet_by_name_rule())?,
        })
    }

    pub fn inner(&self) -> &HttpClient {
        &self.inner
    }

    /// `POST /v1/greeting/hello`
    pub async fn say_hello(
        &self,
        ctx: &CallContext,
        request: &SayHelloRequest,
    ) -> Result<SayHelloResponse, ClientError> {
        self.inner.invoke(&self.say_hello_route, ctx, request).await
    }

    /// `GET /v1/greet/{name}`
    pub async fn greet_by_name(
        &self,
        ctx: &CallContext,
        request: &GreetRequest,
    ) -> Result<SayHelloResponse, ClientError> {
        self.inner.invoke(&self.greet_by_name_route, ctx, request).await
    }
}
