//! Shared runtime behind generated client stubs.
//!
//! # Call sequence
//! 1. Fail fast if the context is already cancelled or past its deadline
//! 2. Encode the request into path segments, query pairs and a body
//! 3. Send it, racing the exchange against the context
//! 4. Decode the success body, or build a `ClientError` from the error body

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::client::error::ClientError;
use crate::codec::encode::is_unroutable_segment;
use crate::codec::{decode_response, encode_request, DecodeOptions, EncodedRequest, Message};
use crate::context::CallContext;
use crate::descriptor::HttpRule;
use crate::http::request::{format_grpc_timeout, GRPC_TIMEOUT, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::RoutePattern;
use crate::status::OutcomeCode;

/// One method's binding, compiled once when the client is built.
#[derive(Debug, Clone)]
pub struct ClientRoute {
    name: String,
    rule: HttpRule,
    pattern: RoutePattern,
}

impl ClientRoute {
    /// `name` is the `Service.Method` label used in logs and metrics.
    pub fn new(name: impl Into<String>, rule: HttpRule) -> Result<Self, ClientError> {
        let pattern = RoutePattern::compile(rule.verb, &rule.path)?;
        Ok(Self {
            name: name.into(),
            rule,
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &HttpRule {
        &self.rule
    }
}

/// HTTP transport plus base URL; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: Url,
    decode: DecodeOptions,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::new(OutcomeCode::Internal, format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, base_url)
    }

    /// Reuse an existing `reqwest::Client` and its pool.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::new(OutcomeCode::InvalidArgument, format!("invalid base URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                OutcomeCode::InvalidArgument,
                format!("base URL {base_url:?} cannot carry a path"),
            ));
        }
        Ok(Self {
            client,
            base,
            decode: DecodeOptions::default(),
        })
    }

    /// Reject unknown fields in response bodies.
    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.decode.strict = strict;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Issue one call.
    pub async fn invoke<Req: Message, Resp: Message>(
        &self,
        route: &ClientRoute,
        ctx: &CallContext,
        request: &Req,
    ) -> Result<Resp, ClientError> {
        let result = self.call(route, ctx, request).await;
        let code = match &result {
            Ok(_) => OutcomeCode::Ok,
            Err(e) => e.code(),
        };
        metrics::record_client_call(route.name(), code);
        if let Err(e) = &result {
            tracing::debug!(method = %route.name(), code = %e.code(), error = %e.message(), "Client call failed");
        }
        result
    }

    async fn call<Req: Message, Resp: Message>(
        &self,
        route: &ClientRoute,
        ctx: &CallContext,
        request: &Req,
    ) -> Result<Resp, ClientError> {
        ctx.check()?;

        let encoded = encode_request(&route.rule, &route.pattern, request)
            .map_err(|e| ClientError::new(OutcomeCode::InvalidArgument, e.to_string()))?;
        let url = self.url_for(&encoded)?;

        let mut builder = self
            .client
            .request(route.rule.verb.as_method(), url)
            .header(ACCEPT, "application/json");
        if let Some(body) = encoded.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }
        if let Some(remaining) = ctx.remaining() {
            builder = builder
                .header(GRPC_TIMEOUT, format_grpc_timeout(remaining))
                .timeout(remaining);
        }
        if let Some(request_id) = ctx.request_id() {
            builder = builder.header(X_REQUEST_ID, request_id);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = ctx.run(exchange).await?.map_err(ClientError::from_transport)?;

        if !status.is_success() {
            return Err(ClientError::from_response(status, &body));
        }
        decode_response(&body, route.rule.response_body.as_deref(), self.decode).map_err(|e| {
            ClientError::new(OutcomeCode::Internal, format!("undecodable response: {e}")).with_http_status(status)
        })
    }

    /// Append the encoded path to the base URL and attach the query.
    fn url_for(&self, encoded: &EncodedRequest) -> Result<Url, ClientError> {
        // `extend` silently skips dot segments, which would reroute the call.
        if let Some(segment) = encoded.segments.iter().find(|s| is_unroutable_segment(s)) {
            return Err(ClientError::new(
                OutcomeCode::InvalidArgument,
                format!("path segment {segment:?} cannot be sent"),
            ));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::new(OutcomeCode::InvalidArgument, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(encoded.segments.iter());
        if !encoded.query.is_empty() {
            url.query_pairs_mut().extend_pairs(encoded.query.iter());
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Cardinality, FieldKind, FieldSchema, MessageSchema};
    use crate::descriptor::HttpVerb;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Lookup {
        key: String,
    }

    impl Message for Lookup {
        fn schema() -> &'static MessageSchema {
            static SCHEMA: MessageSchema = MessageSchema {
                name: "Lookup",
                fields: &[FieldSchema::new("key", FieldKind::String, Cardinality::Singular)],
            };
            &SCHEMA
        }
    }

    fn route() -> ClientRoute {
        ClientRoute::new("Test.Lookup", HttpRule::new(HttpVerb::Get, "/v1/keys/{key}")).unwrap()
    }

    #[test]
    fn test_url_for_encodes_segments_and_query() {
        let client = HttpClient::new("http://localhost:1/api/").unwrap();
        let encoded = EncodedRequest {
            segments: vec!["v1".into(), "files".into(), "a b".into(), "c/d".into()],
            query: vec![("q".into(), "x y".into()), ("n".into(), "1".into())],
            body: None,
        };
        let url = client.url_for(&encoded).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1/api/v1/files/a%20b/c%2Fd?q=x+y&n=1");
    }

    #[test]
    fn test_url_for_rejects_dot_segments() {
        let client = HttpClient::new("http://localhost:1").unwrap();
        for segment in [".", "..", ""] {
            let encoded = EncodedRequest {
                segments: vec!["v1".into(), "users".into(), segment.into(), "delete".into()],
                query: Vec::new(),
                body: None,
            };
            let err = client.url_for(&encoded).unwrap_err();
            assert_eq!(err.code(), OutcomeCode::InvalidArgument, "{segment:?}");
        }
    }

    #[tokio::test]
    async fn test_dot_path_value_fails_before_io() {
        let client = HttpClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .invoke::<Lookup, Lookup>(&route(), &CallContext::new(), &Lookup { key: "..".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), OutcomeCode::InvalidArgument);
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn test_bad_base_url() {
        let err = HttpClient::new("not a url").unwrap_err();
        assert_eq!(err.code(), OutcomeCode::InvalidArgument);
        assert!(HttpClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_bad_route_template() {
        let err = ClientRoute::new("Test.Bad", HttpRule::new(HttpVerb::Get, "v1/{key")).unwrap_err();
        assert_eq!(err.code(), OutcomeCode::Internal);
    }

    #[tokio::test]
    async fn test_expired_context_skips_io() {
        // Nothing listens on port 1; reaching the network would yield UNAVAILABLE.
        let client = HttpClient::new("http://127.0.0.1:1").unwrap();
        let ctx = CallContext::new().with_timeout(Duration::ZERO);
        let err = client
            .invoke::<Lookup, Lookup>(&route(), &ctx, &Lookup { key: "k".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), OutcomeCode::DeadlineExceeded);
        assert_eq!(err.http_status(), None);

        let ctx = CallContext::new();
        ctx.cancel();
        let err = client
            .invoke::<Lookup, Lookup>(&route(), &ctx, &Lookup { key: "k".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), OutcomeCode::Cancelled);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let client = HttpClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .invoke::<Lookup, Lookup>(&route(), &CallContext::new(), &Lookup { key: "k".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), OutcomeCode::Unavailable);
    }

    #[tokio::test]
    async fn test_missing_path_field_is_invalid_argument() {
        let client = HttpClient::new("http://127.0.0.1:1").unwrap();
        let err = client
            .invoke::<Lookup, Lookup>(&route(), &CallContext::new(), &Lookup::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), OutcomeCode::InvalidArgument);
    }
}
