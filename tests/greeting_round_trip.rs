//! End-to-end tests: generated client ⇄ HTTP ⇄ dispatcher ⇄ demo service.

use std::time::Duration;

use serde_json::Value;

use rpc_http_bridge::config::ServerConfig;
use rpc_http_bridge::context::CallContext;
use rpc_http_bridge::greeting_service::{GreetRequest, SayHelloRequest};
use rpc_http_bridge::status::OutcomeCode;

mod common;

#[tokio::test]
async fn test_get_with_path_and_query() {
    let (addr, shutdown) = common::start_greeting_server(ServerConfig::default()).await;
    let http = common::plain_client();

    let res = http.get(format!("http://{addr}/v1/greet/Ada")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), r#"{"pong":"Hello Ada"}"#);

    let res = http
        .get(format!("http://{addr}/v1/greet/Ada%20Lovelace?title=Countess"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), r#"{"pong":"Hello Countess Ada Lovelace"}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_post_whole_body() {
    let (addr, shutdown) = common::start_greeting_server(ServerConfig::default()).await;
    let res = common::plain_client()
        .post(format!("http://{addr}/v1/greeting/hello"))
        .header("content-type", "application/json")
        .header("x-request-id", "trace-me")
        .body(r#"{"ping":"world"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-request-id"], "trace-me");
    assert_eq!(res.text().await.unwrap(), r#"{"pong":"Hello world"}"#);
    shutdown.trigger();
}

#[tokio::test]
async fn test_error_bodies() {
    let (addr, shutdown) = common::start_greeting_server(ServerConfig::default()).await;
    let http = common::plain_client();

    let res = http.get(format!("http://{addr}/v1/nothing/here")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");

    // Bound path, wrong verb.
    let res = http.delete(format!("http://{addr}/v1/greet/Ada")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let res = http.get(format!("http://{addr}/v1/greet/Mallory")).send().await.unwrap();
    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "PERMISSION_DENIED");
    assert_eq!(body["message"], "Mallory may not be greeted");

    let res = http
        .post(format!("http://{addr}/v1/greeting/hello"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    let res = http
        .get(format!("http://{addr}/v1/greet/Ada?title=a&title=b"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    shutdown.trigger();
}

#[tokio::test]
async fn test_generated_client_round_trip() {
    let (addr, shutdown) = common::start_greeting_server(ServerConfig::default()).await;
    let client = common::greeting_client(addr);
    let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

    let reply = client
        .say_hello(&ctx, &SayHelloRequest { ping: "from rust".into() })
        .await
        .unwrap();
    assert_eq!(reply.pong, "Hello from rust");

    let reply = client
        .greet_by_name(
            &ctx,
            &GreetRequest {
                name: "Grace/Hopper".into(),
                title: Some("Rear Admiral".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(reply.pong, "Hello Rear Admiral Grace/Hopper");

    let err = client
        .greet_by_name(
            &ctx,
            &GreetRequest {
                name: "Mallory".into(),
                title: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), OutcomeCode::PermissionDenied);
    assert_eq!(err.http_status().map(|s| s.as_u16()), Some(403));

    shutdown.trigger();
}

#[tokio::test]
async fn test_client_deadlines() {
    let backend = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, r#"{"pong":"late"}"#.to_string())
    })
    .await;
    let client = common::greeting_client(backend);

    let ctx = CallContext::new().with_timeout(Duration::from_millis(100));
    let err = client
        .say_hello(&ctx, &SayHelloRequest { ping: "slow".into() })
        .await
        .unwrap_err();
    assert_eq!(err.code(), OutcomeCode::DeadlineExceeded);

    let ctx = CallContext::new();
    ctx.cancel();
    let err = client
        .say_hello(&ctx, &SayHelloRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), OutcomeCode::Cancelled);
}

#[tokio::test]
async fn test_client_maps_foreign_errors() {
    let unavailable = common::start_programmable_backend(|| async { (503, "overloaded".to_string()) }).await;
    let err = common::greeting_client(unavailable)
        .say_hello(&CallContext::new(), &SayHelloRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), OutcomeCode::Unavailable);
    assert_eq!(err.message(), "overloaded");

    let garbled = common::start_programmable_backend(|| async { (200, "not json".to_string()) }).await;
    let err = common::greeting_client(garbled)
        .say_hello(&CallContext::new(), &SayHelloRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), OutcomeCode::Internal);
}

#[tokio::test]
async fn test_dot_segment_names_are_refused_by_the_client() {
    let (addr, shutdown) = common::start_greeting_server(ServerConfig::default()).await;
    let client = common::greeting_client(addr);
    let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

    for name in [".", ".."] {
        let err = client
            .greet_by_name(
                &ctx,
                &GreetRequest {
                    name: name.into(),
                    title: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), OutcomeCode::InvalidArgument, "{name:?}");
        assert_eq!(err.http_status(), None, "{name:?}");
    }

    // Dots inside a segment are ordinary characters.
    let reply = client
        .greet_by_name(
            &ctx,
            &GreetRequest {
                name: "..Ada..".into(),
                title: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(reply.pong, "Hello ..Ada..");

    shutdown.trigger();
}
