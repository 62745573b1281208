//! HTTP bindings for `GreetingService` (package `greeting.v1`).
//!
//! Generated by rpc-http-gen. Do not edit.

pub mod client;
pub mod messages;
pub mod server;

use ::rpc_http_bridge::descriptor::{BodySelector, HttpRule, HttpVerb};

pub use self::client::GreetingServiceHttpClient;
pub use self::messages::{GreetRequest, SayHelloRequest, SayHelloResponse};
pub use self::server::{register_greeting_service_handler_server, GreetingService};

/// `POST /v1/greeting/hello`
pub fn say_hello_rule() -> HttpRule {
    HttpRule::new(HttpVerb::Post, "/v1/greeting/hello").with_body(BodySelector::Whole)
}

/// `GET /v1/greet/{name}`
pub fn greet_by_name_rule() -> HttpRule {
    HttpRule::new(HttpVerb::Get, "/v1/greet/{name}")
}
