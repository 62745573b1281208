//! HTTP/JSON bridge for RPC services.
//!
//! # Architecture Overview
//!
//! ```text
//!   IR (JSON/TOML)                       ┌──────────────────────────────────┐
//!   ──────────────▶ descriptor ────────▶ │ codegen: validate → emit → write │
//!                                        └────────────────┬─────────────────┘
//!                                                         │ generated module
//!                              ┌──────────────────────────┴──────────────┐
//!                              ▼                                         ▼
//!   HTTP request ──▶ http::server ──▶ http::dispatcher          client::HttpClient
//!                    (request id,     (routing → codec →         (codec → reqwest
//!                     trace span)      service → status)          → codec/status)
//!
//!   Cross-cutting: config, context (deadline + cancellation),
//!                  observability, lifecycle
//! ```
//!
//! Generated code names this crate as `::rpc_http_bridge`, including the
//! checked-in [`greeting_service`] module compiled here.

extern crate self as rpc_http_bridge;

pub mod client;
pub mod codec;
pub mod codegen;
pub mod config;
pub mod context;
pub mod demo;
pub mod descriptor;
pub mod greeting_service;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod status;

pub use client::{ClientError, HttpClient};
pub use config::BridgeConfig;
pub use context::CallContext;
pub use http::{Dispatcher, HttpServer, ServeMux};
pub use lifecycle::Shutdown;
pub use status::{OutcomeCode, Status};
