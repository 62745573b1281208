//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request ID, trace span)
//!     → dispatcher.rs (route match → decode → invoke → encode)
//!     → response.rs (buffered JSON body, mapped status)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{DispatchOptions, Dispatcher, ServeMux, Stage};
pub use request::{format_grpc_timeout, parse_grpc_timeout, MakeRequestUuid, GRPC_TIMEOUT, X_REQUEST_ID};
pub use server::HttpServer;
