//! Demo `GreetingService` implementation served by the `rpc-http-bridge` binary.

use std::sync::Arc;

use crate::context::CallContext;
use crate::greeting_service::{
    register_greeting_service_handler_server, GreetRequest, GreetingService, SayHelloRequest, SayHelloResponse,
};
use crate::http::{DispatchOptions, ServeMux};
use crate::routing::CompileError;
use crate::status::Status;

/// Name the demo refuses to greet, to show an error mapping end to end.
pub const BLOCKED_NAME: &str = "Mallory";

#[derive(Debug, Default, Clone, Copy)]
pub struct Greeter;

impl GreetingService for Greeter {
    async fn say_hello(&self, ctx: CallContext, request: SayHelloRequest) -> Result<SayHelloResponse, Status> {
        tracing::info!(
            ping = %request.ping,
            request_id = ctx.request_id().unwrap_or("-"),
            "SayHello"
        );
        Ok(SayHelloResponse {
            pong: format!("Hello {}", request.ping),
        })
    }

    async fn greet_by_name(&self, _ctx: CallContext, request: GreetRequest) -> Result<SayHelloResponse, Status> {
        if request.name.eq_ignore_ascii_case(BLOCKED_NAME) {
            return Err(Status::permission_denied(format!("{} may not be greeted", request.name)));
        }
        let pong = match request.title {
            Some(title) => format!("Hello {title} {}", request.name),
            None => format!("Hello {}", request.name),
        };
        Ok(SayHelloResponse { pong })
    }
}

/// A mux with the demo service registered.
pub fn greeting_mux(options: DispatchOptions) -> Result<ServeMux, CompileError> {
    let mut mux = ServeMux::with_options(options);
    register_greeting_service_handler_server(&mut mux, Arc::new(Greeter))?;
    Ok(mux)
}
