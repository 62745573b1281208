//! Service trait and route registration for `GreetingService`.
//!
//! Generated by rpc-http-gen. Do not edit.

use std::future::Future;
use std::sync::Arc;

use ::rpc_http_bridge::context::CallContext;
use ::rpc_http_bridge::http::ServeMux;
use ::rpc_http_bridge::routing::CompileError;
use ::rpc_http_bridge::status::Status;

use super::messages::{GreetRequest, SayHelloRequest, SayHelloResponse};

/// Server side of `GreetingService`.
///
/// Methods left unimplemented answer `UNIMPLEMENTED`.
pub trait GreetingService: Send + Sync + 'static {
    fn say_hello(
        &self,
        ctx: CallContext,
        request: SayHelloRequest,
    ) -> impl Future<Output = Result<SayHelloResponse, Status>> + Send {
        let _ = (ctx, request);
        async { Err(Status::unimplemented("GreetingService.SayHello is not implemented")) }
    }

    fn greet_by_name(
        &self,
        ctx: CallContext,
        request: GreetRequest,
    ) -> impl Future<Output = Result<SayHelloResponse, Status>> + Send {
        let _ = (ctx, request);
        async { Err(Status::unimplemented("GreetingService.GreetByName is not implemented")) }
    }

    fn farewell(
        &self,
        ctx: CallContext,
        request: GreetRequest,
    ) -> impl Future<Output = Result<SayHelloResponse, Status>> + Send {
        let _ = (ctx, request);
        async { Err(Status::unimplemented("GreetingService.Farewell is not implemented")) }
    }
}

/// Register every bound `GreetingService` method on `mux`.
pub fn register_greeting_service_handler_server<S: GreetingService>(
    mux: &mut ServeMux,
    service: Arc<S>,
) -> Result<(), CompileError> {
    let svc = Arc::clone(&service);
    mux.handle(
        "GreetingService",
        "SayHello",
        super::say_hello_rule(),
        move |ctx: CallContext, request: SayHelloRequest| {
            let svc = Arc::clone(&svc);
            async move { svc.say_hello(ctx, request).await }
        },
    )?;
    let svc = Arc::clone(&service);
    mux.handle(
        "GreetingService",
        "GreetByName",
        super::greet_by_name_rule(),
        move |ctx: CallContext, request: GreetRequest| {
            let svc = Arc::clone(&svc);
            async move { svc.greet_by_name(ctx, request).await }
        },
    )?;
    Ok(())
}
