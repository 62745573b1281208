//! Emission of the service trait and its route registration function.

use std::collections::BTreeSet;

use crate::codegen::naming::{pascal_case, quoted, snake_case};
use crate::codegen::validate::Plan;
use crate::codegen::writer::CodeWriter;

pub(super) fn emit(plan: &Plan<'_>) -> String {
    let service = plan.service;
    let trait_name = pascal_case(&service.name);
    let has_methods = !service.methods.is_empty();
    let mut w = CodeWriter::new();
    w.module_doc(&format!(
        "Service trait and route registration for `{}`.\n\nGenerated by rpc-http-gen. Do not edit.",
        service.name
    ));
    w.blank();

    if has_methods {
        w.line("use std::future::Future;");
    }
    w.line("use std::sync::Arc;");
    w.blank();
    if has_methods {
        w.line("use ::rpc_http_bridge::context::CallContext;");
    }
    w.line("use ::rpc_http_bridge::http::ServeMux;");
    w.line("use ::rpc_http_bridge::routing::CompileError;");
    if has_methods {
        w.line("use ::rpc_http_bridge::status::Status;");
        let types: BTreeSet<String> = service
            .methods
            .iter()
            .flat_map(|m| [pascal_case(&m.input_type), pascal_case(&m.output_type)])
            .collect();
        w.blank();
        w.line(format!(
            "use super::messages::{{{}}};",
            types.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    w.blank();
    w.doc(&format!(
        "Server side of `{}`.\n\nMethods left unimplemented answer `UNIMPLEMENTED`.",
        service.name
    ));
    w.block(format!("pub trait {trait_name}: Send + Sync + 'static"), |w| {
        for (i, method) in service.methods.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            let full_name = format!("{}.{}", service.name, method.name);
            w.line(format!("fn {}(", snake_case(&method.name)));
            w.indented(|w| {
                w.line("&self,");
                w.line("ctx: CallContext,");
                w.line(format!("request: {},", pascal_case(&method.input_type)));
            });
            w.block(
                format!(
                    ") -> impl Future<Output = Result<{}, Status>> + Send",
                    pascal_case(&method.output_type)
                ),
                |w| {
                    w.line("let _ = (ctx, request);");
                    w.line(format!(
                        "async {{ Err(Status::unimplemented({})) }}",
                        quoted(&format!("{full_name} is not implemented"))
                    ));
                },
            );
        }
    });

    w.blank();
    w.doc(&format!("Register every bound `{}` method on `mux`.", service.name));
    w.line(format!(
        "pub fn register_{}_handler_server<S: {trait_name}>(",
        snake_case(&service.name)
    ));
    w.indented(|w| {
        w.line("mux: &mut ServeMux,");
        w.line("service: Arc<S>,");
    });
    w.block(") -> Result<(), CompileError>", |w| {
        if plan.bound.is_empty() {
            w.line("let _ = (mux, service);");
        }
        for (method, _) in &plan.bound {
            let ident = snake_case(&method.name);
            w.line("let svc = Arc::clone(&service);");
            w.line("mux.handle(");
            w.indented(|w| {
                w.line(format!("{},", quoted(&service.name)));
                w.line(format!("{},", quoted(&method.name)));
                w.line(format!("super::{ident}_rule(),"));
                w.block_with(
                    format!(
                        "move |ctx: CallContext, request: {}|",
                        pascal_case(&method.input_type)
                    ),
                    "},",
                    |w| {
                        w.line("let svc = Arc::clone(&svc);");
                        w.line(format!("async move {{ svc.{ident}(ctx, request).await }}"));
                    },
                );
            });
            w.line(")?;");
        }
        w.line("Ok(())");
    });
    w.finish()
}
