//! Emission of the typed client wrapper.

use std::collections::BTreeSet;

use crate::codegen::naming::{pascal_case, quoted, snake_case};
use crate::codegen::validate::Plan;
use crate::codegen::writer::CodeWriter;
use crate::codegen::GeneratorOptions;

pub(super) fn emit(plan: &Plan<'_>, options: &GeneratorOptions) -> String {
    let service = plan.service;
    let client_type = format!("{}HttpClient", pascal_case(&service.name));
    let mut w = CodeWriter::new();
    w.module_doc(&format!(
        "HTTP client for `{}`.\n\nGenerated by rpc-http-gen. Do not edit.",
        service.name
    ));
    w.blank();

    if plan.bound.is_empty() {
        w.line("use ::rpc_http_bridge::client::{ClientError, HttpClient};");
    } else {
        w.line("use ::rpc_http_bridge::client::{ClientError, ClientRoute, HttpClient};");
        w.line("use ::rpc_http_bridge::context::CallContext;");
        let types: BTreeSet<String> = plan
            .bound
            .iter()
            .flat_map(|(m, _)| [pascal_case(&m.input_type), pascal_case(&m.output_type)])
            .collect();
        w.blank();
        w.line(format!(
            "use super::messages::{{{}}};",
            types.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    w.blank();
    w.doc(&format!("Calls `{}` over HTTP/JSON.", service.name));
    w.line("#[derive(Debug, Clone)]");
    w.block(format!("pub struct {client_type}"), |w| {
        w.line("inner: HttpClient,");
        for (method, _) in &plan.bound {
            w.line(format!("{}_route: ClientRoute,", snake_case(&method.name)));
        }
    });

    w.blank();
    w.block(format!("impl {client_type}"), |w| {
        w.block("pub fn new(base_url: &str) -> Result<Self, ClientError>", |w| {
            w.line("Self::with_client(HttpClient::new(base_url)?)");
        });
        w.blank();
        w.doc("Wrap an existing transport, sharing its connection pool.");
        w.block("pub fn with_client(inner: HttpClient) -> Result<Self, ClientError>", |w| {
            w.block_with("Ok(Self", "})", |w| {
                if options.strict_decoding {
                    w.line("inner: inner.with_strict_decoding(true),");
                } else {
                    w.line("inner,");
                }
                for (method, _) in &plan.bound {
                    let name = format!("{}.{}", service.name, method.name);
                    w.line(format!(
                        "{0}_route: ClientRoute::new({1}, super::{0}_rule())?,",
                        snake_case(&method.name),
                        quoted(&name)
                    ));
                }
            });
        });
        w.blank();
        w.block("pub fn inner(&self) -> &HttpClient", |w| {
            w.line("&self.inner");
        });

        for (method, rule) in &plan.bound {
            let ident = snake_case(&method.name);
            w.blank();
            w.doc(&format!("`{} {}`", rule.verb, rule.path));
            w.line(format!("pub async fn {ident}("));
            w.indented(|w| {
                w.line("&self,");
                w.line("ctx: &CallContext,");
                w.line(format!("request: &{},", pascal_case(&method.input_type)));
            });
            w.block(
                format!(") -> Result<{}, ClientError>", pascal_case(&method.output_type)),
                |w| {
                    w.line(format!("self.inner.invoke(&self.{ident}_route, ctx, request).await"));
                },
            );
        }
    });
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::validate;
    use crate::descriptor::parse_json;

    fn service() -> crate::descriptor::ServiceDescriptor {
        parse_json(
            r#"{
                "name": "Echo",
                "methods": [
                    {"name": "Say", "input_type": "Msg", "output_type": "Msg",
                     "http": {"verb": "POST", "path": "/v1/say", "body": "*"}},
                    {"name": "Whisper", "input_type": "Msg", "output_type": "Msg"}
                ],
                "messages": [{"name": "Msg", "fields": [{"name": "text", "type": "string"}]}]
            }"#,
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn test_only_bound_methods_get_client_calls() {
        let service = service();
        let plan = validate(&service, &GeneratorOptions::default()).unwrap();
        let out = emit(&plan, &GeneratorOptions::default());

        assert!(out.contains("use super::messages::{Msg};"));
        assert!(out.contains("    say_route: ClientRoute,\n"));
        assert!(out.contains("say_route: ClientRoute::new(\"Echo.Say\", super::say_rule())?,"));
        assert!(out.contains("    pub async fn say(\n        &self,\n        ctx: &CallContext,\n        request: &Msg,\n    ) -> Result<Msg, ClientError> {\n"));
        assert!(!out.contains("whisper"));
        assert!(out.contains("            inner,\n"));
    }

    #[test]
    fn test_strict_decoding_option() {
        let service = service();
        let options = GeneratorOptions {
            strict_decoding: true,
            ..Default::default()
        };
        let plan = validate(&service, &options).unwrap();
        assert!(emit(&plan, &options).contains("inner: inner.with_strict_decoding(true),"));
    }
}
