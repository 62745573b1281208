//! Emission of the service's `mod.rs`: submodules, re-exports and one
//! `HttpRule` constructor per bound method.

use crate::codegen::naming::{pascal_case, quoted, snake_case};
use crate::codegen::validate::Plan;
use crate::codegen::writer::CodeWriter;
use crate::descriptor::{BodySelector, HttpRule};

pub(super) fn emit(plan: &Plan<'_>) -> String {
    let service = plan.service;
    let mut w = CodeWriter::new();
    let header = match &service.package {
        Some(package) => format!("HTTP bindings for `{}` (package `{package}`).", service.name),
        None => format!("HTTP bindings for `{}`.", service.name),
    };
    w.module_doc(&format!("{header}\n\nGenerated by rpc-http-gen. Do not edit."));
    w.blank();
    w.line("pub mod client;");
    w.line("pub mod messages;");
    w.line("pub mod server;");

    if !plan.bound.is_empty() {
        let needs_selector = plan.bound.iter().any(|(_, rule)| rule.body.has_body());
        w.blank();
        if needs_selector {
            w.line("use ::rpc_http_bridge::descriptor::{BodySelector, HttpRule, HttpVerb};");
        } else {
            w.line("use ::rpc_http_bridge::descriptor::{HttpRule, HttpVerb};");
        }
    }

    let service_type = pascal_case(&service.name);
    w.blank();
    w.line(format!("pub use self::client::{service_type}HttpClient;"));
    let types: Vec<String> = service
        .enums
        .iter()
        .map(|e| pascal_case(&e.name))
        .chain(service.messages.iter().map(|m| pascal_case(&m.name)))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    if !types.is_empty() {
        w.line(format!("pub use self::messages::{{{}}};", types.join(", ")));
    }
    w.line(format!(
        "pub use self::server::{{register_{}_handler_server, {service_type}}};",
        snake_case(&service.name)
    ));

    for (method, rule) in &plan.bound {
        w.blank();
        w.doc(&format!("`{} {}`", rule.verb, rule.path));
        w.block(format!("pub fn {}_rule() -> HttpRule", snake_case(&method.name)), |w| {
            w.line(rule_expression(rule));
        });
    }
    w.finish()
}

fn rule_expression(rule: &HttpRule) -> String {
    let mut expr = format!("HttpRule::new(HttpVerb::{}, {})", rule.verb.variant_name(), quoted(&rule.path));
    match &rule.body {
        BodySelector::None => {}
        BodySelector::Whole => expr.push_str(".with_body(BodySelector::Whole)"),
        BodySelector::Field(field) => {
            expr.push_str(&format!(".with_body(BodySelector::Field({}.to_string()))", quoted(field)));
        }
    }
    if let Some(field) = &rule.response_body {
        expr.push_str(&format!(".with_response_body({})", quoted(field)));
    }
    expr
}
