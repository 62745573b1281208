//! Emission of message structs, enums and their `Message` impls.

use crate::codegen::naming::{pascal_case, quoted, rust_ident, serde_name, snake_case};
use crate::codegen::validate::Plan;
use crate::codegen::writer::CodeWriter;
use crate::descriptor::{EnumDescriptor, FieldDescriptor, FieldType, MessageDescriptor, ServiceDescriptor};

const INT64: &str = "::rpc_http_bridge::codec::int64";

pub(super) fn emit(plan: &Plan<'_>) -> String {
    let service = plan.service;
    let mut w = CodeWriter::new();
    w.module_doc(&format!(
        "Messages for `{}`.\n\nGenerated by rpc-http-gen. Do not edit.",
        service.name
    ));
    w.blank();

    let has_fields = service.messages.iter().any(|m| !m.fields.is_empty());
    if !service.messages.is_empty() {
        if has_fields {
            w.line("use ::rpc_http_bridge::codec::{Cardinality, FieldKind, FieldSchema, Message, MessageSchema};");
        } else {
            w.line("use ::rpc_http_bridge::codec::{Message, MessageSchema};");
        }
    }
    if !service.messages.is_empty() || !service.enums.is_empty() {
        w.line("use serde::{Deserialize, Serialize};");
    }

    for enumeration in &service.enums {
        w.blank();
        emit_enum(&mut w, enumeration);
    }
    for message in &service.messages {
        w.blank();
        emit_struct(&mut w, service, message);
        w.blank();
        emit_schema(&mut w, service, message);
    }
    w.finish()
}

fn emit_enum(w: &mut CodeWriter, enumeration: &EnumDescriptor) {
    let name = pascal_case(&enumeration.name);
    w.line("#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]");
    w.block(format!("pub enum {name}"), |w| {
        for (i, value) in enumeration.values.iter().enumerate() {
            if i == 0 {
                w.line("#[default]");
            }
            w.line(format!("#[serde(rename = {})]", quoted(value)));
            w.line(format!("{},", pascal_case(value)));
        }
    });
    w.blank();
    let values: Vec<String> = enumeration.values.iter().map(|v| quoted(v)).collect();
    w.block(format!("impl {name}"), |w| {
        w.line(format!(
            "pub const VALUES: &'static [&'static str] = &[{}];",
            values.join(", ")
        ));
    });
}

fn emit_struct(w: &mut CodeWriter, service: &ServiceDescriptor, message: &MessageDescriptor) {
    w.line("#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]");
    w.line("#[serde(default)]");
    w.block(format!("pub struct {}", pascal_case(&message.name)), |w| {
        for field in &message.fields {
            let ident = rust_ident(&snake_case(&field.name));
            if serde_name(&ident) != field.name {
                w.line(format!("#[serde(rename = {})]", quoted(&field.name)));
            }
            if field.ty.is_64_bit() {
                let with = if field.repeated {
                    format!("{INT64}::repeated")
                } else if field.optional {
                    format!("{INT64}::optional")
                } else {
                    INT64.to_string()
                };
                w.line(format!("#[serde(with = {})]", quoted(&with)));
            }
            w.line(format!("pub {ident}: {},", rust_type(service, field)));
        }
    });
}

fn emit_schema(w: &mut CodeWriter, service: &ServiceDescriptor, message: &MessageDescriptor) {
    let name = pascal_case(&message.name);
    w.block(format!("impl Message for {name}"), |w| {
        w.block("fn schema() -> &'static MessageSchema", |w| {
            w.block_with("static SCHEMA: MessageSchema = MessageSchema", "};", |w| {
                w.line(format!("name: {},", quoted(&message.name)));
                match message.fields.as_slice() {
                    [] => w.line("fields: &[],"),
                    [field] => w.line(format!("fields: &[{}],", field_schema(service, field))),
                    fields => {
                        w.line("fields: &[");
                        w.indented(|w| {
                            for field in fields {
                                w.line(format!("{},", field_schema(service, field)));
                            }
                        });
                        w.line("],");
                    }
                }
            });
            w.line("&SCHEMA");
        });
    });
}

fn field_schema(service: &ServiceDescriptor, field: &FieldDescriptor) -> String {
    let cardinality = if field.repeated {
        "Repeated"
    } else if field.optional {
        "Optional"
    } else {
        "Singular"
    };
    format!(
        "FieldSchema::new({}, {}, Cardinality::{cardinality})",
        quoted(&field.name),
        field_kind(service, &field.ty)
    )
}

fn field_kind(service: &ServiceDescriptor, ty: &FieldType) -> String {
    match ty {
        FieldType::Bool => "FieldKind::Bool".into(),
        FieldType::Int32 => "FieldKind::Int32".into(),
        FieldType::Int64 => "FieldKind::Int64".into(),
        FieldType::Uint32 => "FieldKind::Uint32".into(),
        FieldType::Uint64 => "FieldKind::Uint64".into(),
        FieldType::Float => "FieldKind::Float".into(),
        FieldType::Double => "FieldKind::Double".into(),
        FieldType::String => "FieldKind::String".into(),
        FieldType::Named(name) if service.enumeration(name).is_some() => {
            format!("FieldKind::Enum({}::VALUES)", pascal_case(name))
        }
        FieldType::Named(name) => format!("FieldKind::Message(<{} as Message>::schema)", pascal_case(name)),
    }
}

fn rust_type(service: &ServiceDescriptor, field: &FieldDescriptor) -> String {
    let base = match &field.ty {
        FieldType::Bool => "bool".to_string(),
        FieldType::Int32 => "i32".to_string(),
        FieldType::Int64 => "i64".to_string(),
        FieldType::Uint32 => "u32".to_string(),
        FieldType::Uint64 => "u64".to_string(),
        FieldType::Float => "f32".to_string(),
        FieldType::Double => "f64".to_string(),
        FieldType::String => "String".to_string(),
        FieldType::Named(name) => {
            debug_assert!(service.message(name).is_some() || service.enumeration(name).is_some());
            pascal_case(name)
        }
    };
    if field.repeated {
        format!("Vec<{base}>")
    } else if field.optional {
        format!("Option<{base}>")
    } else {
        base
    }
}
