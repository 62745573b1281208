//! Service validation ahead of emission.
//!
//! Every check here is fatal; nothing is emitted for a service that fails.

use std::collections::{BTreeSet, HashSet};

use crate::codegen::naming::{is_plain_identifier, pascal_case, snake_case};
use crate::codegen::{GenerateError, GeneratorOptions, MissingBindingPolicy};
use crate::descriptor::{
    BodySelector, FieldDescriptor, FieldType, HttpRule, MessageDescriptor, MethodDescriptor, ServiceDescriptor,
};
use crate::routing::{RoutePattern, RouteTable};

/// Names taken by the generated client's own constructors and accessors.
const RESERVED_METHODS: &[&str] = &["new", "with_client", "inner"];

const RESERVED_TYPES: &[&str] = &[
    "Arc",
    "BodySelector",
    "CallContext",
    "Cardinality",
    "ClientError",
    "ClientRoute",
    "CompileError",
    "Deserialize",
    "FieldKind",
    "FieldSchema",
    "Future",
    "HttpClient",
    "HttpRule",
    "HttpVerb",
    "Message",
    "MessageSchema",
    "ServeMux",
    "Serialize",
    "Status",
];

/// A validated service with the methods that get an HTTP surface.
#[derive(Debug)]
pub struct Plan<'a> {
    pub service: &'a ServiceDescriptor,
    pub bound: Vec<(&'a MethodDescriptor, &'a HttpRule)>,
}

pub fn validate<'a>(service: &'a ServiceDescriptor, options: &GeneratorOptions) -> Result<Plan<'a>, GenerateError> {
    if !is_plain_identifier(&service.name) {
        return Err(GenerateError::InvalidName {
            kind: "service",
            name: service.name.clone(),
        });
    }
    validate_types(service)?;

    let mut method_names = HashSet::new();
    let mut routes: RouteTable<&str> = RouteTable::new();
    let mut bound = Vec::new();

    for method in &service.methods {
        if !is_plain_identifier(&method.name) {
            return Err(GenerateError::InvalidName {
                kind: "method",
                name: method.name.clone(),
            });
        }
        if RESERVED_METHODS.contains(&snake_case(&method.name).as_str()) {
            return Err(GenerateError::InvalidName {
                kind: "method",
                name: method.name.clone(),
            });
        }
        if !method_names.insert(snake_case(&method.name)) {
            return Err(GenerateError::DuplicateMethod(method.name.clone()));
        }

        let input = request_message(service, method, &method.input_type)?;
        let output = request_message(service, method, &method.output_type)?;

        let Some(rule) = &method.http else {
            match options.missing_binding {
                MissingBindingPolicy::Skip => {
                    tracing::warn!(
                        service = %service.name,
                        method = %method.name,
                        "Method has no HTTP binding, skipping"
                    );
                    continue;
                }
                MissingBindingPolicy::Fail => {
                    return Err(GenerateError::MissingBinding {
                        service: service.name.clone(),
                        method: method.name.clone(),
                    })
                }
            }
        };

        let pattern = RoutePattern::compile(rule.verb, &rule.path).map_err(|source| GenerateError::InvalidTemplate {
            method: method.name.clone(),
            source,
        })?;
        validate_binding(service, method, rule, &pattern, input, output)?;

        routes.insert(pattern, &method.name).map_err(|source| GenerateError::Ambiguous {
            method: method.name.clone(),
            source,
        })?;
        bound.push((method, rule));
    }

    Ok(Plan { service, bound })
}

fn request_message<'a>(
    service: &'a ServiceDescriptor,
    method: &MethodDescriptor,
    name: &str,
) -> Result<&'a MessageDescriptor, GenerateError> {
    service.message(name).ok_or_else(|| GenerateError::UnknownType {
        context: format!("method {}", method.name),
        name: name.to_string(),
    })
}

fn validate_binding(
    service: &ServiceDescriptor,
    method: &MethodDescriptor,
    rule: &HttpRule,
    pattern: &RoutePattern,
    input: &MessageDescriptor,
    output: &MessageDescriptor,
) -> Result<(), GenerateError> {
    let path_error = |field: &str, reason: &str| GenerateError::PathField {
        method: method.name.clone(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    for variable in pattern.variables() {
        let mut message = input;
        let parts: Vec<&str> = variable.split('.').collect();
        for (i, part) in parts.iter().enumerate() {
            let field = message
                .field(part)
                .ok_or_else(|| path_error(variable, "no such field"))?;
            if field.repeated {
                return Err(path_error(variable, "repeated fields cannot be bound from the path"));
            }
            let last = i + 1 == parts.len();
            match (&field.ty, last) {
                (FieldType::Named(name), false) => {
                    message = service
                        .message(name)
                        .ok_or_else(|| path_error(variable, "intermediate field is not a message"))?;
                }
                (_, false) => return Err(path_error(variable, "intermediate field is not a message")),
                (FieldType::Named(name), true) if service.message(name).is_some() => {
                    return Err(path_error(variable, "message fields cannot be bound from the path"))
                }
                (_, true) => {}
            }
        }
    }

    if let BodySelector::Field(name) = &rule.body {
        if input.field(name).is_none() {
            return Err(GenerateError::BodyField {
                method: method.name.clone(),
                field: name.clone(),
            });
        }
        if let Some(variable) = pattern.variables().find(|v| v.split('.').next() == Some(name.as_str())) {
            return Err(GenerateError::PathBodyCollision {
                method: method.name.clone(),
                field: variable.to_string(),
            });
        }
    }

    if let Some(name) = &rule.response_body {
        if output.field(name).is_none() {
            return Err(GenerateError::ResponseField {
                method: method.name.clone(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_types(service: &ServiceDescriptor) -> Result<(), GenerateError> {
    // Generated modules import these alongside the messages.
    let mut type_names: HashSet<String> = RESERVED_TYPES.iter().map(|t| t.to_string()).collect();
    type_names.insert(pascal_case(&service.name));
    type_names.insert(format!("{}HttpClient", pascal_case(&service.name)));
    let declared = service
        .enums
        .iter()
        .map(|e| ("enum", &e.name))
        .chain(service.messages.iter().map(|m| ("message", &m.name)));
    for (kind, name) in declared {
        if !is_plain_identifier(name) {
            return Err(GenerateError::InvalidName {
                kind,
                name: name.clone(),
            });
        }
        if !type_names.insert(pascal_case(name)) {
            return Err(GenerateError::DuplicateType(name.clone()));
        }
    }

    for enumeration in &service.enums {
        if enumeration.values.is_empty() {
            return Err(GenerateError::EmptyEnum(enumeration.name.clone()));
        }
        let mut variants = HashSet::new();
        for value in &enumeration.values {
            if !is_plain_identifier(value) {
                return Err(GenerateError::InvalidName {
                    kind: "enum value",
                    name: format!("{}.{}", enumeration.name, value),
                });
            }
            if !variants.insert(pascal_case(value)) {
                return Err(GenerateError::DuplicateField {
                    message: enumeration.name.clone(),
                    field: value.clone(),
                });
            }
        }
    }

    for message in &service.messages {
        let mut idents = HashSet::new();
        for field in &message.fields {
            if !is_plain_identifier(&field.name) {
                return Err(GenerateError::InvalidName {
                    kind: "field",
                    name: format!("{}.{}", message.name, field.name),
                });
            }
            if !idents.insert(snake_case(&field.name)) {
                return Err(GenerateError::DuplicateField {
                    message: message.name.clone(),
                    field: field.name.clone(),
                });
            }
            if field.repeated && field.optional {
                return Err(GenerateError::InvalidField {
                    message: message.name.clone(),
                    field: field.name.clone(),
                    reason: "a field cannot be both repeated and optional".into(),
                });
            }
            if let FieldType::Named(name) = &field.ty {
                if service.message(name).is_none() && service.enumeration(name).is_none() {
                    return Err(GenerateError::UnknownType {
                        context: format!("field {}.{}", message.name, field.name),
                        name: name.clone(),
                    });
                }
            }
        }
    }

    for message in &service.messages {
        let mut visiting = BTreeSet::new();
        check_recursion(service, message, &mut visiting)?;
    }
    Ok(())
}

/// Singular message fields are stored inline, so they must not form a cycle.
fn check_recursion<'a>(
    service: &'a ServiceDescriptor,
    message: &'a MessageDescriptor,
    visiting: &mut BTreeSet<&'a str>,
) -> Result<(), GenerateError> {
    if !visiting.insert(message.name.as_str()) {
        return Err(GenerateError::RecursiveMessage(message.name.clone()));
    }
    for field in message.fields.iter().filter(|f| !f.repeated) {
        if let Some(nested) = nested_message(service, field) {
            check_recursion(service, nested, visiting)?;
        }
    }
    visiting.remove(message.name.as_str());
    Ok(())
}

fn nested_message<'a>(service: &'a ServiceDescriptor, field: &FieldDescriptor) -> Option<&'a MessageDescriptor> {
    match &field.ty {
        FieldType::Named(name) => service.message(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{parse_json, HttpVerb};

    fn service() -> ServiceDescriptor {
        parse_json(
            r#"{
                "name": "Library",
                "methods": [
                    {"name": "GetBook", "input_type": "GetBookRequest", "output_type": "Book",
                     "http": {"verb": "GET", "path": "/v1/shelves/{shelf}/books/{book.id}"}},
                    {"name": "Restock", "input_type": "GetBookRequest", "output_type": "Book"}
                ],
                "messages": [
                    {"name": "GetBookRequest", "fields": [
                        {"name": "shelf", "type": "string"},
                        {"name": "book", "type": "Book"},
                        {"name": "tags", "type": "string", "repeated": true}
                    ]},
                    {"name": "Book", "fields": [
                        {"name": "id", "type": "int64"},
                        {"name": "genre", "type": "Genre"}
                    ]}
                ],
                "enums": [{"name": "Genre", "values": ["GENRE_UNSPECIFIED", "POETRY"]}]
            }"#,
        )
        .unwrap()
        .remove(0)
    }

    fn bind(service: &mut ServiceDescriptor, method: usize, rule: HttpRule) {
        service.methods[method].http = Some(rule);
    }

    #[test]
    fn test_valid_service_skips_unbound() {
        let service = service();
        let plan = validate(&service, &GeneratorOptions::default()).unwrap();
        assert_eq!(plan.bound.len(), 1);
        assert_eq!(plan.bound[0].0.name, "GetBook");
    }

    #[test]
    fn test_missing_binding_can_fail() {
        let service = service();
        let options = GeneratorOptions {
            missing_binding: MissingBindingPolicy::Fail,
            ..Default::default()
        };
        assert!(matches!(
            validate(&service, &options),
            Err(GenerateError::MissingBinding { method, .. }) if method == "Restock"
        ));
    }

    #[test]
    fn test_path_variable_checks() {
        let mut svc = service();
        bind(&mut svc, 1, HttpRule::new(HttpVerb::Post, "/v1/{tags}"));
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::PathField { .. })));

        let mut svc = service();
        bind(&mut svc, 1, HttpRule::new(HttpVerb::Post, "/v1/{book}"));
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::PathField { .. })));

        let mut svc = service();
        bind(&mut svc, 1, HttpRule::new(HttpVerb::Post, "/v1/{missing}"));
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::PathField { .. })));

        let mut svc = service();
        bind(&mut svc, 1, HttpRule::new(HttpVerb::Post, "/v1/{book.genre}"));
        assert!(validate(&svc, &GeneratorOptions::default()).is_ok());
    }

    #[test]
    fn test_body_checks() {
        let mut svc = service();
        bind(
            &mut svc,
            1,
            HttpRule::new(HttpVerb::Post, "/v1/restock").with_body(BodySelector::Field("nope".into())),
        );
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::BodyField { .. })));

        let mut svc = service();
        bind(
            &mut svc,
            1,
            HttpRule::new(HttpVerb::Post, "/v1/restock/{book.id}").with_body(BodySelector::Field("book".into())),
        );
        assert!(matches!(
            validate(&svc, &GeneratorOptions::default()),
            Err(GenerateError::PathBodyCollision { .. })
        ));

        let mut svc = service();
        bind(
            &mut svc,
            1,
            HttpRule::new(HttpVerb::Post, "/v1/restock").with_response_body("missing"),
        );
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::ResponseField { .. })));
    }

    #[test]
    fn test_ambiguous_methods() {
        let mut svc = service();
        bind(&mut svc, 1, HttpRule::new(HttpVerb::Get, "/v1/shelves/{shelf}/books/{book.genre}"));
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::Ambiguous { .. })));
    }

    #[test]
    fn test_type_checks() {
        let mut svc = service();
        svc.messages[1].fields.push(FieldDescriptor {
            name: "sequel".into(),
            ty: FieldType::Named("Book".into()),
            repeated: false,
            optional: true,
        });
        assert!(matches!(
            validate(&svc, &GeneratorOptions::default()),
            Err(GenerateError::RecursiveMessage(_))
        ));

        svc.messages[1].fields.last_mut().unwrap().repeated = true;
        svc.messages[1].fields.last_mut().unwrap().optional = false;
        assert!(validate(&svc, &GeneratorOptions::default()).is_ok());

        let mut svc = service();
        svc.methods[0].output_type = "Missing".into();
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::UnknownType { .. })));

        let mut svc = service();
        svc.methods[1].name = "get_book".into();
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::DuplicateMethod(_))));
    }

    #[test]
    fn test_generated_names_are_reserved() {
        let mut svc = service();
        svc.methods[1].name = "Inner".into();
        assert!(matches!(
            validate(&svc, &GeneratorOptions::default()),
            Err(GenerateError::InvalidName { kind: "method", .. })
        ));

        let mut svc = service();
        svc.messages[1].name = "LibraryHttpClient".into();
        svc.methods[0].output_type = "LibraryHttpClient".into();
        svc.methods[1].output_type = "LibraryHttpClient".into();
        assert!(matches!(validate(&svc, &GeneratorOptions::default()), Err(GenerateError::DuplicateType(_))));
    }
}
