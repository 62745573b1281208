//! IR loading from disk.
//!
//! The format is picked from the file extension: `.toml` is TOML, anything else JSON.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::descriptor::types::ServiceDescriptor;

/// Errors raised while reading an IR document.
#[derive(Debug, Error)]
pub enum IrError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON IR in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML IR in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// An IR file may hold one service or a list of services.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum IrDocument {
    Many { services: Vec<ServiceDescriptor> },
    One(ServiceDescriptor),
}

impl IrDocument {
    fn into_services(self) -> Vec<ServiceDescriptor> {
        match self {
            IrDocument::Many { services } => services,
            IrDocument::One(service) => vec![service],
        }
    }
}

/// Load every service declared in an IR file.
pub fn load_ir(path: &Path) -> Result<Vec<ServiceDescriptor>, IrError> {
    let content = fs::read_to_string(path).map_err(|source| IrError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        parse_toml(&content).map_err(|source| IrError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        parse_json(&content).map_err(|source| IrError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parse services from a JSON string.
pub fn parse_json(content: &str) -> Result<Vec<ServiceDescriptor>, serde_json::Error> {
    serde_json::from_str::<IrDocument>(content).map(IrDocument::into_services)
}

/// Parse services from a TOML string.
pub fn parse_toml(content: &str) -> Result<Vec<ServiceDescriptor>, toml::de::Error> {
    toml::from_str::<IrDocument>(content).map(IrDocument::into_services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{BodySelector, HttpVerb};

    const GREETING_JSON: &str = r#"{
        "name": "GreetingService",
        "methods": [
            {
                "name": "SayHello",
                "input_type": "SayHelloRequest",
                "output_type": "SayHelloResponse",
                "http": { "verb": "POST", "path": "/v1/greet", "body": "*" }
            }
        ],
        "messages": [
            { "name": "SayHelloRequest", "fields": [{ "name": "ping", "type": "string" }] },
            { "name": "SayHelloResponse", "fields": [{ "name": "pong", "type": "string" }] }
        ]
    }"#;

    #[test]
    fn test_parse_single_service_json() {
        let services = parse_json(GREETING_JSON).unwrap();
        assert_eq!(services.len(), 1);
        let method = &services[0].methods[0];
        let rule = method.http.as_ref().unwrap();
        assert_eq!(rule.verb, HttpVerb::Post);
        assert_eq!(rule.body, BodySelector::Whole);
        assert!(services[0].message("SayHelloRequest").is_some());
    }

    #[test]
    fn test_parse_service_list_toml() {
        let doc = r#"
            [[services]]
            name = "Library"

            [[services.methods]]
            name = "GetBook"
            input_type = "GetBookRequest"
            output_type = "Book"
            http = { verb = "GET", path = "/v1/books/{id}" }
        "#;
        let services = parse_toml(doc).unwrap();
        assert_eq!(services[0].name, "Library");
        assert_eq!(services[0].methods[0].http.as_ref().unwrap().body, BodySelector::None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_ir(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, IrError::Io { .. }));
    }
}
