//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Compile a path template (`/v1/shelves/{shelf}/books/{book.id}`) into segments
//! - Reject malformed templates at build time
//! - Match a request path and bind variables to their decoded values
//!
//! # Design Decisions
//! - Literal segments compare exactly against the raw (still encoded) path segment
//! - Variable values are percent-decoded after a match
//! - A greedy variable (`{name=**}`) is only legal as the last segment
//!   and consumes one or more remaining segments
//! - No regex: matching is a single pass over the segments

use percent_encoding::percent_decode_str;
use std::fmt;
use thiserror::Error;

use crate::descriptor::HttpVerb;

/// Errors raised while compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("template {template:?} must start with '/'")]
    MissingLeadingSlash { template: String },

    #[error("template {template:?} contains an empty segment")]
    EmptySegment { template: String },

    #[error("template {template:?} has unbalanced braces in segment {segment:?}")]
    UnbalancedBraces { template: String, segment: String },

    #[error("template {template:?} has an invalid variable {variable:?}")]
    InvalidVariable { template: String, variable: String },

    #[error("template {template:?} binds variable {name:?} more than once")]
    DuplicateVariable { template: String, name: String },

    #[error("template {template:?} has a greedy variable {name:?} that is not the last segment")]
    GreedyNotTrailing { template: String, name: String },

    #[error("routes {first} and {second} have the same specificity and overlap")]
    Ambiguous { first: String, second: String },
}

/// One compiled path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// Binds exactly one request segment.
    Variable(String),
    /// Binds all remaining request segments (trailing only).
    Greedy(String),
}

/// Compiled form of an HTTP verb plus path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    verb: HttpVerb,
    template: String,
    segments: Vec<Segment>,
}

/// Variables bound by a successful match, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn push(&mut self, name: &str, value: String) {
        self.params.push((name.to_string(), value));
    }
}

impl RoutePattern {
    /// Compile a verb and path template.
    pub fn compile(verb: HttpVerb, template: &str) -> Result<Self, CompileError> {
        let body = template
            .strip_prefix('/')
            .ok_or_else(|| CompileError::MissingLeadingSlash {
                template: template.to_string(),
            })?;

        let mut segments = Vec::new();
        if !body.is_empty() {
            for raw in body.split('/') {
                segments.push(parse_segment(template, raw)?);
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            let name = match segment {
                Segment::Literal(_) => continue,
                Segment::Variable(name) => name,
                Segment::Greedy(name) => {
                    if i + 1 != segments.len() {
                        return Err(CompileError::GreedyNotTrailing {
                            template: template.to_string(),
                            name: name.clone(),
                        });
                    }
                    name
                }
            };
            if seen.contains(&name.as_str()) {
                return Err(CompileError::DuplicateVariable {
                    template: template.to_string(),
                    name: name.clone(),
                });
            }
            seen.push(name);
        }

        Ok(Self {
            verb,
            template: template.to_string(),
            segments,
        })
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Variable names (dotted field paths) in template order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Literal(_) => None,
            Segment::Variable(name) | Segment::Greedy(name) => Some(name.as_str()),
        })
    }

    pub fn has_greedy(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Greedy(_)))
    }

    /// Number of literal segments. Higher is more specific.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match a request verb and path, binding variables on success.
    pub fn matches(&self, verb: HttpVerb, path: &str) -> Option<PathParams> {
        if verb != self.verb {
            return None;
        }
        self.match_path(path)
    }

    /// Match a request path, ignoring the verb.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let body = path.strip_prefix('/')?;
        let parts: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/').collect()
        };

        let fixed = self.fixed_len();
        if self.has_greedy() {
            if parts.len() <= fixed {
                return None;
            }
        } else if parts.len() != fixed {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts.iter()) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Variable(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.push(name, decode_segment(part)?);
                }
                Segment::Greedy(name) => {
                    let rest = &parts[fixed..];
                    if rest.iter().any(|p| p.is_empty()) {
                        return None;
                    }
                    let decoded = rest
                        .iter()
                        .map(|p| decode_segment(p))
                        .collect::<Option<Vec<_>>>()?;
                    params.push(name, decoded.join("/"));
                }
            }
        }

        Some(params)
    }

    /// True when some request path matches both patterns.
    pub fn overlaps(&self, other: &RoutePattern) -> bool {
        if self.verb != other.verb {
            return false;
        }

        let fixed_a = self.fixed_len();
        let fixed_b = other.fixed_len();

        let lengths_ok = match (self.has_greedy(), other.has_greedy()) {
            (false, false) => fixed_a == fixed_b,
            (true, false) => fixed_b > fixed_a,
            (false, true) => fixed_a > fixed_b,
            (true, true) => true,
        };
        if !lengths_ok {
            return false;
        }

        let common = fixed_a.min(fixed_b);
        self.segments[..common]
            .iter()
            .zip(other.segments[..common].iter())
            .all(|pair| match pair {
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                _ => true,
            })
    }

    fn fixed_len(&self) -> usize {
        if self.has_greedy() {
            self.segments.len() - 1
        } else {
            self.segments.len()
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.template)
    }
}

fn parse_segment(template: &str, raw: &str) -> Result<Segment, CompileError> {
    if raw.is_empty() {
        return Err(CompileError::EmptySegment {
            template: template.to_string(),
        });
    }

    let opens = raw.matches('{').count();
    let closes = raw.matches('}').count();

    if opens == 0 && closes == 0 {
        return Ok(Segment::Literal(raw.to_string()));
    }

    if opens != 1 || closes != 1 || !raw.starts_with('{') || !raw.ends_with('}') {
        return Err(CompileError::UnbalancedBraces {
            template: template.to_string(),
            segment: raw.to_string(),
        });
    }

    let inner = &raw[1..raw.len() - 1];
    let (name, greedy) = match inner.split_once('=') {
        None => (inner, false),
        Some((name, "*")) => (name, false),
        Some((name, "**")) => (name, true),
        Some(_) => {
            return Err(CompileError::InvalidVariable {
                template: template.to_string(),
                variable: inner.to_string(),
            })
        }
    };

    if !is_field_path(name) {
        return Err(CompileError::InvalidVariable {
            template: template.to_string(),
            variable: inner.to_string(),
        });
    }

    if greedy {
        Ok(Segment::Greedy(name.to_string()))
    } else {
        Ok(Segment::Variable(name.to_string()))
    }
}

/// Dotted identifier: `name` or `book.author.id`.
fn is_field_path(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn decode_segment(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> Result<RoutePattern, CompileError> {
        RoutePattern::compile(HttpVerb::Get, template)
    }

    #[test]
    fn test_compile_valid_templates() {
        let p = compile("/v1/greet/{name}").unwrap();
        assert_eq!(
            p.segments(),
            &[
                Segment::Literal("v1".into()),
                Segment::Literal("greet".into()),
                Segment::Variable("name".into()),
            ]
        );
        assert_eq!(p.specificity(), 2);

        let p = compile("/v1/files/{path=**}").unwrap();
        assert!(p.has_greedy());
        assert_eq!(p.variables().collect::<Vec<_>>(), vec!["path"]);

        let p = compile("/v1/shelves/{shelf=*}/books/{book.id}").unwrap();
        assert_eq!(p.variables().collect::<Vec<_>>(), vec!["shelf", "book.id"]);

        assert!(compile("/").unwrap().segments().is_empty());
    }

    #[test]
    fn test_compile_rejects_duplicates_and_greedy() {
        assert!(matches!(
            compile("/v1/{id}/sub/{id}"),
            Err(CompileError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            compile("/v1/{rest=**}/tail"),
            Err(CompileError::GreedyNotTrailing { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_malformed() {
        assert!(matches!(compile("v1/a"), Err(CompileError::MissingLeadingSlash { .. })));
        assert!(matches!(compile("/v1//a"), Err(CompileError::EmptySegment { .. })));
        assert!(matches!(compile("/v1/a/"), Err(CompileError::EmptySegment { .. })));
        assert!(matches!(compile("/v1/{name"), Err(CompileError::UnbalancedBraces { .. })));
        assert!(matches!(compile("/v1/name}"), Err(CompileError::UnbalancedBraces { .. })));
        assert!(matches!(compile("/v1/x{name}"), Err(CompileError::UnbalancedBraces { .. })));
        assert!(matches!(compile("/v1/{}"), Err(CompileError::InvalidVariable { .. })));
        assert!(matches!(compile("/v1/{a=b}"), Err(CompileError::InvalidVariable { .. })));
        assert!(matches!(compile("/v1/{1abc}"), Err(CompileError::InvalidVariable { .. })));
    }

    #[test]
    fn test_match_binds_variables() {
        let p = compile("/v1/greet/{name}").unwrap();
        let params = p.matches(HttpVerb::Get, "/v1/greet/Ada").unwrap();
        assert_eq!(params.get("name"), Some("Ada"));

        let params = p.matches(HttpVerb::Get, "/v1/greet/Ada%20Lovelace").unwrap();
        assert_eq!(params.get("name"), Some("Ada Lovelace"));

        assert!(p.matches(HttpVerb::Post, "/v1/greet/Ada").is_none());
        assert!(p.matches(HttpVerb::Get, "/v1/greet").is_none());
        assert!(p.matches(HttpVerb::Get, "/v1/greet/Ada/extra").is_none());
        assert!(p.matches(HttpVerb::Get, "/v1/greet/").is_none());
        assert!(p.matches(HttpVerb::Get, "/v2/greet/Ada").is_none());
    }

    #[test]
    fn test_match_greedy_suffix() {
        let p = compile("/v1/files/{path=**}").unwrap();
        let params = p.matches(HttpVerb::Get, "/v1/files/a/b/c.txt").unwrap();
        assert_eq!(params.get("path"), Some("a/b/c.txt"));

        let params = p.matches(HttpVerb::Get, "/v1/files/one").unwrap();
        assert_eq!(params.get("path"), Some("one"));

        assert!(p.matches(HttpVerb::Get, "/v1/files").is_none());
    }

    #[test]
    fn test_overlap_detection() {
        let a = compile("/v1/users/{id}").unwrap();
        let b = compile("/v1/books/{id}").unwrap();
        let c = compile("/v1/{kind}/{id}").unwrap();
        let d = compile("/v1/{rest=**}").unwrap();
        let e = compile("/v1/{x}/me").unwrap();
        let f = compile("/v1/users/{id}").unwrap();

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(a.overlaps(&d));
        assert!(a.overlaps(&e));
        assert!(a.overlaps(&f));
        assert!(!a.overlaps(&RoutePattern::compile(HttpVerb::Post, "/v1/users/{id}").unwrap()));
        assert!(!compile("/v1").unwrap().overlaps(&d));
    }
}
