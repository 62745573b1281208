//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes with their handlers
//! - Reject ambiguous routes when they are inserted
//! - Look up the most specific route for a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes kept sorted by specificity, so the first match wins
//! - Explicit `None` rather than a silent default route

use crate::descriptor::HttpVerb;
use crate::routing::matcher::{CompileError, PathParams, RoutePattern};

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    pub pattern: &'a RoutePattern,
    pub value: &'a T,
    pub params: PathParams,
}

/// Compiled routes mapped to values of type `T`.
#[derive(Debug)]
pub struct RouteTable<T> {
    routes: Vec<(RoutePattern, T)>,
}

impl<T> RouteTable<T> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route.
    ///
    /// Fails when an existing route for the same verb has equal specificity
    /// and can match the same path.
    pub fn insert(&mut self, pattern: RoutePattern, value: T) -> Result<(), CompileError> {
        if let Some((existing, _)) = self.routes.iter().find(|(existing, _)| {
            existing.specificity() == pattern.specificity() && existing.overlaps(&pattern)
        }) {
            return Err(CompileError::Ambiguous {
                first: existing.to_string(),
                second: pattern.to_string(),
            });
        }

        // Stable position: after every route at least as specific.
        let position = self
            .routes
            .iter()
            .position(|(existing, _)| existing.specificity() < pattern.specificity())
            .unwrap_or(self.routes.len());
        self.routes.insert(position, (pattern, value));
        Ok(())
    }

    /// Find the most specific route matching the verb and path.
    pub fn lookup(&self, verb: HttpVerb, path: &str) -> Option<RouteMatch<'_, T>> {
        self.routes.iter().find_map(|(pattern, value)| {
            pattern.matches(verb, path).map(|params| RouteMatch {
                pattern,
                value,
                params,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter().map(|(pattern, _)| pattern)
    }
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(verb: HttpVerb, template: &str) -> RoutePattern {
        RoutePattern::compile(verb, template).unwrap()
    }

    #[test]
    fn test_most_specific_route_wins() {
        let mut table = RouteTable::new();
        table.insert(pattern(HttpVerb::Get, "/v1/{rest=**}"), "catch-all").unwrap();
        table.insert(pattern(HttpVerb::Get, "/v1/users/{id}"), "user").unwrap();
        table.insert(pattern(HttpVerb::Get, "/v1/users/me"), "me").unwrap();

        assert_eq!(*table.lookup(HttpVerb::Get, "/v1/users/me").unwrap().value, "me");

        let m = table.lookup(HttpVerb::Get, "/v1/users/42").unwrap();
        assert_eq!(*m.value, "user");
        assert_eq!(m.params.get("id"), Some("42"));

        let m = table.lookup(HttpVerb::Get, "/v1/books/7/pages").unwrap();
        assert_eq!(*m.value, "catch-all");
        assert_eq!(m.params.get("rest"), Some("books/7/pages"));
    }

    #[test]
    fn test_ambiguous_routes_rejected() {
        let mut table = RouteTable::new();
        table.insert(pattern(HttpVerb::Get, "/v1/users/{id}"), 1).unwrap();

        let err = table.insert(pattern(HttpVerb::Get, "/v1/{kind}/me"), 2).unwrap_err();
        assert!(matches!(err, CompileError::Ambiguous { .. }));

        let err = table.insert(pattern(HttpVerb::Get, "/v1/users/{name}"), 3).unwrap_err();
        assert!(matches!(err, CompileError::Ambiguous { .. }));

        // Same shape under another verb, or a disjoint literal, is fine.
        table.insert(pattern(HttpVerb::Delete, "/v1/users/{id}"), 4).unwrap();
        table.insert(pattern(HttpVerb::Get, "/v1/books/{id}"), 5).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_no_match() {
        let mut table = RouteTable::new();
        table.insert(pattern(HttpVerb::Get, "/v1/greet/{name}"), ()).unwrap();

        assert!(table.lookup(HttpVerb::Get, "/v1/unknown").is_none());
        assert!(table.lookup(HttpVerb::Post, "/v1/greet/Ada").is_none());
    }
}
