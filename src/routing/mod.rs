//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at registration):
//!     HttpRule { verb, path template }
//!     → matcher.rs (compile template into segments)
//!     → router.rs (reject ambiguity, order by specificity)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (verb, path):
//!     → router.rs (route lookup, most specific first)
//!     → matcher.rs (compare literals, bind variables)
//!     → Return: RouteMatch with PathParams, or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - Ambiguity is a build-time error, never a runtime choice

pub mod matcher;
pub mod router;

pub use matcher::{CompileError, PathParams, RoutePattern, Segment};
pub use router::{RouteMatch, RouteTable};
