//! Client runtime for generated stubs.
//!
//! A generated `<Service>HttpClient` holds one `HttpClient` and one compiled
//! `ClientRoute` per method; each stub method is a single `invoke` call.

pub mod error;
pub mod stub;

pub use error::ClientError;
pub use stub::{ClientRoute, HttpClient};
