//! Outcome codes, status mapping and service errors.
//!
//! # Data Flow
//! ```text
//! Server: Status { code, message } → code.rs (code → HTTP status) → ErrorBody JSON
//! Client: HTTP status + optional ErrorBody → code.rs (status → code) → ClientError
//! ```

pub mod code;
pub mod error;

pub use code::OutcomeCode;
pub use error::{ErrorBody, Status};
