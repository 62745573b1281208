//! Service-reported errors and the JSON error body.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::code::OutcomeCode;

/// An error outcome returned by a service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: OutcomeCode,
    message: String,
}

impl Status {
    pub fn new(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> OutcomeCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::AlreadyExists, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::PermissionDenied, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::Unauthenticated, message)
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::ResourceExhausted, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::FailedPrecondition, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::Unavailable, message)
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::DeadlineExceeded, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::Cancelled, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::Unimplemented, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::Internal, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(OutcomeCode::Unknown, message)
    }

    /// JSON body sent with the mapped HTTP status.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code,
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Status {}

impl From<ErrorBody> for Status {
    fn from(body: ErrorBody) -> Self {
        Self::new(body.code, body.message)
    }
}

/// Wire form of an error response: `{"code":"NOT_FOUND","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: OutcomeCode,
    #[serde(default)]
    pub message: String,
}
