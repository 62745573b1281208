//! Client call errors.

use axum::http::StatusCode;
use thiserror::Error;

use crate::routing::CompileError;
use crate::status::{ErrorBody, OutcomeCode, Status};

/// The single error a client stub call can fail with.
///
/// Carries the outcome code, the HTTP status when a response arrived, and any
/// message the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ClientError {
    code: OutcomeCode,
    http_status: Option<StatusCode>,
    message: String,
}

impl ClientError {
    pub fn new(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            code,
            http_status: None,
            message: message.into(),
        }
    }

    pub fn with_http_status(mut self, status: StatusCode) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn code(&self) -> OutcomeCode {
        self.code
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        self.http_status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Build the error for a non-success response.
    ///
    /// A decodable error body names the code; otherwise the status decides.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .filter(|parsed| parsed.code != OutcomeCode::Ok);

        let (code, message) = match parsed {
            Some(parsed) => (parsed.code, parsed.message),
            None => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                let message = if text.is_empty() {
                    status.canonical_reason().unwrap_or_default().to_string()
                } else {
                    text
                };
                (OutcomeCode::from_http_status(status), message)
            }
        };
        Self::new(code, message).with_http_status(status)
    }

    /// Map a transport failure.
    pub fn from_transport(error: reqwest::Error) -> Self {
        let code = if error.is_timeout() {
            OutcomeCode::DeadlineExceeded
        } else {
            OutcomeCode::Unavailable
        };
        let client_error = Self::new(code, error.to_string());
        match error.status() {
            Some(status) => client_error.with_http_status(status),
            None => client_error,
        }
    }

    pub fn into_status(self) -> Status {
        Status::new(self.code, self.message)
    }
}

impl From<Status> for ClientError {
    fn from(status: Status) -> Self {
        Self::new(status.code(), status.message())
    }
}

impl From<CompileError> for ClientError {
    fn from(error: CompileError) -> Self {
        Self::new(OutcomeCode::Internal, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_code_wins() {
        let err = ClientError::from_response(
            StatusCode::FORBIDDEN,
            br#"{"code":"PERMISSION_DENIED","message":"nope"}"#,
        );
        assert_eq!(err.code(), OutcomeCode::PermissionDenied);
        assert_eq!(err.http_status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.message(), "nope");

        let err = ClientError::from_response(StatusCode::BAD_REQUEST, br#"{"code":"OUT_OF_RANGE"}"#);
        assert_eq!(err.code(), OutcomeCode::OutOfRange);
    }

    #[test]
    fn test_status_fallback() {
        let err = ClientError::from_response(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert_eq!(err.code(), OutcomeCode::Unavailable);
        assert_eq!(err.message(), "Service Unavailable");

        let err = ClientError::from_response(StatusCode::IM_A_TEAPOT, b"short and stout");
        assert_eq!(err.code(), OutcomeCode::Unknown);
        assert_eq!(err.message(), "short and stout");
        assert_eq!(err.to_string(), "UNKNOWN: short and stout");
    }

    #[test]
    fn test_status_conversions() {
        let err: ClientError = Status::cancelled("gone").into();
        assert_eq!(err.code(), OutcomeCode::Cancelled);
        assert_eq!(err.http_status(), None);
        assert_eq!(err.into_status(), Status::cancelled("gone"));
    }
}
