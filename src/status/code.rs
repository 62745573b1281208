//! Outcome codes and their HTTP status mapping.
//!
//! The mapping is total in both directions: every code has a status, and every
//! status decodes to some code (`Unknown` when nothing more specific applies).

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical RPC outcome classification, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

/// Non-standard status used for client-cancelled requests.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

impl OutcomeCode {
    pub const ALL: [OutcomeCode; 17] = [
        OutcomeCode::Ok,
        OutcomeCode::Cancelled,
        OutcomeCode::Unknown,
        OutcomeCode::InvalidArgument,
        OutcomeCode::DeadlineExceeded,
        OutcomeCode::NotFound,
        OutcomeCode::AlreadyExists,
        OutcomeCode::PermissionDenied,
        OutcomeCode::ResourceExhausted,
        OutcomeCode::FailedPrecondition,
        OutcomeCode::Aborted,
        OutcomeCode::OutOfRange,
        OutcomeCode::Unimplemented,
        OutcomeCode::Internal,
        OutcomeCode::Unavailable,
        OutcomeCode::DataLoss,
        OutcomeCode::Unauthenticated,
    ];

    /// HTTP status for this code.
    pub fn http_status(self) -> StatusCode {
        match self {
            OutcomeCode::Ok => StatusCode::OK,
            OutcomeCode::InvalidArgument | OutcomeCode::OutOfRange => StatusCode::BAD_REQUEST,
            OutcomeCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            OutcomeCode::PermissionDenied => StatusCode::FORBIDDEN,
            OutcomeCode::NotFound => StatusCode::NOT_FOUND,
            OutcomeCode::AlreadyExists | OutcomeCode::Aborted => StatusCode::CONFLICT,
            OutcomeCode::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            OutcomeCode::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            OutcomeCode::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            OutcomeCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            OutcomeCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            OutcomeCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            OutcomeCode::Internal | OutcomeCode::Unknown | OutcomeCode::DataLoss => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Code for an HTTP status, used when no error body names one.
    pub fn from_http_status(status: StatusCode) -> Self {
        match status.as_u16() {
            200..=299 => OutcomeCode::Ok,
            400 => OutcomeCode::InvalidArgument,
            401 => OutcomeCode::Unauthenticated,
            403 => OutcomeCode::PermissionDenied,
            404 => OutcomeCode::NotFound,
            409 => OutcomeCode::AlreadyExists,
            412 => OutcomeCode::FailedPrecondition,
            429 => OutcomeCode::ResourceExhausted,
            CLIENT_CLOSED_REQUEST => OutcomeCode::Cancelled,
            500 => OutcomeCode::Internal,
            501 => OutcomeCode::Unimplemented,
            503 => OutcomeCode::Unavailable,
            504 => OutcomeCode::DeadlineExceeded,
            _ => OutcomeCode::Unknown,
        }
    }

    /// Canonical `SCREAMING_SNAKE_CASE` name.
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeCode::Ok => "OK",
            OutcomeCode::Cancelled => "CANCELLED",
            OutcomeCode::Unknown => "UNKNOWN",
            OutcomeCode::InvalidArgument => "INVALID_ARGUMENT",
            OutcomeCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            OutcomeCode::NotFound => "NOT_FOUND",
            OutcomeCode::AlreadyExists => "ALREADY_EXISTS",
            OutcomeCode::PermissionDenied => "PERMISSION_DENIED",
            OutcomeCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            OutcomeCode::FailedPrecondition => "FAILED_PRECONDITION",
            OutcomeCode::Aborted => "ABORTED",
            OutcomeCode::OutOfRange => "OUT_OF_RANGE",
            OutcomeCode::Unimplemented => "UNIMPLEMENTED",
            OutcomeCode::Internal => "INTERNAL",
            OutcomeCode::Unavailable => "UNAVAILABLE",
            OutcomeCode::DataLoss => "DATA_LOSS",
            OutcomeCode::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutcomeCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = [
            (OutcomeCode::Ok, 200),
            (OutcomeCode::InvalidArgument, 400),
            (OutcomeCode::Unauthenticated, 401),
            (OutcomeCode::PermissionDenied, 403),
            (OutcomeCode::NotFound, 404),
            (OutcomeCode::AlreadyExists, 409),
            (OutcomeCode::FailedPrecondition, 412),
            (OutcomeCode::ResourceExhausted, 429),
            (OutcomeCode::Internal, 500),
            (OutcomeCode::Unknown, 500),
            (OutcomeCode::Unavailable, 503),
            (OutcomeCode::DeadlineExceeded, 504),
        ];
        for (code, status) in table {
            assert_eq!(code.http_status().as_u16(), status, "{code}");
        }
    }

    #[test]
    fn test_round_trip_is_stable() {
        // Codes sharing a status collapse onto one documented representative.
        for code in OutcomeCode::ALL {
            let back = OutcomeCode::from_http_status(code.http_status());
            let expected = match code {
                OutcomeCode::Unknown | OutcomeCode::DataLoss => OutcomeCode::Internal,
                OutcomeCode::OutOfRange => OutcomeCode::InvalidArgument,
                OutcomeCode::Aborted => OutcomeCode::AlreadyExists,
                other => other,
            };
            assert_eq!(back, expected, "{code}");
        }
    }

    #[test]
    fn test_unmapped_status_is_unknown() {
        assert_eq!(OutcomeCode::from_http_status(StatusCode::IM_A_TEAPOT), OutcomeCode::Unknown);
        assert_eq!(OutcomeCode::from_http_status(StatusCode::BAD_GATEWAY), OutcomeCode::Unknown);
        assert_eq!(OutcomeCode::from_http_status(StatusCode::NO_CONTENT), OutcomeCode::Ok);
    }

    #[test]
    fn test_names_parse_and_serialize() {
        for code in OutcomeCode::ALL {
            assert_eq!(code.as_str().parse::<OutcomeCode>(), Ok(code));
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
        assert!("NOPE".parse::<OutcomeCode>().is_err());
    }
}
