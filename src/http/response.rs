//! Response building.
//!
//! Every response the dispatcher writes is a fully buffered JSON body; the
//! headers are only produced once the body bytes exist.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

use crate::http::request::X_REQUEST_ID;
use crate::status::Status;

const JSON: HeaderValue = HeaderValue::from_static("application/json");

/// A buffered JSON response.
pub fn json_response(status: StatusCode, body: Vec<u8>, request_id: &str) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(header::CONTENT_TYPE, JSON);
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

/// The mapped HTTP status with an `{"code","message"}` body.
pub fn error_response(status: &Status, request_id: &str) -> Response {
    let body = serde_json::to_vec(&status.to_body())
        .unwrap_or_else(|_| br#"{"code":"INTERNAL","message":""}"#.to_vec());
    json_response(status.code().http_status(), body, request_id)
}
