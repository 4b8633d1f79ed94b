//! HTTP response building module
//!
//! JSON error bodies for requests the router could not answer normally.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::error::HandlerError;

/// Build a JSON error response for a failed handler
///
/// 5xx responses hide the error text; anything else reports it.
pub fn build_error_response(error: &HandlerError) -> Response<Full<Bytes>> {
    let status = error.status_code();
    let message = if status.is_server_error() {
        status
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_string()
    } else {
        error.to_string()
    };
    build_json_error(status, &message)
}

/// Build 404 Not Found response
pub fn build_not_found_response(path: &str) -> Response<Full<Bytes>> {
    build_json_error(StatusCode::NOT_FOUND, &format!("no route for {path}"))
}

fn build_json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
        }
    });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
