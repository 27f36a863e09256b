//! Mapping resolutions and handler results to HTTP responses.
//!
//! - `NotFound` → 404
//! - `MethodNotAllowed` → 405 with `Allow`
//! - handler `Ok` → 200 JSON; handler errors → 404 / 501 / 500

use std::collections::BTreeSet;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::api::HandlerError;

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
            }
        })),
    )
        .into_response()
}

pub fn not_found(path: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("no route for `{path}`"))
}

/// `Allow` header value: sorted, comma-separated.
pub fn allow_header(allowed: &BTreeSet<String>) -> String {
    allowed.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

pub fn method_not_allowed(method: &str, allowed: &BTreeSet<String>) -> Response {
    let allow = allow_header(allowed);
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("method {method} not allowed; allowed: {allow}"),
    );
    if let Ok(value) = allow.parse() {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

pub fn missing_handler(handler: &str) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("handler `{handler}` is not registered"),
    )
}

pub fn handler_result(result: Result<Value, HandlerError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            let status = match e {
                HandlerError::UnknownOperation(_) => StatusCode::NOT_FOUND,
                HandlerError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
                HandlerError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let allowed = BTreeSet::from(["POST".to_string(), "GET".to_string()]);
        let response = method_not_allowed("DELETE", &allowed);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }

    #[test]
    fn test_handler_error_statuses() {
        let response = handler_result(Err(HandlerError::NotImplemented {
            handler: "DNSHandler".into(),
            method_name: "get_record".into(),
        }));
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let response = handler_result(Err(HandlerError::UnknownOperation("x".into())));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = handler_result(Ok(json!({"ok": true})));
        assert_eq!(response.status(), StatusCode::OK);
    }
}
