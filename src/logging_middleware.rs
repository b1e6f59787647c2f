// src/logging_middleware.rs
//! Middleware for logging JSON request and response bodies at debug level

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Level};

/// Bodies above this size are passed through unlogged
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Credentials and tokens travel through these paths
const REDACTED_PREFIXES: [&str; 1] = ["/api/auth/"];

/// Whether a body on `path` with these headers may be logged
pub fn should_log_body(path: &str, headers: &HeaderMap) -> bool {
    if REDACTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("application/json"));
    let small_enough = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .map_or(true, |length| length <= MAX_LOGGED_BODY);

    is_json && small_enough
}

fn pretty(bytes: &[u8]) -> Option<String> {
    let json = serde_json::from_slice::<serde_json::Value>(bytes).ok()?;
    serde_json::to_string_pretty(&json).ok()
}

/// Logs request and response bodies when debug logging is on
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let path = request.uri().path().to_string();

    let request = if should_log_body(&path, request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY)
            .await
            .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

        if let Some(body) = pretty(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body,
                "📥 Request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;

    if !should_log_body(&path, response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(body) = pretty(&bytes) {
        debug!(
            status = %parts.status,
            uri = %path,
            response_body = %body,
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_json_bodies_are_logged() {
        assert!(should_log_body("/api/selections/toggle", &headers("application/json")));
        assert!(should_log_body(
            "/api/applications",
            &headers("application/json; charset=utf-8")
        ));
    }

    #[test]
    fn test_auth_bodies_are_never_logged() {
        assert!(!should_log_body("/api/auth/login", &headers("application/json")));
        assert!(!should_log_body("/api/auth/password", &headers("application/json")));
    }

    #[test]
    fn test_csv_and_oversized_bodies_are_skipped() {
        assert!(!should_log_body("/api/applications/export", &headers("text/csv; charset=utf-8")));

        let mut large = headers("application/json");
        large.insert(header::CONTENT_LENGTH, HeaderValue::from(MAX_LOGGED_BODY + 1));
        assert!(!should_log_body("/api/applications", &large));
    }
}
