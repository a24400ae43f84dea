//! Turning HTTP failures into user-facing messages.

use reqwest::StatusCode;

/// Describe a failed request in terms a user can act on.
pub fn describe_failure(error: &reqwest::Error) -> String {
    if let Some(status) = error.status() {
        return describe_status(status);
    }
    if error.is_timeout() {
        return "request timed out".to_string();
    }
    if error.is_connect() {
        return "could not connect to the server".to_string();
    }
    if error.is_decode() {
        return format!("unexpected response body ({})", error);
    }
    error.to_string()
}

fn describe_status(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => {
            "authentication failed (check CURSEFORGE_API_KEY for CurseForge)".to_string()
        }
        StatusCode::FORBIDDEN => "access forbidden; an API key may be required".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "rate limit exceeded, try again later".to_string(),
        StatusCode::NOT_FOUND => "the requested resource was not found".to_string(),
        s if s.is_client_error() => format!("HTTP {} client error", s.as_u16()),
        s if s.is_server_error() => format!("HTTP {} server error", s.as_u16()),
        s => format!("unexpected HTTP status {}", s.as_u16()),
    }
}
