use crate::dispatcher::HandlerResponse;
use http::StatusCode;
use may_minihttp::Response;
use serde_json::Value;

/// Reason phrase for the status line. Codes without a registered phrase get `Unknown`.
fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}

/// Write a handler response as JSON (or `text/plain` for a bare string body).
pub fn write_handler_response(res: &mut Response, response: &HandlerResponse) {
    res.status_code(usize::from(response.status), status_reason(response.status));
    match &response.body {
        Value::String(s) => {
            res.header("Content-Type: text/plain");
            res.body_vec(s.clone().into_bytes());
        }
        other => {
            res.header("Content-Type: application/json");
            res.body_vec(other.to_string().into_bytes());
        }
    }
}
