use crate::dispatcher::HeaderVec;
use crate::ids::RequestId;
use may_minihttp::Request;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Parsed HTTP request data used by `AppService` and the middleware chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRequest {
    pub request_id: RequestId,
    /// HTTP method as sent by the client
    pub method: String,
    /// Request path without query string
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Body exactly as received, for diagnostics
    pub raw_body: String,
    /// Body parsed as JSON, if it is valid JSON
    pub body: Option<Value>,
    /// Pattern of the bound route, set once routing succeeded
    pub route_pattern: Option<Arc<str>>,
}

impl ParsedRequest {
    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse an incoming HTTP request into a [`ParsedRequest`] with a fresh request id.
pub fn parse_request(req: Request) -> ParsedRequest {
    let request_id = RequestId::new();
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let mut raw_body = String::new();
    if let Err(e) = req.body().read_to_string(&mut raw_body) {
        debug!(request_id = %request_id, error = %e, "Request body unreadable");
        raw_body.clear();
    }
    let body = if raw_body.is_empty() {
        None
    } else {
        serde_json::from_str(&raw_body).ok()
    };

    debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        headers_count = headers.len(),
        body_size_bytes = raw_body.len(),
        body_is_json = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        request_id,
        method,
        path,
        headers,
        raw_body,
        body,
        route_pattern: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_header_is_case_insensitive() {
        let mut req = ParsedRequest::default();
        req.headers
            .push((Arc::from("user-agent"), "curl/8.5.0".to_string()));
        assert_eq!(req.get_header("User-Agent"), Some("curl/8.5.0"));
        assert!(req.get_header("accept").is_none());
    }
}
