use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use super::Middleware;
use crate::config::{AppConfig, RequestSchema, DEFAULT_CLIENT_TYPE_TOKEN};
use crate::dispatcher::HandlerResponse;
use crate::server::ParsedRequest;

/// Label used when the client type cannot be derived from the User-Agent.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Request observability: one log event per response, plus body diagnostics on failure.
///
/// A 200 is logged at `info`, anything else at `error`. For failed non-GET requests
/// the raw body is compared with the route's entry in the schema table and the
/// expected fields that are absent are reported as a hint. None of this touches the
/// response.
pub struct ObservabilityMiddleware {
    schema: RequestSchema,
    client_type_token: usize,
}

impl Default for ObservabilityMiddleware {
    fn default() -> Self {
        Self::new(RequestSchema::seeded(), DEFAULT_CLIENT_TYPE_TOKEN)
    }
}

impl ObservabilityMiddleware {
    #[must_use]
    pub fn new(schema: RequestSchema, client_type_token: usize) -> Self {
        Self {
            schema,
            client_type_token,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.request_body_schema.clone(), config.client_type_token)
    }

    /// Schema entry for the request: matched route pattern first, then the concrete path.
    fn schema_for(&self, req: &ParsedRequest) -> Option<&[String]> {
        req.route_pattern
            .as_deref()
            .and_then(|pattern| self.schema.fields_for(pattern))
            .or_else(|| self.schema.fields_for(&req.path))
    }

    /// Compare a failed request's body with the schema entry for its route.
    #[must_use]
    pub fn diagnose_body<'a>(&'a self, req: &ParsedRequest) -> BodyDiagnosis<'a> {
        if req.method == "GET" {
            return BodyDiagnosis::Skipped;
        }
        let Some(expected) = self.schema_for(req) else {
            return BodyDiagnosis::NoSchema;
        };
        let body = match serde_json::from_str::<Map<String, Value>>(&req.raw_body) {
            Ok(body) => body,
            Err(e) => return BodyDiagnosis::NotObject(e.to_string()),
        };
        let missing = missing_fields(expected, &body);
        if missing.is_empty() {
            BodyDiagnosis::Complete
        } else {
            BodyDiagnosis::Missing(missing)
        }
    }
}

/// Outcome of checking a failed request's body against its schema entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyDiagnosis<'a> {
    /// GET requests carry no body to check
    Skipped,
    NoSchema,
    /// Body is not a JSON object; holds the parse error
    NotObject(String),
    /// Expected fields absent from the body, in schema order
    Missing(Vec<&'a str>),
    Complete,
}

fn log_diagnosis(req: &ParsedRequest, route: &str, diagnosis: &BodyDiagnosis<'_>) {
    match diagnosis {
        BodyDiagnosis::Skipped | BodyDiagnosis::Complete => {}
        BodyDiagnosis::NoSchema => warn!(
            request_id = %req.request_id,
            route = %route,
            "No request body schema registered for route"
        ),
        BodyDiagnosis::NotObject(error) => warn!(
            request_id = %req.request_id,
            route = %route,
            error = %error,
            "Request body is not a JSON object - skipping schema check"
        ),
        BodyDiagnosis::Missing(missing) => warn!(
            request_id = %req.request_id,
            route = %route,
            missing_fields = ?missing,
            "Hint: request body is missing expected fields"
        ),
    }
}

impl Middleware for ObservabilityMiddleware {
    fn after(&self, req: &ParsedRequest, res: &HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1000.0;
        let client_type = client_type(req.get_header("user-agent"), self.client_type_token);
        let route = req.route_pattern.as_deref().unwrap_or(&req.path);

        if res.status == 200 {
            info!(
                request_id = %req.request_id,
                method = %req.method,
                route = %route,
                path = %req.path,
                status = res.status,
                client_type = %client_type,
                latency_ms = latency_ms,
                "Request completed"
            );
            return;
        }

        error!(
            request_id = %req.request_id,
            method = %req.method,
            route = %route,
            path = %req.path,
            status = res.status,
            client_type = %client_type,
            latency_ms = latency_ms,
            "Request failed"
        );
        log_diagnosis(req, route, &self.diagnose_body(req));
    }
}

/// Client label taken from the space-separated User-Agent token at `token`.
///
/// Returns [`UNKNOWN_CLIENT`] when the header is absent or too short.
#[must_use]
pub fn client_type(user_agent: Option<&str>, token: usize) -> &str {
    user_agent
        .and_then(|ua| ua.split(' ').nth(token))
        .filter(|t| !t.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
}

/// Expected fields absent from `body`'s top-level keys, in `expected` order.
#[must_use]
pub fn missing_fields<'a>(expected: &'a [String], body: &Map<String, Value>) -> Vec<&'a str> {
    expected
        .iter()
        .filter(|field| !body.contains_key(field.as_str()))
        .map(String::as_str)
        .collect()
}
