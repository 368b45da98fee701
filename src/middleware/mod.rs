mod core;
mod observability;

pub use core::Middleware;
pub use observability::{
    client_type, missing_fields, BodyDiagnosis, ObservabilityMiddleware, UNKNOWN_CLIENT,
};
