use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Prefix carried by every rendered request id.
pub const REQUEST_ID_PREFIX: &str = "request_";

/// Strongly typed request identifier backed by a random v4 UUID.
///
/// Renders as `request_<uuid>`, e.g. `request_67e55044-10b1-426f-9247-bb680e5fe0c8`.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub Uuid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{REQUEST_ID_PREFIX}{}", self.0.hyphenated())
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(REQUEST_ID_PREFIX).unwrap_or(s);
        Ok(RequestId(Uuid::parse_str(raw)?))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Identifier of a running service instance, generated once at startup.
///
/// Renders in URN form (`urn:uuid:...`).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.urn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_has_prefix_and_no_urn() {
        let id = RequestId::new().to_string();
        assert!(id.starts_with("request_"));
        assert!(!id.contains("urn:uuid:"));
        assert_eq!(id.len(), REQUEST_ID_PREFIX.len() + 36);
    }

    #[test]
    fn request_id_parses_back() {
        let id = RequestId::new();
        let parsed: RequestId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn instance_id_is_urn() {
        assert!(InstanceId::generate().to_string().starts_with("urn:uuid:"));
    }
}
