use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque order identifier.
///
/// Cheap to clone (`Arc<str>`). Generated ids are UUID v4 strings; callers may
/// also supply their own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Arc<str>);

impl OrderId {
    /// Allocates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_uuids() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn serializes_as_a_plain_string() {
        let id = OrderId::from("table-4");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"table-4\"");

        let back: OrderId = serde_json::from_str("\"table-9\"").unwrap();
        assert_eq!(back.as_str(), "table-9");
    }
}
