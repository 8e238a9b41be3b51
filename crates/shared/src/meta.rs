//! Opaque server state threaded through every request/response pair.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const EMPTY_META: &str = "{}";

/// Server-defined blob that must be replayed unmodified on the next request.
///
/// The client never interprets it. The service sends it as a JSON string;
/// if any other JSON value arrives, its compact text is kept instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Meta(String);

impl Meta {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Placeholder sent when nothing has been persisted yet.
    pub fn empty() -> Self {
        Self(EMPTY_META.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Meta {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Meta(s),
            Value::Null => Meta::empty(),
            other => Meta(other.to_string()),
        })
    }
}
