use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a user's consent record.
///
/// Opaque to the client: it is never generated locally, only echoed back to
/// the consent service on subsequent requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsentUuid(String);

impl ConsentUuid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ConsentUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConsentUuid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ConsentUuid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<ConsentUuid> for String {
    fn from(value: ConsentUuid) -> Self {
        value.0
    }
}
