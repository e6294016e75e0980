//! Identity claims returned by the provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity and profile claims keyed by claim name.
///
/// Passed through as returned by the provider. Beyond requiring a subject claim, nothing
/// here interprets the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityClaims(Map<String, Value>);

impl IdentityClaims {
    /// Wrap a provider payload. Returns `None` unless it is a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    pub fn contains(&self, claim: &str) -> bool {
        self.0.contains_key(claim)
    }

    /// Stable user identifier: OpenID Connect `sub`, or `id` from Google's v2 userinfo.
    pub fn subject(&self) -> Option<&str> {
        ["sub", "id"]
            .iter()
            .filter_map(|claim| self.0.get(*claim))
            .find_map(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }
}
