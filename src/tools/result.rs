//! The uniform tool result shape.
//!
//! Serialized, a result is always one of
//! `{"success": true, <tool fields>}` or `{"success": false, "error": "<message>"}`.

use crate::error::{FormcheckError, Result};
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Outcome of a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// Tool-specific fields, without the `success` flag.
    Success(Map<String, Value>),
    /// Human-readable failure message.
    Failure(String),
}

impl ToolResult {
    /// Build a success from a payload that serializes to a JSON object.
    pub fn success<T: Serialize>(payload: &T) -> Result<Self> {
        match serde_json::to_value(payload)? {
            Value::Object(mut fields) => {
                fields.remove("success");
                fields.remove("error");
                Ok(Self::Success(fields))
            }
            other => Err(serde_json::Error::custom(format!(
                "tool payload must be a JSON object, got {}",
                other
            ))
            .into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn from_error(error: &FormcheckError) -> Self {
        Self::Failure(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure message, if this is a failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }

    /// The success fields, if this is a success.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Success(fields) => Some(fields),
            Self::Failure(_) => None,
        }
    }

    /// A single success field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields().and_then(|fields| fields.get(key))
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        match self {
            Self::Success(fields) => {
                object.insert("success".into(), Value::Bool(true));
                object.extend(fields.clone());
            }
            Self::Failure(message) => {
                object.insert("success".into(), Value::Bool(false));
                object.insert("error".into(), Value::String(message.clone()));
            }
        }
        Value::Object(object)
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Success(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("success", &true)?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Failure(message) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

impl std::fmt::Display for ToolResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
