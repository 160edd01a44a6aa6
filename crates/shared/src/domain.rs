use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Identifier assigned by the repository. The server emits strings, but
/// numeric ids are accepted and kept as they arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptionId {
    Text(String),
    Number(i64),
}

impl DescriptionId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.is_empty() => Some(Self::Text(text.clone())),
            // Floats and integers outside `i64` keep their JSON text.
            Value::Number(number) => Some(
                number
                    .as_i64()
                    .map_or_else(|| Self::Text(number.to_string()), Self::Number),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

// Ids compare by their path form, so `"7"` and `7` name the same record.
impl PartialEq for DescriptionId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for DescriptionId {}

impl Hash for DescriptionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<&str> for DescriptionId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DescriptionId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for DescriptionId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("device description has no usable `id` field")]
    MissingId,
}

/// A device description as stored in the repository.
///
/// Only `id` and `name` are interpreted; the full document is kept verbatim
/// (including field order) and is what gets serialized back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DeviceDescription {
    id: DescriptionId,
    name: String,
    document: Map<String, Value>,
}

impl DeviceDescription {
    pub fn id(&self) -> &DescriptionId {
        &self.id
    }

    /// Display name; empty when the document carries no string `name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }
}

impl TryFrom<Map<String, Value>> for DeviceDescription {
    type Error = DescriptionError;

    fn try_from(document: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = document
            .get("id")
            .and_then(DescriptionId::from_value)
            .ok_or(DescriptionError::MissingId)?;
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self { id, name, document })
    }
}

impl From<DeviceDescription> for Map<String, Value> {
    fn from(value: DeviceDescription) -> Self {
        value.document
    }
}

/// Backend health information as reported by `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(pub Map<String, Value>);

impl StatusSnapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn repository_available(&self) -> Option<bool> {
        self.get("repository_available").and_then(Value::as_bool)
    }

    pub fn broker_available(&self) -> Option<bool> {
        self.get("broker_available").and_then(Value::as_bool)
    }

    pub fn device_descriptions_count(&self) -> Option<u64> {
        self.get("device_descriptions_count").and_then(Value::as_u64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Capability key to value-type summary, as reported by `GET /capabilities`.
pub type CapabilitiesSummary = BTreeMap<String, String>;
