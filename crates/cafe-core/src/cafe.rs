//! # Café Records
//!
//! Cafés are managed outside this system. Rows are carried through exactly
//! as the store returns them, whatever their columns are called.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A café row as returned by the Record Store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cafe {
    /// Every column, passed through verbatim
    pub attributes: Map<String, Value>,
}

impl Cafe {
    /// Create a café with only an identifier
    pub fn new(id: impl Into<Value>) -> Self {
        Self::default().with_attribute("id", id)
    }

    /// Builder: add a pass-through attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Primary key (integer or UUID, whatever the store uses), if the row has one
    pub fn id(&self) -> Option<&Value> {
        self.attributes.get("id")
    }

    /// Display name, if the store has one
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }
}
