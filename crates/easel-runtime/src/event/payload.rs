// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The event value carried through the bus.

use crate::error::EventError;
use serde_json::{Map, Value};

/// Named event attributes (and scene parameters), keyed by attribute name.
pub type Params = Map<String, Value>;

/// A named event and its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    attributes: Params,
}

impl Event {
    /// Creates an event without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Params::new(),
        }
    }

    /// Creates an event carrying `attributes`.
    pub fn with_params(name: impl Into<String>, attributes: Params) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Returns the event with one more attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The dot-namespaced event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attributes.
    pub fn params(&self) -> &Params {
        &self.attributes
    }

    /// Returns an attribute, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// The sorted attribute names, as listed in binding errors.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attributes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns an attribute or a [`EventError::MissingAttribute`] listing what exists.
    pub fn require(&self, key: &str) -> Result<&Value, EventError> {
        self.get(key).ok_or_else(|| EventError::MissingAttribute {
            event: self.name.clone(),
            attribute: key.to_string(),
            available: self.attribute_names(),
        })
    }

    /// Reads a numeric attribute.
    pub fn number(&self, key: &str) -> Result<f64, EventError> {
        let value = self.require(key)?;
        value.as_f64().ok_or_else(|| self.type_error(key, "a number", value))
    }

    /// Reads a string attribute.
    pub fn text(&self, key: &str) -> Result<&str, EventError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| self.type_error(key, "a string", value))
    }

    /// Reads a boolean attribute.
    pub fn flag(&self, key: &str) -> Result<bool, EventError> {
        let value = self.require(key)?;
        value.as_bool().ok_or_else(|| self.type_error(key, "a boolean", value))
    }

    /// Deserializes an attribute into `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<T, EventError> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).map_err(|_| self.type_error(key, std::any::type_name::<T>(), value))
    }

    pub(crate) fn type_error(&self, key: &str, expected: &'static str, found: &Value) -> EventError {
        EventError::AttributeType {
            event: self.name.clone(),
            attribute: key.to_string(),
            expected,
            found: found.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_lists_available() {
        let event = Event::new("input.mouse.down.left").with("x", 3.0).with("y", 4.0);
        let err = event.number("button").unwrap_err();
        match err {
            EventError::MissingAttribute { attribute, available, .. } => {
                assert_eq!(attribute, "button");
                assert_eq!(available, vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("Unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_typed_reads() {
        let event = Event::new("e").with("n", 2).with("s", "hi").with("b", true);
        assert_eq!(event.number("n").unwrap(), 2.0);
        assert_eq!(event.text("s").unwrap(), "hi");
        assert!(event.flag("b").unwrap());
        assert!(matches!(event.number("s"), Err(EventError::AttributeType { .. })));
    }
}
