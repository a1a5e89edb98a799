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

//! Binds named handler arguments to event attributes.
//!
//! Each requested argument is resolved, in order, from:
//! 1. the event attribute of the same name,
//! 2. the argument's declared default,
//! 3. the positional parameter table of the event family: the n-th requested
//!    argument takes the n-th attribute of the table (an update handler asking
//!    for `dt` receives `delta`).
//!
//! The world is never part of these lists: it is always a handler's first argument.

use super::names;
use super::payload::Event;
use crate::error::EventError;
use serde_json::Value;

/// One argument requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    /// The argument name.
    pub name: String,
    /// The value used when the event lacks the attribute.
    pub default: Option<Value>,
}

impl ArgSpec {
    /// A required argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// An argument with a fallback value.
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

impl From<&str> for ArgSpec {
    fn from(name: &str) -> Self {
        ArgSpec::required(name)
    }
}

/// The positional attribute names of an event family.
pub fn positional_parameters(event_name: &str) -> &'static [&'static str] {
    if event_name == names::UPDATE {
        &["delta"]
    } else if event_name.starts_with("input.keyboard") {
        &["key", "modifier", "character"]
    } else if event_name.starts_with(names::MOUSE_MOTION) {
        &["x", "y", "left", "middle", "right"]
    } else if event_name.starts_with("input.mouse") {
        &["x", "y", "button"]
    } else {
        &[]
    }
}

/// Resolves every argument of `specs` against `event`.
///
/// # Errors
///
/// [`EventError::MissingAttribute`] naming the first argument that cannot be
/// resolved and listing the attributes the event does carry.
pub fn bind(event: &Event, specs: &[ArgSpec]) -> Result<Vec<Value>, EventError> {
    let positional = positional_parameters(event.name());
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            if let Some(value) = event.get(&spec.name) {
                return Ok(value.clone());
            }
            if let Some(default) = &spec.default {
                return Ok(default.clone());
            }
            if let Some(value) = positional.get(index).and_then(|attr| event.get(attr)) {
                return Ok(value.clone());
            }
            event.require(&spec.name).cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_then_default_then_positional() {
        let event = Event::new(names::UPDATE).with("delta", 0.5);
        let specs = vec![ArgSpec::required("dt"), ArgSpec::with_default("speed", 3)];

        let values = bind(&event, &specs).unwrap();

        assert_eq!(values, vec![json!(0.5), json!(3)]);
    }

    #[test]
    fn test_mouse_positional_table() {
        let event = Event::new("input.mouse.down.left")
            .with("x", 1.0)
            .with("y", 2.0)
            .with("button", "left");
        let values = bind(&event, &["px".into(), "py".into(), "which".into()]).unwrap();
        assert_eq!(values, vec![json!(1.0), json!(2.0), json!("left")]);
    }

    #[test]
    fn test_unresolvable_argument_reports_available_attributes() {
        let event = Event::new("game.score").with("points", 10);
        let err = bind(&event, &["player".into()]).unwrap_err();
        assert!(
            err.to_string().contains("points"),
            "The error should enumerate the available attributes: {err}"
        );
    }
}
