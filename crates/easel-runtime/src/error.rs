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

//! Error types of the scene runtime.

use easel_core::error::{ConfigError, InputError, ProviderError, SurfaceError};
use thiserror::Error;

fn join_or_hint(names: &[String]) -> String {
    if names.is_empty() {
        "check the documentation for the list of events (like 'updating' and 'starting')".to_string()
    } else {
        format!("perhaps you meant one of: {}", names.join(", "))
    }
}

/// An error raised while registering or dispatching events.
#[derive(Debug, Error)]
pub enum EventError {
    /// The event name is neither a known event, an alias, nor a prefix of one.
    #[error("Unrecognized event '{name}': {}", join_or_hint(.suggestions))]
    UnknownEvent {
        /// The name that was given.
        name: String,
        /// The closest known names.
        suggestions: Vec<String>,
    },
    /// A handler asked for an attribute the event does not carry.
    #[error(
        "Event '{event}' has no attribute '{attribute}'. Available attributes: [{}]",
        .available.join(", ")
    )]
    MissingAttribute {
        /// The event being dispatched.
        event: String,
        /// The requested attribute.
        attribute: String,
        /// The attributes the event actually carries.
        available: Vec<String>,
    },
    /// An attribute exists but holds a value of the wrong type.
    #[error("Attribute '{attribute}' of event '{event}' is not {expected}: {found}")]
    AttributeType {
        /// The event being dispatched.
        event: String,
        /// The attribute name.
        attribute: String,
        /// The expected type.
        expected: &'static str,
        /// The value that was found.
        found: serde_json::Value,
    },
    /// A named handler path was used before being defined.
    #[error("No handler is defined at path '{0}'")]
    UnknownHandlerPath(String),
    /// A handler returned an application error.
    #[error("Handler for '{event}' failed: {message}")]
    Handler {
        /// The event being dispatched.
        event: String,
        /// The handler's message.
        message: String,
    },
}

/// An error raised when starting or configuring an animation.
#[derive(Debug, Error)]
pub enum AnimationError {
    /// The object already runs an animation on one of the requested properties.
    #[error("Object {object} is already animating '{property}'; stop that animation first")]
    PropertyConflict {
        /// The animated object, formatted.
        object: String,
        /// The contested property.
        property: String,
    },
    /// The animated object does not exist (anymore).
    #[error("Cannot animate {0}: the object does not exist")]
    DeadObject(String),
    /// The animation is malformed.
    #[error("Invalid animation: {0}")]
    Invalid(String),
    /// The property cannot take the interpolated value.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// An error raised by property access on scene objects.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// No property has this name.
    #[error("Unknown property '{name}'{}", suggestion_suffix(.suggestions))]
    UnknownProperty {
        /// The given name.
        name: String,
        /// The closest property names.
        suggestions: Vec<String>,
    },
    /// The value type does not fit the property.
    #[error("Property '{property}' expects {expected}")]
    TypeMismatch {
        /// The property name.
        property: &'static str,
        /// A description of the accepted values.
        expected: &'static str,
    },
    /// The property does not apply to this kind of drawable.
    #[error("Property '{property}' is not available on {kind} objects")]
    NotApplicable {
        /// The property name.
        property: &'static str,
        /// The drawable kind name.
        kind: &'static str,
    },
}

fn suggestion_suffix(names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!(", perhaps you meant one of: {}", names.join(", "))
    }
}

/// An error raised by the layer tree or other per-scene bookkeeping.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Layers can only be defined once per view.
    #[error("Layers of view {0} are already defined")]
    LayersAlreadyDefined(String),
    /// The view does not exist (anymore).
    #[error("Unknown view {0}")]
    UnknownView(String),
    /// The root view cannot be removed or reparented.
    #[error("The root view cannot be modified this way")]
    RootView,
    /// The referenced object does not exist (anymore).
    #[error("Unknown object {0}")]
    UnknownObject(String),
    /// The operation needs a scene but the stack is empty.
    #[error("No scene is running")]
    NoActiveScene,
}

/// The umbrella error of the director's tick loop.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Control-flow signal: the director was stopped. `Director::run` turns
    /// this into a clean `Ok(())`.
    #[error("The game has ended")]
    GameEnded,
    /// An event could not be registered or dispatched.
    #[error(transparent)]
    Event(#[from] EventError),
    /// An animation could not be started.
    #[error(transparent)]
    Animation(#[from] AnimationError),
    /// A property access failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
    /// Scene bookkeeping failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The drawable provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The input source failed.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The presentation surface failed.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// Returns `true` for the "game ended" control-flow signal.
    pub fn is_game_ended(&self) -> bool {
        matches!(self, RuntimeError::GameEnded)
    }
}
