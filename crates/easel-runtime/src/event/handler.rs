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

//! The handler contract and the typed adapters for each event family.
//!
//! An adapter is chosen when a handler is registered (`on_update`, `on_click`,
//! …). At dispatch time it pulls exactly the attributes its family needs from
//! the event and calls the user function with typed values.

use super::binder::{self, ArgSpec};
use super::payload::{Event, Params};
use crate::context::EventContext;
use crate::error::EventError;
use easel_core::input::{MouseButton, MouseButtons};
use easel_core::Vec2;
use serde_json::Value;
use std::marker::PhantomData;

/// What a handler tells the bus after running.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Nothing to report, keep dispatching.
    Continue,
    /// Stop dispatching this event to the remaining handlers.
    Stop,
    /// A result value. The last one becomes the event's result.
    Value(Value),
}

/// Conversion of a handler's return value into a [`Response`].
///
/// `()` continues, `false` stops dispatch, other values become results and
/// `Result`s propagate their error.
pub trait IntoResponse {
    /// Performs the conversion.
    fn into_response(self) -> Result<Response, EventError>;
}

impl IntoResponse for Response {
    fn into_response(self) -> Result<Response, EventError> {
        Ok(self)
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Result<Response, EventError> {
        Ok(Response::Continue)
    }
}

impl IntoResponse for bool {
    fn into_response(self) -> Result<Response, EventError> {
        Ok(if self {
            Response::Value(Value::Bool(true))
        } else {
            Response::Stop
        })
    }
}

impl IntoResponse for Value {
    fn into_response(self) -> Result<Response, EventError> {
        Ok(match self {
            Value::Null => Response::Continue,
            Value::Bool(false) => Response::Stop,
            other => Response::Value(other),
        })
    }
}

impl<T: IntoResponse> IntoResponse for Option<T> {
    fn into_response(self) -> Result<Response, EventError> {
        self.map_or(Ok(Response::Continue), IntoResponse::into_response)
    }
}

impl<T: IntoResponse> IntoResponse for Result<T, EventError> {
    fn into_response(self) -> Result<Response, EventError> {
        self.and_then(IntoResponse::into_response)
    }
}

/// Anything that can react to an event of a scene whose world is `W`.
pub trait Handler<W> {
    /// Handles `event`.
    fn call(
        &mut self,
        world: &mut W,
        ctx: &mut EventContext<'_, W>,
        event: &Event,
    ) -> Result<Response, EventError>;
}

// --- Typed views of event attributes ---

/// A mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// The cursor position.
    pub position: Vec2,
    /// The button.
    pub button: MouseButton,
}

/// A key press or release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The lowercase key name.
    pub key: String,
    /// The modifier bit mask.
    pub modifier: u32,
    /// The produced character, if any.
    pub character: Option<String>,
}

/// A cursor movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    /// The new cursor position.
    pub position: Vec2,
    /// The buttons held during the motion.
    pub buttons: MouseButtons,
}

impl ClickEvent {
    fn from_event(event: &Event) -> Result<Self, EventError> {
        Ok(Self {
            position: Vec2::new(event.number("x")? as f32, event.number("y")? as f32),
            button: event.decode("button")?,
        })
    }
}

impl KeyEvent {
    fn from_event(event: &Event) -> Result<Self, EventError> {
        Ok(Self {
            key: event.text("key")?.to_string(),
            modifier: event.get("modifier").and_then(Value::as_u64).unwrap_or(0) as u32,
            character: event.get("character").and_then(Value::as_str).map(str::to_string),
        })
    }
}

impl MotionEvent {
    fn from_event(event: &Event) -> Result<Self, EventError> {
        Ok(Self {
            position: Vec2::new(event.number("x")? as f32, event.number("y")? as f32),
            buttons: MouseButtons {
                left: event.flag("left")?,
                middle: event.flag("middle")?,
                right: event.flag("right")?,
            },
        })
    }
}

// --- Adapters ---

macro_rules! adapter {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub(crate) struct $name<F, R> {
            f: F,
            _result: PhantomData<fn() -> R>,
        }

        impl<F, R> $name<F, R> {
            pub(crate) fn new(f: F) -> Self {
                Self {
                    f,
                    _result: PhantomData,
                }
            }
        }
    };
}

adapter!(
    /// Passes the whole event through.
    RawAdapter
);
adapter!(
    /// Binds `delta` for update events.
    UpdateAdapter
);
adapter!(
    /// Binds `x`, `y` and `button` for mouse button events.
    ClickAdapter
);
adapter!(
    /// Binds `key`, `modifier` and `character` for keyboard events.
    KeyAdapter
);
adapter!(
    /// Binds `x`, `y`, `left`, `middle` and `right` for motion events.
    MotionAdapter
);
adapter!(
    /// Passes the scene parameters to `director.scene.enter` handlers.
    EnterAdapter
);
adapter!(
    /// Lets `director.scene.start` handlers produce the world.
    StartAdapter
);

impl<W, F, R> Handler<W> for RawAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, &Event) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        (self.f)(world, ctx, event).into_response()
    }
}

impl<W, F, R> Handler<W> for UpdateAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, f64) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        let delta = event.number("delta")?;
        (self.f)(world, ctx, delta).into_response()
    }
}

impl<W, F, R> Handler<W> for ClickAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, ClickEvent) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        let click = ClickEvent::from_event(event)?;
        (self.f)(world, ctx, click).into_response()
    }
}

impl<W, F, R> Handler<W> for KeyAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, &KeyEvent) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        let key = KeyEvent::from_event(event)?;
        (self.f)(world, ctx, &key).into_response()
    }
}

impl<W, F, R> Handler<W> for MotionAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, MotionEvent) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        let motion = MotionEvent::from_event(event)?;
        (self.f)(world, ctx, motion).into_response()
    }
}

impl<W, F, R> Handler<W> for EnterAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, &Params) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        (self.f)(world, ctx, event.params()).into_response()
    }
}

impl<W, F, R> Handler<W> for StartAdapter<F, R>
where
    F: FnMut(&mut EventContext<'_, W>, &Params) -> R,
    R: Into<Option<W>>,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        if let Some(created) = (self.f)(ctx, event.params()).into() {
            *world = created;
        }
        Ok(Response::Continue)
    }
}

/// Binds an explicit argument list (names with optional defaults).
pub(crate) struct ArgsAdapter<F, R> {
    specs: Vec<ArgSpec>,
    f: F,
    _result: PhantomData<fn() -> R>,
}

impl<F, R> ArgsAdapter<F, R> {
    pub(crate) fn new(specs: Vec<ArgSpec>, f: F) -> Self {
        Self {
            specs,
            f,
            _result: PhantomData,
        }
    }
}

impl<W, F, R> Handler<W> for ArgsAdapter<F, R>
where
    F: FnMut(&mut W, &mut EventContext<'_, W>, &[Value]) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        let args = binder::bind(event, &self.specs)?;
        (self.f)(world, ctx, &args).into_response()
    }
}

/// Runs an update handler only on ticks where a predicate over the world holds.
pub(crate) struct ConditionAdapter<P, F, R> {
    predicate: P,
    f: F,
    _result: PhantomData<fn() -> R>,
}

impl<P, F, R> ConditionAdapter<P, F, R> {
    pub(crate) fn new(predicate: P, f: F) -> Self {
        Self {
            predicate,
            f,
            _result: PhantomData,
        }
    }
}

impl<W, P, F, R> Handler<W> for ConditionAdapter<P, F, R>
where
    P: FnMut(&W) -> bool,
    F: FnMut(&mut W, &mut EventContext<'_, W>, f64) -> R,
    R: IntoResponse,
{
    fn call(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        if !(self.predicate)(world) {
            return Ok(Response::Continue);
        }
        let delta = event.number("delta")?;
        (self.f)(world, ctx, delta).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_return_values_map_to_responses() {
        assert_eq!(().into_response().unwrap(), Response::Continue);
        assert_eq!(false.into_response().unwrap(), Response::Stop);
        assert_eq!(json!(null).into_response().unwrap(), Response::Continue);
        assert_eq!(json!(3).into_response().unwrap(), Response::Value(json!(3)));
        assert_eq!(None::<bool>.into_response().unwrap(), Response::Continue);
        let failed: Result<(), EventError> = Err(EventError::UnknownHandlerPath("x".into()));
        assert!(failed.into_response().is_err());
    }

    #[test]
    fn test_typed_views_read_attributes() {
        let click = Event::new("input.mouse.down.right")
            .with("x", 5.0)
            .with("y", 6.0)
            .with("button", "right");
        let parsed = ClickEvent::from_event(&click).unwrap();
        assert_eq!(parsed.button, MouseButton::Right);
        assert_eq!(parsed.position, Vec2::new(5.0, 6.0));

        let key = Event::new("input.keyboard.down.a").with("key", "a").with("character", "a");
        let parsed = KeyEvent::from_event(&key).unwrap();
        assert_eq!(parsed.modifier, 0);
        assert_eq!(parsed.character.as_deref(), Some("a"));
    }
}
