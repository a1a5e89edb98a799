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

//! The typed registration API shared by the bus and the handler context.

use super::binder::ArgSpec;
use super::bus::{Binding, EventBus, HandlerSlot, RegistrationId};
use super::handler::{
    ArgsAdapter, ClickAdapter, ClickEvent, ConditionAdapter, EnterAdapter, Handler, IntoResponse, KeyAdapter,
    KeyEvent, MotionAdapter, MotionEvent, RawAdapter, StartAdapter, UpdateAdapter,
};
use super::payload::{Event, Params};
use crate::context::EventContext;
use serde_json::Value;

/// Registers handlers. Each method picks the adapter of one event family,
/// so the handler receives typed values instead of the raw event.
///
/// Implemented by [`EventBus`] (immediate registration) and by
/// [`EventContext`] (registration from inside a handler, applied as soon as
/// that handler returns).
pub trait Subscribe<W: 'static> {
    /// Registers a boxed handler.
    fn subscribe(&mut self, binding: Binding, handler: Box<dyn Handler<W>>) -> RegistrationId;

    /// Registers a handler receiving the whole event.
    fn on_event<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &Event) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(RawAdapter::new(f)))
    }

    /// Registers an update handler receiving `delta` in seconds.
    fn on_update<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, f64) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(UpdateAdapter::new(f)))
    }

    /// Registers a mouse button handler.
    fn on_click<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, ClickEvent) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(ClickAdapter::new(f)))
    }

    /// Registers a keyboard handler.
    fn on_key<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &KeyEvent) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(KeyAdapter::new(f)))
    }

    /// Registers a mouse motion handler.
    fn on_motion<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, MotionEvent) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(MotionAdapter::new(f)))
    }

    /// Registers a scene start handler. A returned world replaces the
    /// scene's current one.
    fn on_start<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut EventContext<'_, W>, &Params) -> R + 'static,
        R: Into<Option<W>> + 'static,
    {
        self.subscribe(binding.into(), Box::new(StartAdapter::new(f)))
    }

    /// Registers a scene enter handler receiving the scene parameters.
    fn on_enter<F, R>(&mut self, binding: impl Into<Binding>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &Params) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(EnterAdapter::new(f)))
    }

    /// Registers a handler receiving an explicit list of event attributes.
    ///
    /// Missing attributes fall back to the argument's declared default, then to the
    /// positional parameter table of the event family.
    fn on_args<F, R>(&mut self, binding: impl Into<Binding>, specs: Vec<ArgSpec>, f: F) -> RegistrationId
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &[Value]) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(ArgsAdapter::new(specs, f)))
    }

    /// Registers an update handler that only runs while `predicate` holds.
    fn on_condition<P, F, R>(&mut self, binding: impl Into<Binding>, predicate: P, f: F) -> RegistrationId
    where
        P: FnMut(&W) -> bool + 'static,
        F: FnMut(&mut W, &mut EventContext<'_, W>, f64) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.subscribe(binding.into(), Box::new(ConditionAdapter::new(predicate, f)))
    }
}

impl<W: 'static> Subscribe<W> for EventBus<W> {
    fn subscribe(&mut self, binding: Binding, handler: Box<dyn Handler<W>>) -> RegistrationId {
        self.register_slot(binding, HandlerSlot::Owned(handler))
    }
}
