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

//! The explicit runtime context handed to every event handler.
//!
//! A handler gets mutable access to the scene's objects, views and
//! animations. Anything that would touch the bus, the scene stack or other
//! handlers is recorded in an [`Outbox`] and carried out once the handler
//! returns (bus changes) or once the current dispatch completes (emitted
//! events, scene changes).

use crate::animation::{Animation, AnimationHandle, AnimationScheduler};
use crate::error::{AnimationError, EventError};
use crate::event::{
    names, Binding, BusOp, Event, Handler, HandlerSlot, IdSource, Params, RegistrationId, Response, Subscribe,
};
use crate::layer_tree::LayerTree;
use crate::object::{ObjectStore, SceneObject};
use easel_core::{ObjectId, Rect, RuntimeConfig, Vec2};
use std::collections::VecDeque;

/// A scene stack change requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DirectorCommand {
    Push(String, Params),
    Replace(String, Params),
    Pop(Params),
    Stop,
    Pause(bool),
}

/// Work requested from inside handlers, applied by the bus or the director.
pub(crate) struct Outbox<W> {
    pub(crate) bus_ops: Vec<BusOp<W>>,
    pub(crate) emitted: VecDeque<Event>,
    pub(crate) commands: Vec<DirectorCommand>,
    pub(crate) redraw: bool,
    pub(crate) ids: IdSource,
}

impl<W> Outbox<W> {
    pub(crate) fn new(ids: IdSource) -> Self {
        Self {
            bus_ops: Vec::new(),
            emitted: VecDeque::new(),
            commands: Vec::new(),
            redraw: false,
            ids,
        }
    }
}

/// Per-tick values shared by every context of a frame.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameInfo {
    pub(crate) mouse: Vec2,
    pub(crate) tick: u64,
}

/// The state a director shares with every scene it runs.
///
/// It replaces any notion of a global "current director": scenes receive it
/// explicitly each time they dispatch or draw.
#[derive(Debug, Clone, Default)]
pub struct RuntimeContext {
    pub(crate) config: RuntimeConfig,
    pub(crate) frame: FrameInfo,
}

impl RuntimeContext {
    /// Creates a context at tick `0` with the cursor at the origin.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            frame: FrameInfo::default(),
        }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The number of update ticks run so far.
    pub fn tick(&self) -> u64 {
        self.frame.tick
    }

    /// The last known mouse position.
    pub fn mouse(&self) -> Vec2 {
        self.frame.mouse
    }
}

/// Access to the running scene from inside an event handler.
pub struct EventContext<'a, W> {
    pub(crate) objects: &'a mut ObjectStore,
    pub(crate) layers: &'a mut LayerTree,
    pub(crate) animations: &'a mut AnimationScheduler,
    pub(crate) queue: &'a mut VecDeque<Event>,
    pub(crate) outbox: &'a mut Outbox<W>,
    pub(crate) config: &'a RuntimeConfig,
    pub(crate) frame: FrameInfo,
    pub(crate) scene_name: &'a str,
}

impl<W: 'static> EventContext<'_, W> {
    // --- Objects ---

    /// Adds an object to the scene.
    pub fn spawn(&mut self, object: SceneObject) -> ObjectId {
        self.objects.spawn(object)
    }

    /// Destroys an object with its animations and event registrations.
    ///
    /// # Returns
    ///
    /// `false` if the object was already gone.
    pub fn destroy(&mut self, id: ObjectId) -> bool {
        if self.objects.despawn(id).is_none() {
            return false;
        }
        if let Some(ticker) = self.animations.forget(id) {
            self.outbox.bus_ops.push(BusOp::Unregister(ticker));
        }
        self.outbox.bus_ops.push(BusOp::UnregisterOwner(id));
        log::debug!("Destroyed {id} in scene '{}'", self.scene_name);
        true
    }

    /// Borrows an object.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    /// Mutably borrows an object.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    /// The scene's objects.
    pub fn objects(&self) -> &ObjectStore {
        &*self.objects
    }

    /// The scene's objects, mutably.
    pub fn objects_mut(&mut self) -> &mut ObjectStore {
        &mut *self.objects
    }

    /// The scene's views and layers.
    pub fn layers(&self) -> &LayerTree {
        &*self.layers
    }

    /// The scene's views and layers, mutably.
    pub fn layers_mut(&mut self) -> &mut LayerTree {
        &mut *self.layers
    }

    // --- Collision ---

    /// Checks whether two objects overlap.
    pub fn collide(&self, a: ObjectId, b: ObjectId) -> bool {
        self.objects.collide(a, b)
    }

    /// Checks whether an object covers a point.
    pub fn collide_point(&self, id: ObjectId, point: Vec2) -> bool {
        self.objects.collide_point(id, point)
    }

    /// Checks whether an object overlaps a rectangle.
    pub fn collide_rect(&self, id: ObjectId, rect: Rect) -> bool {
        self.objects.collide_rect(id, rect)
    }

    /// Checks whether `a` would overlap `b` if it were moved to `at`.
    pub fn would_collide(&self, a: ObjectId, at: Vec2, b: ObjectId) -> bool {
        self.objects.would_collide(a, at, b)
    }

    /// Checks whether an object is under the mouse cursor.
    pub fn colliding_with_mouse(&self, id: ObjectId) -> bool {
        self.objects.collide_point(id, self.frame.mouse)
    }

    // --- Animation ---

    /// Starts an animation on an object.
    ///
    /// The first animation of an object subscribes a ticker on
    /// `director.update`, bound to the object so it dies with it.
    ///
    /// # Errors
    ///
    /// See [`AnimationScheduler::start`].
    pub fn animate(&mut self, id: ObjectId, animation: Animation) -> Result<AnimationHandle, AnimationError> {
        let (handle, events) = self.animations.start(self.objects, id, animation)?;
        self.outbox.emitted.extend(events);
        if self.animations.ticker(id).is_none() {
            let ticker = self.subscribe(Binding::new(names::UPDATE).owner(id), Box::new(AnimationTicker(id)));
            self.animations.set_ticker(id, ticker);
        }
        Ok(handle)
    }

    /// Stops one animation, firing its end event.
    pub fn stop_animation(&mut self, id: ObjectId, handle: AnimationHandle) {
        let events = self.animations.stop(self.objects, id, handle);
        self.outbox.emitted.extend(events);
        self.release_ticker(id);
    }

    /// Stops every animation of an object, firing their end events.
    pub fn stop_all_animations(&mut self, id: ObjectId) {
        let events = self.animations.stop_all(self.objects, id);
        self.outbox.emitted.extend(events);
        self.release_ticker(id);
    }

    /// The scene's animations.
    pub fn animations(&self) -> &AnimationScheduler {
        &*self.animations
    }

    fn advance_animations(&mut self, id: ObjectId, delta: f64) -> Result<(), EventError> {
        let events = self
            .animations
            .advance(self.objects, id, delta)
            .map_err(|e| EventError::Handler {
                event: names::UPDATE.to_string(),
                message: e.to_string(),
            })?;
        self.outbox.emitted.extend(events);
        self.release_ticker(id);
        Ok(())
    }

    fn release_ticker(&mut self, id: ObjectId) {
        if let Some(ticker) = self.animations.release_if_idle(id) {
            self.outbox.bus_ops.push(BusOp::Unregister(ticker));
        }
    }

    // --- Events ---

    /// Dispatches `event` right after the current dispatch finishes.
    pub fn emit(&mut self, event: Event) {
        self.outbox.emitted.push_back(event);
    }

    /// Queues `event` for the next drain of the scene queue, which happens
    /// during `director.update`.
    pub fn queue_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Removes a registration once the current handler returns.
    pub fn unregister(&mut self, id: RegistrationId) {
        self.outbox.bus_ops.push(BusOp::Unregister(id));
    }

    /// Removes every namespace at least as specific as `prefix` once the
    /// current handler returns.
    pub fn clear_namespace(&mut self, prefix: impl Into<String>) {
        self.outbox.bus_ops.push(BusOp::ClearNamespace(prefix.into()));
    }

    /// Removes every registration of the scene once the current handler returns.
    pub fn clear_all(&mut self) {
        self.outbox.bus_ops.push(BusOp::ClearAll);
    }

    // --- Director ---

    /// Pushes a new scene on top of this one after the current dispatch.
    pub fn push_scene(&mut self, name: impl Into<String>, params: Params) {
        self.outbox.commands.push(DirectorCommand::Push(name.into(), params));
    }

    /// Replaces this scene after the current dispatch.
    pub fn replace_scene(&mut self, name: impl Into<String>, params: Params) {
        self.outbox.commands.push(DirectorCommand::Replace(name.into(), params));
    }

    /// Pops this scene after the current dispatch, handing `params` to the
    /// scene below.
    pub fn pop_scene(&mut self, params: Params) {
        self.outbox.commands.push(DirectorCommand::Pop(params));
    }

    /// Ends the game after the current dispatch.
    pub fn stop(&mut self) {
        self.outbox.commands.push(DirectorCommand::Stop);
    }

    /// Pauses or resumes updates.
    pub fn pause(&mut self, paused: bool) {
        self.outbox.commands.push(DirectorCommand::Pause(paused));
    }

    /// Redraws the whole screen on the next frame.
    pub fn request_redraw(&mut self) {
        self.outbox.redraw = true;
    }

    // --- Frame state ---

    /// The last known mouse position.
    pub fn mouse(&self) -> Vec2 {
        self.frame.mouse
    }

    /// The number of update ticks run so far.
    pub fn tick(&self) -> u64 {
        self.frame.tick
    }

    /// The runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    /// The name of the scene handling the event.
    pub fn scene_name(&self) -> &str {
        self.scene_name
    }
}

impl<W: 'static> Subscribe<W> for EventContext<'_, W> {
    fn subscribe(&mut self, binding: Binding, handler: Box<dyn Handler<W>>) -> RegistrationId {
        let id = self.outbox.ids.next();
        self.outbox.bus_ops.push(BusOp::Register {
            id,
            binding,
            slot: HandlerSlot::Owned(handler),
        });
        id
    }
}

/// Advances the animations of one object on every update.
struct AnimationTicker(ObjectId);

impl<W: 'static> Handler<W> for AnimationTicker {
    fn call(&mut self, _world: &mut W, ctx: &mut EventContext<'_, W>, event: &Event) -> Result<Response, EventError> {
        let delta = event.number("delta")?;
        ctx.advance_animations(self.0, delta)?;
        Ok(Response::Continue)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::event::{DispatchOutcome, EventBus};

    /// The scene state an [`EventContext`] borrows, for unit tests that
    /// drive a bus without a director.
    pub(crate) struct Harness<W> {
        pub(crate) objects: ObjectStore,
        pub(crate) layers: LayerTree,
        pub(crate) animations: AnimationScheduler,
        pub(crate) queue: VecDeque<Event>,
        pub(crate) outbox: Outbox<W>,
        pub(crate) config: RuntimeConfig,
        pub(crate) frame: FrameInfo,
    }

    impl<W: 'static> Harness<W> {
        pub(crate) fn new() -> Self {
            Self {
                objects: ObjectStore::new(),
                layers: LayerTree::new(),
                animations: AnimationScheduler::new(),
                queue: VecDeque::new(),
                outbox: Outbox::new(IdSource::default()),
                config: RuntimeConfig::default(),
                frame: FrameInfo::default(),
            }
        }

        pub(crate) fn dispatch(
            &mut self,
            bus: &mut EventBus<W>,
            world: &mut W,
            event: &Event,
        ) -> Result<DispatchOutcome, EventError> {
            self.outbox.ids = bus.ids();
            let mut ctx = EventContext {
                objects: &mut self.objects,
                layers: &mut self.layers,
                animations: &mut self.animations,
                queue: &mut self.queue,
                outbox: &mut self.outbox,
                config: &self.config,
                frame: self.frame,
                scene_name: "test",
            };
            bus.dispatch(world, &mut ctx, event)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use crate::event::EventBus;
    use crate::object::Property;
    use easel_core::Rgba8;

    #[test]
    fn test_first_animation_subscribes_a_ticker_and_last_end_removes_it() {
        // --- 1. SETUP ---
        let mut harness: Harness<()> = Harness::new();
        let mut bus: EventBus<()> = EventBus::new();
        let id = harness.objects.spawn(SceneObject::rectangle(Rgba8::RED, 4.0, 4.0));
        bus.on_event("custom.go", move |_: &mut (), ctx, _| {
            ctx.animate(id, Animation::tween(Property::X, 0.0, 10.0, 1.0))
                .map(|_| ())
                .map_err(|e| EventError::Handler {
                    event: "custom.go".into(),
                    message: e.to_string(),
                })
        });

        // --- 2. ACTION ---
        harness.dispatch(&mut bus, &mut (), &Event::new("custom.go")).unwrap();
        let listeners_while_running = bus.listeners(names::UPDATE);
        let update = Event::new(names::UPDATE).with("delta", 0.6);
        harness.dispatch(&mut bus, &mut (), &update).unwrap();
        harness.dispatch(&mut bus, &mut (), &update).unwrap();

        // --- 3. ASSERTIONS ---
        assert_eq!(listeners_while_running, 1, "Exactly one ticker per animated object");
        assert_eq!(harness.objects.get(id).unwrap().position().x, 10.0);
        assert_eq!(bus.listeners(names::UPDATE), 0, "The ticker is dropped with the last animation");
        let emitted: Vec<&str> = harness.outbox.emitted.iter().map(Event::name).collect();
        assert_eq!(emitted, vec!["Rectangle.x.animation.start", "Rectangle.x.animation.end"]);
    }

    #[test]
    fn test_destroy_purges_registrations_and_animations() {
        let mut harness: Harness<()> = Harness::new();
        let mut bus: EventBus<()> = EventBus::new();
        let id = harness.objects.spawn(SceneObject::circle(Rgba8::RED, 3.0));
        bus.on_event(Binding::new("custom.owned").owner(id), |_: &mut (), _, _| ());
        bus.on_event("custom.kill", move |_: &mut (), ctx, _| {
            ctx.animate(id, Animation::spin(1.0)).ok();
            assert!(ctx.destroy(id));
            assert!(!ctx.destroy(id), "Destroying twice is harmless");
        });

        harness.dispatch(&mut bus, &mut (), &Event::new("custom.kill")).unwrap();

        assert_eq!(bus.len(), 1, "Only the killer registration remains");
        assert!(!harness.animations.is_animating(id));
    }
}
