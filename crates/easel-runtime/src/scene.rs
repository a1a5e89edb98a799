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

//! One entry of the scene stack.
//!
//! A scene owns everything that lives and dies with it: its world value, its
//! event registrations, its objects and views, its animations, its event
//! queue and its compositor.

use crate::animation::AnimationScheduler;
use crate::compositor::{Blit, Compositor, FrameReport};
use crate::context::{DirectorCommand, EventContext, Outbox, RuntimeContext};
use crate::error::EventError;
use crate::event::{names, Binding, DispatchOutcome, Event, EventBus, HandlerSlot, Subscribe};
use crate::layer_tree::LayerTree;
use crate::object::ObjectStore;
use easel_core::error::ProviderError;
use easel_core::platform::DrawableProvider;
use easel_core::{RuntimeConfig, Vec2};
use std::collections::VecDeque;

/// A scene: an isolated set of registrations, objects and screen state.
pub struct Scene<W> {
    name: String,
    /// Unique per director, so a tick can notice the stack changed under it.
    serial: u64,
    world: W,
    bus: EventBus<W>,
    objects: ObjectStore,
    layers: LayerTree,
    animations: AnimationScheduler,
    queue: VecDeque<Event>,
    outbox: Outbox<W>,
    compositor: Compositor,
    layer_revision: u64,
}

impl<W: Default + 'static> Scene<W> {
    /// Creates a scene with its default registrations.
    pub(crate) fn new(name: impl Into<String>, serial: u64, config: &RuntimeConfig) -> Self {
        let bus = EventBus::new();
        let outbox = Outbox::new(bus.ids());
        let layers = LayerTree::new();
        let mut scene = Self {
            name: name.into(),
            serial,
            world: W::default(),
            bus,
            objects: ObjectStore::new(),
            layer_revision: layers.revision(),
            layers,
            animations: AnimationScheduler::new(),
            queue: VecDeque::new(),
            outbox,
            compositor: Compositor::new(config.width, config.height, config.background),
        };
        scene.register_defaults(config);
        scene
    }
}

impl<W: 'static> Scene<W> {
    fn register_defaults(&mut self, config: &RuntimeConfig) {
        self.bus
            .register_slot(Binding::new(names::UPDATE), HandlerSlot::DrainQueue);

        let mut redraw_on = vec![names::REDRAW, names::FOCUS_CHANGE, names::VIDEO_RESIZE, names::VIDEO_EXPOSE];
        if config.full_redraw_on_enter {
            redraw_on.push(names::SCENE_ENTER);
        }
        for namespace in redraw_on {
            self.bus
                .on_event(namespace, |_: &mut W, ctx: &mut EventContext<'_, W>, _: &Event| {
                    ctx.request_redraw()
                });
        }

        self.bus
            .on_event(names::QUIT, |_: &mut W, ctx: &mut EventContext<'_, W>, _: &Event| ctx.stop());
    }

    // --- Getters ---

    /// The scene name given to `push`/`replace`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }

    /// The scene's world value.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// The scene's world value, mutably.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// The scene's event registrations.
    pub fn bus(&self) -> &EventBus<W> {
        &self.bus
    }

    /// The scene's event registrations, mutably.
    pub fn bus_mut(&mut self) -> &mut EventBus<W> {
        &mut self.bus
    }

    /// The scene's objects.
    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    /// The scene's views and layers.
    pub fn layers(&self) -> &LayerTree {
        &self.layers
    }

    /// The scene's running animations.
    pub fn animations(&self) -> &AnimationScheduler {
        &self.animations
    }

    /// The scene's renderer state.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The events waiting for the next queue drain.
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    // --- Events ---

    /// Queues `event` for the drain that runs on `director.update`.
    pub(crate) fn enqueue(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Runs `f` with the scene split into its bus, its world and a handler
    /// context over the rest.
    fn with_parts<R>(
        &mut self,
        runtime: &RuntimeContext,
        f: impl FnOnce(&mut EventBus<W>, &mut W, &mut EventContext<'_, W>) -> R,
    ) -> R {
        let mut ctx = EventContext {
            objects: &mut self.objects,
            layers: &mut self.layers,
            animations: &mut self.animations,
            queue: &mut self.queue,
            outbox: &mut self.outbox,
            config: &runtime.config,
            frame: runtime.frame,
            scene_name: &self.name,
        };
        f(&mut self.bus, &mut self.world, &mut ctx)
    }

    /// Dispatches `event`, then every event emitted by its handlers in order.
    ///
    /// # Errors
    ///
    /// The first handler error. Emitted events still pending are dropped.
    pub(crate) fn dispatch(&mut self, runtime: &RuntimeContext, event: &Event) -> Result<DispatchOutcome, EventError> {
        let outcome = self.with_parts(runtime, |bus, world, ctx| bus.dispatch(world, ctx, event));
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                self.outbox.emitted.clear();
                return Err(error);
            }
        };
        self.flush_emitted(runtime)?;
        Ok(outcome)
    }

    fn flush_emitted(&mut self, runtime: &RuntimeContext) -> Result<(), EventError> {
        while let Some(next) = self.outbox.emitted.pop_front() {
            let result = self.with_parts(runtime, |bus, world, ctx| bus.dispatch(world, ctx, &next));
            if let Err(error) = result {
                self.outbox.emitted.clear();
                return Err(error);
            }
        }
        self.apply_redraw();
        Ok(())
    }

    fn apply_redraw(&mut self) {
        if std::mem::take(&mut self.outbox.redraw) {
            self.compositor.full_redraw();
        }
    }

    /// Runs `f` against the scene outside of any dispatch, then applies the
    /// bus changes and emitted events it requested.
    ///
    /// # Errors
    ///
    /// The first error of a handler reached through an emitted event.
    pub(crate) fn with_context<R>(
        &mut self,
        runtime: &RuntimeContext,
        f: impl FnOnce(&mut W, &mut EventContext<'_, W>) -> R,
    ) -> Result<R, EventError> {
        let value = self.with_parts(runtime, |_, world, ctx| f(world, ctx));
        for op in std::mem::take(&mut self.outbox.bus_ops) {
            self.bus.apply(op, &self.objects);
        }
        self.flush_emitted(runtime)?;
        Ok(value)
    }

    pub(crate) fn take_commands(&mut self) -> Vec<DirectorCommand> {
        std::mem::take(&mut self.outbox.commands)
    }

    // --- Drawing ---

    /// Forces every object off the static path and repaints the screen.
    pub(crate) fn expire_all(&mut self) {
        self.objects.expire_all();
        self.compositor.full_redraw();
    }

    /// Produces this frame's blits and lets the compositor draw them.
    ///
    /// Objects unchanged for `static_age` draws are promoted: their blit is
    /// retained and they skip this pass until they change again.
    ///
    /// # Errors
    ///
    /// The first [`ProviderError`] raised while rendering an object.
    pub(crate) fn draw(
        &mut self,
        provider: &mut dyn DrawableProvider,
        static_age: u32,
    ) -> Result<FrameReport, ProviderError> {
        if self.layers.revision() != self.layer_revision {
            log::debug!("Layer tree of scene '{}' changed, expiring every object", self.name);
            self.objects.expire_all();
            self.layer_revision = self.layers.revision();
        }
        self.compositor.sync_retained(&self.objects);

        for (id, object) in self.objects.iter_mut() {
            if object.is_static() || !object.is_visible() || !object.drawable().is_visible_kind() {
                continue;
            }
            let image = object.transformed_image(provider)?;
            let extent = Vec2::new(image.width() as f32, image.height() as f32);
            let top_left = object.top_left_for(object.position(), extent);
            let mut blit = Blit::new(
                image,
                top_left.x.round() as i32,
                top_left.y.round() as i32,
                self.layers.rank(object.view(), object.layer()),
            );
            blit.owner = Some(id);
            blit.blend = object.blend();

            if object.render.age >= static_age {
                object.render.is_static = true;
                log::debug!("Promoted {id} to static in scene '{}'", self.name);
                self.compositor.retain_static(blit);
            } else {
                object.render.age += 1;
                self.compositor.push_dynamic(blit);
            }
        }

        Ok(self.compositor.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SceneObject;
    use easel_core::platform::RenderRequest;
    use easel_core::{PixelBuffer, Rgba8};

    struct Fill;

    impl DrawableProvider for Fill {
        fn render(&mut self, request: &RenderRequest<'_>) -> Result<PixelBuffer, ProviderError> {
            let color = request.drawable.color().unwrap_or(Rgba8::BLACK);
            Ok(PixelBuffer::new(
                request.width.round() as u32,
                request.height.round() as u32,
                color,
            ))
        }
    }

    fn scene() -> (Scene<u32>, RuntimeContext) {
        let config = RuntimeConfig {
            width: 40,
            height: 40,
            ..RuntimeConfig::default()
        };
        (Scene::new("test", 1, &config), RuntimeContext::new(config))
    }

    #[test]
    fn test_default_registrations() {
        let (scene, _) = scene();
        assert_eq!(scene.bus().listeners(names::UPDATE), 1, "The queue drain");
        assert_eq!(scene.bus().listeners(names::QUIT), 1);
        assert_eq!(scene.bus().listeners(names::SCENE_ENTER), 1);
    }

    #[test]
    fn test_quit_requests_stop() {
        let (mut scene, runtime) = scene();
        scene.dispatch(&runtime, &Event::new(names::QUIT)).unwrap();
        assert_eq!(scene.take_commands(), vec![DirectorCommand::Stop]);
    }

    #[test]
    fn test_emitted_events_follow_the_dispatch() {
        // --- 1. SETUP ---
        let (mut scene, runtime) = scene();
        scene.bus_mut().on_event("custom.first", |world: &mut u32, ctx, _| {
            *world = *world * 10 + 1;
            ctx.emit(Event::new("custom.second"));
        });
        scene.bus_mut().on_event("custom.first", |world: &mut u32, _, _| {
            *world = *world * 10 + 2;
        });
        scene.bus_mut().on_event("custom.second", |world: &mut u32, _, _| {
            *world = *world * 10 + 3;
        });

        // --- 2. ACTION ---
        scene.dispatch(&runtime, &Event::new("custom.first")).unwrap();

        // --- 3. ASSERTIONS ---
        assert_eq!(*scene.world(), 123, "Emitted events wait for the current dispatch");
    }

    #[test]
    fn test_object_is_promoted_after_static_age_draws() {
        // --- 1. SETUP ---
        let (mut scene, runtime) = scene();
        let id = scene
            .with_context(&runtime, |_, ctx| {
                ctx.spawn(SceneObject::rectangle(Rgba8::RED, 5.0, 5.0).at(10.0, 10.0))
            })
            .unwrap();

        // --- 2. ACTION ---
        let mut dynamic = Vec::new();
        for _ in 0..5 {
            dynamic.push(scene.draw(&mut Fill, 4).unwrap().dynamic_count);
        }

        // --- 3. ASSERTIONS ---
        assert_eq!(dynamic, vec![1, 1, 1, 1, 0], "Drawn statically on the fifth draw");
        assert!(scene.compositor().is_retained(id));
        assert_eq!(scene.compositor().screen().get(12, 12), Some(Rgba8::RED));
    }

    #[test]
    fn test_layer_change_expires_objects() {
        let (mut scene, runtime) = scene();
        let id = scene
            .with_context(&runtime, |_, ctx| ctx.spawn(SceneObject::rectangle(Rgba8::RED, 5.0, 5.0)))
            .unwrap();
        for _ in 0..5 {
            scene.draw(&mut Fill, 4).unwrap();
        }
        assert!(scene.objects().get(id).unwrap().is_static());

        scene
            .with_context(&runtime, |_, ctx| {
                ctx.layers_mut()
                    .set_layers(easel_core::ViewId::ROOT, ["back", "front"])
                    .unwrap();
            })
            .unwrap();
        let report = scene.draw(&mut Fill, 4).unwrap();

        assert_eq!(report.dynamic_count, 1, "The object re-enters the dynamic path");
        assert!(!scene.compositor().is_retained(id));
    }
}
