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

//! The owner of the scene stack and of the tick loop.
//!
//! The director feeds normalized input and lifecycle events to the top scene,
//! carries out the scene changes its handlers request, draws the top scene
//! and hands the damaged regions to the presentation surface.
//!
//! Registrations made through [`Director::when`] outlive scenes: they are
//! remembered and registered again in every new scene they target.

use crate::clock::{GameClock, SystemClock, TimeSource};
use crate::compositor::FrameReport;
use crate::context::{DirectorCommand, EventContext, RuntimeContext};
use crate::error::{EventError, RuntimeError, SceneError};
use crate::event::{
    names, ArgSpec, Binding, ClickAdapter, ClickEvent, ConditionAdapter, DispatchOutcome, EnterAdapter, Event,
    Handler, IntoResponse, KeyAdapter, KeyEvent, MotionAdapter, MotionEvent, Params, RawAdapter, SharedHandler,
    StartAdapter, UpdateAdapter, ArgsAdapter,
};
use crate::input;
use crate::scene::Scene;
use easel_core::input::InputEvent;
use easel_core::platform::{DrawableProvider, InputSource, PresentationSurface};
use easel_core::RuntimeConfig;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A registration kept by the director and replayed into new scenes.
struct PendingRegistration<W> {
    /// Scene names the registration applies to. `None` means every scene.
    targets: Option<Vec<String>>,
    binding: Binding,
    handler: SharedHandler<W>,
}

impl<W> PendingRegistration<W> {
    fn applies_to(&self, scene: &str) -> bool {
        self.targets
            .as_ref()
            .map_or(true, |targets| targets.iter().any(|t| t == scene))
    }
}

/// Runs a stack of scenes whose world values are of type `W`.
pub struct Director<W> {
    runtime: RuntimeContext,
    scenes: Vec<Scene<W>>,
    pending: Vec<PendingRegistration<W>>,
    commands: VecDeque<DirectorCommand>,
    provider: Box<dyn DrawableProvider>,
    input: Box<dyn InputSource>,
    surface: Box<dyn PresentationSurface>,
    next_serial: u64,
    paused: bool,
    stopped: bool,
    /// Measured `(ups, fps)`, refreshed by the real-time loop.
    rates: (f64, f64),
    caption: String,
    last_frame: FrameReport,
}

impl<W: Default + 'static> Director<W> {
    /// Creates a director with an empty scene stack.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Config`] if `config` fails validation.
    pub fn new(
        config: RuntimeConfig,
        provider: impl DrawableProvider + 'static,
        input: impl InputSource + 'static,
        surface: impl PresentationSurface + 'static,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let mut surface: Box<dyn PresentationSurface> = Box::new(surface);
        if surface.size() != (config.width, config.height) {
            log::warn!(
                "Surface is {:?} but scenes are {}x{}; damage is clipped to the scene size",
                surface.size(),
                config.width,
                config.height
            );
        }
        if let Some(title) = &config.title {
            surface.set_title(title);
        }
        log::info!("Director created ({}x{})", config.width, config.height);
        Ok(Self {
            runtime: RuntimeContext::new(config),
            scenes: Vec::new(),
            pending: Vec::new(),
            commands: VecDeque::new(),
            provider: Box::new(provider),
            input: Box::new(input),
            surface,
            next_serial: 0,
            paused: false,
            stopped: false,
            rates: (0.0, 0.0),
            caption: String::new(),
            last_frame: FrameReport::default(),
        })
    }

    // --- Getters ---

    /// The state shared with every scene.
    pub fn runtime(&self) -> &RuntimeContext {
        &self.runtime
    }

    /// The number of update ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.runtime.frame.tick
    }

    /// Returns `true` while updates are suspended.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns `true` once the director has stopped for good.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The scene names, bottom of the stack first.
    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.iter().map(Scene::name).collect()
    }

    /// The top scene.
    pub fn current_scene(&self) -> Option<&Scene<W>> {
        self.scenes.last()
    }

    /// The top scene, mutably.
    pub fn current_scene_mut(&mut self) -> Option<&mut Scene<W>> {
        self.scenes.last_mut()
    }

    /// The report of the last drawn frame.
    pub fn last_frame(&self) -> &FrameReport {
        &self.last_frame
    }

    // --- Control ---

    /// Suspends or resumes updates.
    ///
    /// Paused ticks still drain input and advance [`tick_count`](Self::tick_count),
    /// but only a quit request is acted on and no update phase runs.
    pub fn pause(&mut self, paused: bool) {
        if self.paused != paused {
            log::info!("Director {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Stops the director. Every later step reports the end of the game.
    pub fn stop(&mut self) {
        if !self.stopped {
            log::info!("Director stopped after {} tick(s)", self.runtime.frame.tick);
        }
        self.stopped = true;
        self.commands.clear();
    }

    fn ensure_not_stopped(&self) -> Result<(), RuntimeError> {
        if self.stopped {
            Err(RuntimeError::GameEnded)
        } else {
            Ok(())
        }
    }

    fn ensure_running(&self) -> Result<(), RuntimeError> {
        if self.stopped || self.scenes.is_empty() {
            Err(RuntimeError::GameEnded)
        } else {
            Ok(())
        }
    }

    fn top_serial(&self) -> Option<u64> {
        self.scenes.last().map(Scene::serial)
    }

    /// Whether the scene a tick started with is no longer the top.
    fn interrupted(&self, serial: Option<u64>) -> bool {
        self.stopped || self.top_serial() != serial
    }

    // --- Registration ---

    /// Starts a registration from a friendly specification such as
    /// `"clicking"`, `"input.keyboard.down.space"` or `"updating: level2"`.
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownEvent`] with suggestions if the event part is not
    /// a known event, alias or prefix of one.
    pub fn when(&mut self, spec: &str) -> Result<When<'_, W>, EventError> {
        let parsed = names::parse_spec(spec)?;
        let targets = (!parsed.targets.is_empty()).then_some(parsed.targets);
        Ok(When {
            director: self,
            binding: Binding::new(parsed.namespace),
            targets,
        })
    }

    /// Runs `handler` on every update for which `predicate` holds, in every scene.
    pub fn when_condition<P, F, R>(&mut self, predicate: P, handler: F)
    where
        P: FnMut(&W) -> bool + 'static,
        F: FnMut(&mut W, &mut EventContext<'_, W>, f64) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register_pending(
            None,
            Binding::new(names::UPDATE),
            Box::new(ConditionAdapter::new(predicate, handler)),
        );
    }

    fn register_pending(&mut self, targets: Option<Vec<String>>, binding: Binding, handler: Box<dyn Handler<W>>) {
        let entry = PendingRegistration {
            targets,
            binding,
            handler: Rc::new(RefCell::new(handler)),
        };
        if let Some(top) = self.scenes.last_mut() {
            if entry.applies_to(top.name()) {
                top.bus_mut()
                    .register_shared(entry.binding.clone(), Rc::clone(&entry.handler));
            }
        }
        self.pending.push(entry);
    }

    // --- Scene stack ---

    /// Pushes a new scene on top of the current one.
    ///
    /// The current top receives `director.scene.exit` and stays below. The
    /// new scene receives `director.scene.start`, then
    /// `director.scene.enter`, both carrying `params`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::GameEnded`] once stopped, or the first handler error.
    pub fn push(&mut self, name: impl Into<String>, params: Params) -> Result<(), RuntimeError> {
        self.push_scene(name.into(), params)?;
        self.flush_commands()
    }

    /// Replaces the top scene, which receives `director.scene.exit` and is
    /// then discarded.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn replace(&mut self, name: impl Into<String>, params: Params) -> Result<(), RuntimeError> {
        self.replace_scene(name.into(), params)?;
        self.flush_commands()
    }

    /// Pops the top scene. The scene below receives `director.scene.enter`
    /// with `params`; an emptied stack stops the director.
    ///
    /// # Errors
    ///
    /// See [`push`](Self::push).
    pub fn pop(&mut self, params: Params) -> Result<(), RuntimeError> {
        self.pop_scene(params)?;
        self.flush_commands()
    }

    fn push_scene(&mut self, name: String, params: Params) -> Result<(), RuntimeError> {
        self.ensure_not_stopped()?;
        if !self.scenes.is_empty() {
            self.dispatch_top(&Event::with_params(names::SCENE_EXIT, params.clone()))?;
        }
        log::info!("Pushing scene '{name}'");
        self.open_scene(name, params)
    }

    fn replace_scene(&mut self, name: String, params: Params) -> Result<(), RuntimeError> {
        self.ensure_not_stopped()?;
        if !self.scenes.is_empty() {
            self.dispatch_top(&Event::with_params(names::SCENE_EXIT, params.clone()))?;
            if let Some(old) = self.scenes.pop() {
                log::info!("Replacing scene '{}' with '{name}'", old.name());
            }
        } else {
            log::info!("Pushing scene '{name}'");
        }
        self.open_scene(name, params)
    }

    fn pop_scene(&mut self, params: Params) -> Result<(), RuntimeError> {
        self.ensure_not_stopped()?;
        if self.scenes.is_empty() {
            log::info!("Pop on an empty scene stack");
            self.stop();
            return Ok(());
        }
        self.dispatch_top(&Event::with_params(names::SCENE_EXIT, params.clone()))?;
        if let Some(old) = self.scenes.pop() {
            log::info!("Popped scene '{}'", old.name());
        }
        match self.scenes.last_mut() {
            None => self.stop(),
            Some(top) => {
                top.expire_all();
                self.dispatch_top(&Event::with_params(names::SCENE_ENTER, params))?;
            }
        }
        Ok(())
    }

    fn open_scene(&mut self, name: String, params: Params) -> Result<(), RuntimeError> {
        self.next_serial += 1;
        let mut scene = Scene::new(name.clone(), self.next_serial, &self.runtime.config);
        let mut replayed = 0;
        for entry in self.pending.iter().filter(|entry| entry.applies_to(&name)) {
            scene
                .bus_mut()
                .register_shared(entry.binding.clone(), Rc::clone(&entry.handler));
            replayed += 1;
        }
        if replayed > 0 {
            log::debug!("Replayed {replayed} registration(s) into scene '{}'", scene.name());
        }
        self.scenes.push(scene);

        self.dispatch_top(&Event::with_params(names::SCENE_START, params.clone()))?;
        self.dispatch_top(&Event::with_params(names::SCENE_ENTER, params))?;
        Ok(())
    }

    /// Carries out the scene changes requested by handlers, in order.
    fn flush_commands(&mut self) -> Result<(), RuntimeError> {
        while let Some(command) = self.commands.pop_front() {
            match command {
                DirectorCommand::Push(name, params) => self.push_scene(name, params)?,
                DirectorCommand::Replace(name, params) => self.replace_scene(name, params)?,
                DirectorCommand::Pop(params) => self.pop_scene(params)?,
                DirectorCommand::Stop => self.stop(),
                DirectorCommand::Pause(paused) => self.pause(paused),
            }
        }
        Ok(())
    }

    // --- Dispatch ---

    fn dispatch_top(&mut self, event: &Event) -> Result<Option<DispatchOutcome>, RuntimeError> {
        let Some(scene) = self.scenes.last_mut() else {
            return Ok(None);
        };
        let outcome = scene.dispatch(&self.runtime, event);
        self.commands.extend(scene.take_commands());
        Ok(Some(outcome?))
    }

    /// Dispatches `event` to the top scene and applies the scene changes it
    /// caused.
    ///
    /// # Returns
    ///
    /// The dispatch outcome, `None` when no scene is running.
    ///
    /// # Errors
    ///
    /// The first handler error.
    pub fn dispatch(&mut self, event: &Event) -> Result<Option<DispatchOutcome>, RuntimeError> {
        let outcome = self.dispatch_top(event)?;
        self.flush_commands()?;
        Ok(outcome)
    }

    /// Dispatches `event` and returns every value its handlers produced.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn dispatch_collect(&mut self, event: &Event) -> Result<Vec<Value>, RuntimeError> {
        Ok(self.dispatch(event)?.map(|outcome| outcome.results).unwrap_or_default())
    }

    /// Runs `f` against the top scene, as a handler would.
    ///
    /// Registrations, emitted events and scene changes requested through the
    /// context are applied before this returns.
    ///
    /// # Errors
    ///
    /// [`SceneError::NoActiveScene`] on an empty stack, or the first handler
    /// error raised by emitted events.
    pub fn with_scene<R>(&mut self, f: impl FnOnce(&mut W, &mut EventContext<'_, W>) -> R) -> Result<R, RuntimeError> {
        let Some(scene) = self.scenes.last_mut() else {
            return Err(SceneError::NoActiveScene.into());
        };
        let value = scene.with_context(&self.runtime, f);
        self.commands.extend(scene.take_commands());
        let value = value?;
        self.flush_commands()?;
        Ok(value)
    }

    // --- Tick loop ---

    /// Runs one update with `delta` seconds, then draws one frame.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::GameEnded`] once the director stopped or has no scene,
    /// otherwise the first handler, provider or input error.
    pub fn step(&mut self, delta: f64) -> Result<FrameReport, RuntimeError> {
        self.update(delta)?;
        self.render()
    }

    /// Takes this tick's input and runs `pre_update`, `update` and
    /// `post_update`.
    ///
    /// Normalized input joins the top scene's queue, which is drained on
    /// `director.update`, so input handlers run after `pre_update` and before
    /// the other update handlers. While paused, input is taken but dropped,
    /// except for quit requests. A scene change requested during the tick
    /// ends it early.
    ///
    /// # Errors
    ///
    /// See [`step`](Self::step).
    pub fn update(&mut self, delta: f64) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        let serial = self.top_serial();

        self.input.tick()?;
        let batch = self.input.get();
        if let Some(position) = self.input.mouse_position() {
            self.runtime.frame.mouse = position;
        }
        if self.paused {
            if batch.contains(&InputEvent::Quit) {
                self.stop();
            }
            self.runtime.frame.tick += 1;
            return self.ensure_running();
        }
        for raw in batch {
            if let Some(position) = input::pointer_position(&raw) {
                self.runtime.frame.mouse = position;
            }
            if let Some(scene) = self.scenes.last_mut() {
                scene.enqueue(input::to_event(&raw));
            }
        }

        for phase in [names::PRE_UPDATE, names::UPDATE, names::POST_UPDATE] {
            if phase == names::POST_UPDATE {
                self.runtime.frame.tick += 1;
            }
            self.dispatch(&Event::new(phase).with("delta", delta))?;
            if self.interrupted(serial) {
                return self.ensure_running();
            }
        }
        Ok(())
    }

    /// Runs `pre_render` and `render`, draws the top scene, presents the
    /// damage and runs `post_render`.
    ///
    /// Presentation failures are logged and do not stop the loop.
    ///
    /// # Errors
    ///
    /// See [`step`](Self::step).
    pub fn render(&mut self) -> Result<FrameReport, RuntimeError> {
        self.ensure_running()?;
        let serial = self.top_serial();
        for phase in [names::PRE_RENDER, names::RENDER] {
            self.dispatch(&Event::new(phase))?;
            if self.interrupted(serial) {
                self.ensure_running()?;
                return Ok(FrameReport::default());
            }
        }

        let static_age = self.runtime.config.static_age_threshold;
        let Some(scene) = self.scenes.last_mut() else {
            return Err(RuntimeError::GameEnded);
        };
        let report = scene.draw(self.provider.as_mut(), static_age)?;
        if let Err(error) = self.surface.present(&report.damage, scene.compositor().screen()) {
            log::error!("Presenting the frame of scene '{}' failed: {error}", scene.name());
        }

        self.dispatch(&Event::new(names::POST_RENDER))?;
        self.refresh_caption(&report);
        self.last_frame = report.clone();
        Ok(report)
    }

    fn refresh_caption(&mut self, report: &FrameReport) {
        if self.runtime.config.title.is_some() {
            return;
        }
        let caption = format!(
            "{} / {} static, {} dynamic. {:.0} ups, {:.0} fps",
            report.drawn_static, report.static_count, report.dynamic_count, self.rates.0, self.rates.1
        );
        if caption != self.caption {
            self.surface.set_title(&caption);
            self.caption = caption;
        }
    }

    /// Runs the real-time loop on the wall clock until the game ends.
    ///
    /// # Errors
    ///
    /// Any error other than the end of the game.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let clock = GameClock::from_config(SystemClock::new(), &self.runtime.config);
        self.run_with(clock)
    }

    /// Runs the real-time loop on `clock` until the game ends.
    ///
    /// # Errors
    ///
    /// Any error other than the end of the game.
    pub fn run_with<T: TimeSource>(&mut self, mut clock: GameClock<T>) -> Result<(), RuntimeError> {
        log::info!(
            "Director running at {} ups / {} fps",
            self.runtime.config.max_ups,
            self.runtime.config.max_fps
        );
        loop {
            match self.run_frame(&mut clock) {
                Ok(()) => clock.wait(),
                Err(error) if error.is_game_ended() => {
                    log::info!("Game ended after {} tick(s)", self.runtime.frame.tick);
                    return Ok(());
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn run_frame<T: TimeSource>(&mut self, clock: &mut GameClock<T>) -> Result<(), RuntimeError> {
        let budget = clock.begin_frame();
        for _ in 0..budget.updates {
            self.update(clock.update_delta())?;
            clock.record_update();
        }
        self.rates = (clock.ups(), clock.fps());
        if budget.render {
            self.render()?;
            clock.record_render();
        }
        self.ensure_running()
    }
}

/// A registration being built by [`Director::when`].
///
/// The handler family is picked by the terminating method. The handler is
/// registered in the top scene when it matches and remembered for every
/// matching scene created later.
pub struct When<'d, W> {
    director: &'d mut Director<W>,
    binding: Binding,
    targets: Option<Vec<String>>,
}

impl<W: Default + 'static> When<'_, W> {
    /// Sets the dispatch priority. Lower values run first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.binding = self.binding.priority(priority);
        self
    }

    fn register(self, handler: Box<dyn Handler<W>>) {
        self.director.register_pending(self.targets, self.binding, handler);
    }

    /// Registers a handler receiving the whole event.
    pub fn call<F, R>(self, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &Event) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(RawAdapter::new(f)));
    }

    /// Registers an update handler receiving `delta`.
    pub fn update<F, R>(self, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, f64) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(UpdateAdapter::new(f)));
    }

    /// Registers a mouse button handler.
    pub fn click<F, R>(self, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, ClickEvent) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(ClickAdapter::new(f)));
    }

    /// Registers a keyboard handler.
    pub fn key<F, R>(self, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &KeyEvent) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(KeyAdapter::new(f)));
    }

    /// Registers a mouse motion handler.
    pub fn motion<F, R>(self, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, MotionEvent) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(MotionAdapter::new(f)));
    }

    /// Registers a scene start handler. A returned world replaces the scene's.
    pub fn start<F, R>(self, f: F)
    where
        F: FnMut(&mut EventContext<'_, W>, &Params) -> R + 'static,
        R: Into<Option<W>> + 'static,
    {
        self.register(Box::new(StartAdapter::new(f)));
    }

    /// Registers a scene enter handler receiving the scene parameters.
    pub fn enter<F, R>(self, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &Params) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(EnterAdapter::new(f)));
    }

    /// Registers a handler receiving the listed event attributes.
    pub fn args<F, R>(self, specs: Vec<ArgSpec>, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &[Value]) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Box::new(ArgsAdapter::new(specs, f)));
    }
}
