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

//! The namespace-keyed handler registry of one scene.
//!
//! Handlers are invoked in ascending `(priority, registration order)` across
//! every namespace that hears the event. Registrations bound to an object are
//! skipped once the object is destroyed and purged on the next bulk removal
//! for that object.
//!
//! Handlers never touch the bus directly while it dispatches. Everything they
//! ask for (new registrations, removals) goes through the
//! [`EventContext`] outbox and is applied between two handler invocations.

use super::handler::{Handler, IntoResponse, RawAdapter, Response};
use super::names::resolve_alias;
use super::namespace;
use super::payload::Event;
use crate::context::EventContext;
use crate::error::EventError;
use crate::object::ObjectStore;
use easel_core::ObjectId;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// Identifies one registration on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration#{}", self.0)
    }
}

/// Hands out registration ids. Cloned into the context outbox so that
/// deferred registrations get their id immediately.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdSource(Rc<Cell<u64>>);

impl IdSource {
    pub(crate) fn next(&self) -> RegistrationId {
        let id = self.0.get();
        self.0.set(id + 1);
        RegistrationId(id)
    }
}

/// Where and how a handler is registered.
///
/// Built from a namespace (`"input.mouse"`, `"x.y.*"`, or a friendly alias
/// such as `"clicking"`), optionally refined with a priority and an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    namespace: String,
    priority: i32,
    owner: Option<ObjectId>,
}

impl Binding {
    /// Creates a binding with priority `0` and no owner.
    pub fn new(namespace: impl AsRef<str>) -> Self {
        Self {
            namespace: namespace::normalize(resolve_alias(namespace.as_ref())),
            priority: 0,
            owner: None,
        }
    }

    /// Sets the priority. Lower priorities fire first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Binds the registration to the lifetime of `owner`.
    pub fn owner(mut self, owner: ObjectId) -> Self {
        self.owner = Some(owner);
        self
    }

    // --- Getters ---

    /// The canonical namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The priority.
    pub fn priority_value(&self) -> i32 {
        self.priority
    }

    /// The owning object, if any.
    pub fn owner_id(&self) -> Option<ObjectId> {
        self.owner
    }
}

impl From<&str> for Binding {
    fn from(namespace: &str) -> Self {
        Binding::new(namespace)
    }
}

impl From<String> for Binding {
    fn from(namespace: String) -> Self {
        Binding::new(namespace)
    }
}

impl From<&String> for Binding {
    fn from(namespace: &String) -> Self {
        Binding::new(namespace)
    }
}

/// A handler shared between several registrations (named paths, or
/// registrations replayed into several scenes).
pub(crate) type SharedHandler<W> = Rc<RefCell<Box<dyn Handler<W>>>>;

pub(crate) enum HandlerSlot<W> {
    Owned(Box<dyn Handler<W>>),
    Shared(SharedHandler<W>),
    /// Drains the scene queue, dispatching every queued event in order.
    DrainQueue,
}

struct Registration<W> {
    id: RegistrationId,
    priority: i32,
    owner: Option<ObjectId>,
    slot: HandlerSlot<W>,
}

/// A change to the bus requested from inside a handler.
pub(crate) enum BusOp<W> {
    Register {
        id: RegistrationId,
        binding: Binding,
        slot: HandlerSlot<W>,
    },
    Unregister(RegistrationId),
    UnregisterOwner(ObjectId),
    ClearNamespace(String),
    ClearAll,
}

/// The result of dispatching one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// The last value returned by a handler.
    pub result: Option<Value>,
    /// Every value returned by a handler, in invocation order.
    pub results: Vec<Value>,
    /// A handler returned `false` and cut the dispatch short.
    pub stopped: bool,
    /// The number of handlers invoked.
    pub invoked: usize,
}

/// The handler registry of one scene.
pub struct EventBus<W> {
    namespaces: BTreeMap<String, Vec<Registration<W>>>,
    /// The namespace each live registration is stored under.
    index: HashMap<RegistrationId, String>,
    paths: HashMap<String, SharedHandler<W>>,
    ids: IdSource,
}

impl<W: 'static> Default for EventBus<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: 'static> EventBus<W> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self {
            namespaces: BTreeMap::new(),
            index: HashMap::new(),
            paths: HashMap::new(),
            ids: IdSource::default(),
        }
    }

    pub(crate) fn ids(&self) -> IdSource {
        self.ids.clone()
    }

    // --- Registration ---

    pub(crate) fn insert(&mut self, id: RegistrationId, binding: Binding, slot: HandlerSlot<W>) {
        let registrations = self.namespaces.entry(binding.namespace.clone()).or_default();
        // Ids grow monotonically, so equal priorities keep registration order.
        let at = registrations.partition_point(|r| (r.priority, r.id) <= (binding.priority, id));
        registrations.insert(
            at,
            Registration {
                id,
                priority: binding.priority,
                owner: binding.owner,
                slot,
            },
        );
        self.index.insert(id, binding.namespace);
    }

    pub(crate) fn register_slot(&mut self, binding: Binding, slot: HandlerSlot<W>) -> RegistrationId {
        let id = self.ids.next();
        self.insert(id, binding, slot);
        id
    }

    pub(crate) fn register_shared(&mut self, binding: Binding, handler: SharedHandler<W>) -> RegistrationId {
        self.register_slot(binding, HandlerSlot::Shared(handler))
    }

    /// Stores a handler under a name so that several registrations can use it.
    ///
    /// Defining an existing path replaces the handler behind it, like
    /// [`rebind`](Self::rebind).
    pub fn define_handler<F, R>(&mut self, path: impl Into<String>, f: F)
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &Event) -> R + 'static,
        R: IntoResponse + 'static,
    {
        let path = path.into();
        let handler: Box<dyn Handler<W>> = Box::new(RawAdapter::new(f));
        match self.paths.get(&path) {
            Some(existing) => *existing.borrow_mut() = handler,
            None => {
                self.paths.insert(path, Rc::new(RefCell::new(handler)));
            }
        }
    }

    /// Registers the handler defined at `path`.
    ///
    /// The path is resolved now. Later [`rebind`](Self::rebind) calls still
    /// reach this registration because the handler is shared.
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownHandlerPath`] if no handler is defined at `path`.
    pub fn register_path(&mut self, binding: impl Into<Binding>, path: &str) -> Result<RegistrationId, EventError> {
        let handler = self
            .paths
            .get(path)
            .cloned()
            .ok_or_else(|| EventError::UnknownHandlerPath(path.to_string()))?;
        Ok(self.register_shared(binding.into(), handler))
    }

    /// Replaces the handler behind `path` for every registration using it.
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownHandlerPath`] if no handler is defined at `path`.
    pub fn rebind<F, R>(&mut self, path: &str, f: F) -> Result<(), EventError>
    where
        F: FnMut(&mut W, &mut EventContext<'_, W>, &Event) -> R + 'static,
        R: IntoResponse + 'static,
    {
        let shared = self
            .paths
            .get(path)
            .ok_or_else(|| EventError::UnknownHandlerPath(path.to_string()))?;
        *shared.borrow_mut() = Box::new(RawAdapter::new(f));
        log::debug!("Rebound handler path '{path}'");
        Ok(())
    }

    // --- Removal ---

    /// Removes one registration.
    ///
    /// # Returns
    ///
    /// `true` if the registration existed.
    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        let Some(ns) = self.index.remove(&id) else {
            return false;
        };
        if let Some(registrations) = self.namespaces.get_mut(&ns) {
            registrations.retain(|r| r.id != id);
            if registrations.is_empty() {
                self.namespaces.remove(&ns);
            }
        }
        true
    }

    /// Removes every registration bound to `owner`, along with any whose
    /// owner is no longer alive in `objects`.
    ///
    /// # Returns
    ///
    /// The number of registrations removed.
    pub fn unregister_owner(&mut self, owner: ObjectId, objects: &ObjectStore) -> usize {
        self.remove_where(|r| r.owner.is_some_and(|o| o == owner || !objects.is_alive(o)))
    }

    /// Removes every namespace at least as specific as `prefix`.
    ///
    /// Clearing `input.mouse` removes `input.mouse` and `input.mouse.down`,
    /// but leaves `input` alone.
    pub fn clear_namespace(&mut self, prefix: &str) -> usize {
        let prefix = namespace::normalize(resolve_alias(prefix));
        let doomed: Vec<String> = self
            .namespaces
            .keys()
            .filter(|ns| namespace::is_at_least_as_specific(ns, &prefix))
            .cloned()
            .collect();
        let mut removed = 0;
        for ns in doomed {
            if let Some(registrations) = self.namespaces.remove(&ns) {
                removed += registrations.len();
                for r in registrations {
                    self.index.remove(&r.id);
                }
            }
        }
        removed
    }

    /// Removes every registration. Named handler paths stay defined.
    pub fn clear_all(&mut self) {
        self.namespaces.clear();
        self.index.clear();
    }

    fn remove_where(&mut self, mut doomed: impl FnMut(&Registration<W>) -> bool) -> usize {
        let mut removed = Vec::new();
        for registrations in self.namespaces.values_mut() {
            registrations.retain(|r| {
                if doomed(r) {
                    removed.push(r.id);
                    false
                } else {
                    true
                }
            });
        }
        self.namespaces.retain(|_, registrations| !registrations.is_empty());
        for id in &removed {
            self.index.remove(id);
        }
        removed.len()
    }

    pub(crate) fn apply(&mut self, op: BusOp<W>, objects: &ObjectStore) {
        match op {
            BusOp::Register { id, binding, slot } => self.insert(id, binding, slot),
            BusOp::Unregister(id) => {
                self.unregister(id);
            }
            BusOp::UnregisterOwner(owner) => {
                let removed = self.unregister_owner(owner, objects);
                log::trace!("Purged {removed} registration(s) of {owner}");
            }
            BusOp::ClearNamespace(prefix) => {
                self.clear_namespace(&prefix);
            }
            BusOp::ClearAll => self.clear_all(),
        }
    }

    fn apply_pending(&mut self, ctx: &mut EventContext<'_, W>) {
        for op in std::mem::take(&mut ctx.outbox.bus_ops) {
            self.apply(op, ctx.objects);
        }
    }

    // --- Queries ---

    /// The number of live registrations.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Checks whether a registration is still present.
    pub fn contains(&self, id: RegistrationId) -> bool {
        self.index.contains_key(&id)
    }

    /// The namespaces that currently hold registrations, sorted.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// The number of registrations that would hear an event named `event`.
    pub fn listeners(&self, event: &str) -> usize {
        namespace::ancestors(event)
            .filter_map(|ns| self.namespaces.get(ns))
            .map(Vec::len)
            .sum()
    }

    // --- Dispatch ---

    /// Dispatches `event` to every matching handler.
    ///
    /// Work requested by handlers through `ctx` is applied between
    /// invocations, so a registration added by a handler can hear the rest of
    /// this very dispatch if its priority comes later, and a removed one is
    /// never invoked again.
    ///
    /// # Errors
    ///
    /// The first error returned by a handler. Handlers after it are not run.
    pub fn dispatch(
        &mut self,
        world: &mut W,
        ctx: &mut EventContext<'_, W>,
        event: &Event,
    ) -> Result<DispatchOutcome, EventError> {
        let mut outcome = DispatchOutcome::default();
        let mut cursor = None;

        // The next registration is looked up after every handler because the
        // handler may have added or removed registrations.
        while let Some((priority, id)) = self.next_after(event.name(), cursor) {
            cursor = Some((priority, id));
            let Some(registration) = self.find(id) else {
                continue;
            };
            if registration.owner.is_some_and(|owner| !ctx.objects.is_alive(owner)) {
                continue;
            }

            let response = if matches!(registration.slot, HandlerSlot::DrainQueue) {
                self.drain_queue(world, ctx).map(|_| Response::Continue)
            } else {
                self.invoke(id, world, ctx, event)
            };
            outcome.invoked += 1;
            self.apply_pending(ctx);

            match response? {
                Response::Continue => {}
                Response::Stop => {
                    outcome.stopped = true;
                    break;
                }
                Response::Value(value) => {
                    outcome.result = Some(value.clone());
                    outcome.results.push(value);
                }
            }
        }

        log::trace!("Dispatched '{}' to {} handler(s)", event.name(), outcome.invoked);
        Ok(outcome)
    }

    /// Dispatches `event` and returns every value produced by its handlers.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub fn dispatch_collect(
        &mut self,
        world: &mut W,
        ctx: &mut EventContext<'_, W>,
        event: &Event,
    ) -> Result<Vec<Value>, EventError> {
        self.dispatch(world, ctx, event).map(|outcome| outcome.results)
    }

    /// The first matching registration ordered after `cursor`.
    fn next_after(
        &self,
        event: &str,
        cursor: Option<(i32, RegistrationId)>,
    ) -> Option<(i32, RegistrationId)> {
        namespace::ancestors(event)
            .filter_map(|ns| self.namespaces.get(ns))
            .flat_map(|registrations| registrations.iter())
            .map(|r| (r.priority, r.id))
            .filter(|key| cursor.map_or(true, |c| *key > c))
            .min()
    }

    fn find(&self, id: RegistrationId) -> Option<&Registration<W>> {
        let ns = self.index.get(&id)?;
        self.namespaces.get(ns)?.iter().find(|r| r.id == id)
    }

    fn find_mut(&mut self, id: RegistrationId) -> Option<&mut Registration<W>> {
        let ns = self.index.get(&id)?;
        self.namespaces.get_mut(ns)?.iter_mut().find(|r| r.id == id)
    }

    fn invoke(
        &mut self,
        id: RegistrationId,
        world: &mut W,
        ctx: &mut EventContext<'_, W>,
        event: &Event,
    ) -> Result<Response, EventError> {
        let Some(registration) = self.find_mut(id) else {
            return Ok(Response::Continue);
        };
        match &mut registration.slot {
            HandlerSlot::Owned(handler) => handler.call(world, ctx, event),
            HandlerSlot::Shared(shared) => {
                let shared = Rc::clone(shared);
                let result = match shared.try_borrow_mut() {
                    Ok(mut handler) => handler.call(world, ctx, event),
                    Err(_) => {
                        log::warn!("Skipped {id} on '{}': its handler is already running", event.name());
                        Ok(Response::Continue)
                    }
                };
                result
            }
            HandlerSlot::DrainQueue => Ok(Response::Continue),
        }
    }

    /// Dispatches queued events until the queue is empty, including events
    /// queued by the handlers of earlier ones.
    fn drain_queue(&mut self, world: &mut W, ctx: &mut EventContext<'_, W>) -> Result<(), EventError> {
        while let Some(queued) = ctx.queue.pop_front() {
            self.dispatch(world, ctx, &queued)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::Harness;
    use crate::event::Subscribe;
    use easel_core::Rgba8;
    use serde_json::json;

    type Log = Vec<String>;

    #[test]
    fn test_priorities_fire_ascending_regardless_of_order() {
        // --- 1. SETUP ---
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        for priority in [2, 0, 1] {
            bus.on_event(Binding::new("custom.ping").priority(priority), move |log: &mut Log, _, _| {
                log.push(format!("p{priority}"));
            });
        }

        // --- 2. ACTION ---
        let mut log = Log::new();
        harness.dispatch(&mut bus, &mut log, &Event::new("custom.ping")).unwrap();

        // --- 3. ASSERTIONS ---
        assert_eq!(log, vec!["p0", "p1", "p2"], "Handlers must run in ascending priority order");
    }

    #[test]
    fn test_priority_order_spans_namespaces() {
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        bus.on_event(Binding::new("input.mouse.down").priority(5), |log: &mut Log, _, _| {
            log.push("specific".into());
        });
        bus.on_event(Binding::new("input").priority(-1), |log: &mut Log, _, _| {
            log.push("broad".into());
        });

        let mut log = Log::new();
        harness
            .dispatch(&mut bus, &mut log, &Event::new("input.mouse.down.left"))
            .unwrap();

        assert_eq!(log, vec!["broad", "specific"]);
    }

    #[test]
    fn test_false_stops_dispatch_and_values_accumulate() {
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        bus.on_event(Binding::new("q").priority(0), |_: &mut Log, _, _| json!(1));
        bus.on_event(Binding::new("q").priority(1), |_: &mut Log, _, _| json!(2));
        bus.on_event(Binding::new("q").priority(2), |_: &mut Log, _, _| false);
        bus.on_event(Binding::new("q").priority(3), |log: &mut Log, _, _| {
            log.push("unreachable".into());
        });

        let mut log = Log::new();
        let outcome = harness.dispatch(&mut bus, &mut log, &Event::new("q")).unwrap();

        assert!(outcome.stopped);
        assert_eq!(outcome.result, Some(json!(2)), "The last value wins");
        assert_eq!(outcome.results, vec![json!(1), json!(2)]);
        assert!(log.is_empty(), "Handlers after a stop must not run");
    }

    #[test]
    fn test_wildcard_suffix_and_alias_are_normalized() {
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        bus.on_event("input.keyboard.*", |log: &mut Log, _, _| log.push("kb".into()));
        bus.on_event("clicking", |log: &mut Log, _, _| log.push("click".into()));

        let mut log = Log::new();
        harness
            .dispatch(&mut bus, &mut log, &Event::new("input.keyboard.down.a"))
            .unwrap();
        harness
            .dispatch(&mut bus, &mut log, &Event::new("input.mouse.down.left"))
            .unwrap();

        assert_eq!(log, vec!["kb", "click"]);
        assert_eq!(bus.namespaces().collect::<Vec<_>>(), vec!["input.keyboard", "input.mouse.down"]);
    }

    #[test]
    fn test_clear_namespace_only_removes_more_specific() {
        let mut bus: EventBus<Log> = EventBus::new();
        bus.on_event("input", |_: &mut Log, _, _| ());
        bus.on_event("input.mouse", |_: &mut Log, _, _| ());
        bus.on_event("input.mouse.down", |_: &mut Log, _, _| ());
        bus.on_event("input.mousewheel", |_: &mut Log, _, _| ());

        let removed = bus.clear_namespace("input.mouse");

        assert_eq!(removed, 2);
        assert_eq!(bus.namespaces().collect::<Vec<_>>(), vec!["input", "input.mousewheel"]);
        bus.clear_all();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_dead_owner_is_skipped_then_purged() {
        // --- 1. SETUP ---
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        let doomed = harness.objects.spawn(crate::object::SceneObject::circle(Rgba8::RED, 4.0));
        let survivor = harness.objects.spawn(crate::object::SceneObject::circle(Rgba8::BLUE, 4.0));
        bus.on_event(Binding::new("tick").owner(doomed), |log: &mut Log, _, _| log.push("doomed".into()));
        bus.on_event(Binding::new("tick").owner(survivor), |log: &mut Log, _, _| {
            log.push("survivor".into())
        });

        // --- 2. ACTION ---
        harness.objects.despawn(doomed);
        let mut log = Log::new();
        harness.dispatch(&mut bus, &mut log, &Event::new("tick")).unwrap();
        let purged = bus.unregister_owner(survivor, &harness.objects);

        // --- 3. ASSERTIONS ---
        assert_eq!(log, vec!["survivor"], "A destroyed owner's handler must not run");
        assert_eq!(purged, 2, "Bulk removal also purges dead owners");
        assert!(bus.is_empty());
    }

    #[test]
    fn test_handler_registered_during_dispatch_hears_later_priorities() {
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        bus.on_event(Binding::new("go").priority(0), |log: &mut Log, ctx, _| {
            log.push("first".into());
            ctx.on_event(Binding::new("go").priority(10), |log: &mut Log, _, _| log.push("late".into()));
        });

        let mut log = Log::new();
        harness.dispatch(&mut bus, &mut log, &Event::new("go")).unwrap();

        assert_eq!(log, vec!["first", "late"]);
        assert_eq!(bus.len(), 2);
    }

    #[test]
    fn test_paths_resolve_once_and_rebind_everywhere() {
        let mut harness = Harness::new();
        let mut bus: EventBus<Log> = EventBus::new();
        assert!(matches!(
            bus.register_path("hit", "player.take_damage"),
            Err(EventError::UnknownHandlerPath(_))
        ));

        bus.define_handler("player.take_damage", |log: &mut Log, _, _| log.push("ouch".into()));
        bus.register_path("hit", "player.take_damage").unwrap();
        bus.register_path("hit.hard", "player.take_damage").unwrap();
        bus.rebind("player.take_damage", |log: &mut Log, _, _| log.push("shield".into()))
            .unwrap();

        let mut log = Log::new();
        harness.dispatch(&mut bus, &mut log, &Event::new("hit.hard")).unwrap();

        assert_eq!(log, vec!["shield", "shield"]);
    }
}
