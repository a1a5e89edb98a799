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

//! The per-scene animation scheduler.
//!
//! The scheduler only stores animations and applies their values. Hooking an
//! object's animations into `director.update` is done by the event context,
//! which subscribes one ticker per animated object and drops it again when
//! the object's list runs empty.

use super::{Animation, LoopMode};
use crate::error::AnimationError;
use crate::event::{Event, RegistrationId};
use crate::object::{ObjectStore, Property, PropertyValue, SceneObject};
use easel_core::ObjectId;
use std::collections::{BTreeMap, HashMap};

/// Identifies one running animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

#[derive(Debug)]
struct ActiveAnimation {
    handle: AnimationHandle,
    animation: Animation,
    progress: f64,
    /// Property values captured at start, used by relative animations.
    base: HashMap<Property, f64>,
}

impl ActiveAnimation {
    fn apply(&self, object: &mut SceneObject, progress: f64) -> Result<(), AnimationError> {
        let offset_numbers = self.animation.relative || self.animation.shift != 0.0;
        for (property, value) in self.animation.interpolation.evaluate(progress, self.animation.duration) {
            let value = match value {
                PropertyValue::Number(n) if offset_numbers => {
                    let base = if self.animation.relative {
                        self.base.get(&property).copied().unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    PropertyValue::Number(base + n + self.animation.shift)
                }
                other => other,
            };
            object.set(property, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ObjectAnimations {
    running: Vec<ActiveAnimation>,
    ticker: Option<RegistrationId>,
}

/// Holds every running animation of a scene, grouped by object.
#[derive(Debug, Default)]
pub struct AnimationScheduler {
    objects: BTreeMap<ObjectId, ObjectAnimations>,
    next_handle: u64,
}

impl AnimationScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `animation` on `id` and applies it once at progress `0`.
    ///
    /// # Returns
    ///
    /// The handle of the new animation and the start events to dispatch.
    ///
    /// # Errors
    ///
    /// * [`AnimationError::DeadObject`] if `id` is stale.
    /// * [`AnimationError::Invalid`] for a malformed animation.
    /// * [`AnimationError::PropertyConflict`] if a running animation of the
    ///   object already writes one of the properties.
    /// * [`AnimationError::Property`] if the object kind lacks a property.
    pub fn start(
        &mut self,
        objects: &mut ObjectStore,
        id: ObjectId,
        animation: Animation,
    ) -> Result<(AnimationHandle, Vec<Event>), AnimationError> {
        let object = objects
            .get_mut(id)
            .ok_or_else(|| AnimationError::DeadObject(id.to_string()))?;
        animation.validate()?;

        let properties = animation.properties();
        if let Some(entry) = self.objects.get(&id) {
            for running in &entry.running {
                let taken = running.animation.properties();
                if let Some(property) = properties.iter().find(|p| taken.contains(p)) {
                    return Err(AnimationError::PropertyConflict {
                        object: id.to_string(),
                        property: property.to_string(),
                    });
                }
            }
        }

        let mut base = HashMap::new();
        for property in &properties {
            // Also rejects properties the drawable kind does not have.
            let value = object.get(*property)?;
            if let Some(n) = value.as_number() {
                base.insert(*property, n);
            }
        }

        let handle = AnimationHandle(self.next_handle);
        self.next_handle += 1;
        let active = ActiveAnimation {
            handle,
            animation,
            progress: 0.0,
            base,
        };
        active.apply(object, 0.0)?;
        let events = lifecycle_events(object, id, &properties, "start");
        log::debug!("Started animation {handle:?} of {properties:?} on {id}");
        self.objects.entry(id).or_default().running.push(active);
        Ok((handle, events))
    }

    /// Advances every animation of `id` by `delta` seconds.
    ///
    /// # Returns
    ///
    /// The end events of the animations that finished.
    pub fn advance(
        &mut self,
        objects: &mut ObjectStore,
        id: ObjectId,
        delta: f64,
    ) -> Result<Vec<Event>, AnimationError> {
        let mut events = Vec::new();
        let (Some(entry), Some(object)) = (self.objects.get_mut(&id), objects.get_mut(id)) else {
            return Ok(events);
        };

        let mut finished = Vec::new();
        for (index, active) in entry.running.iter_mut().enumerate() {
            let duration = active.animation.duration;
            active.progress += delta;
            let looping = !matches!(active.animation.loop_mode, LoopMode::NoLoop);
            if active.progress < duration || (!looping && active.progress <= duration) {
                active.apply(object, active.progress)?;
                continue;
            }
            // The boundary is always evaluated before wrapping or finishing.
            active.apply(object, duration)?;
            let offset = match active.animation.loop_mode {
                LoopMode::NoLoop => {
                    finished.push(index);
                    continue;
                }
                LoopMode::Wrap => 0.0,
                LoopMode::OffsetWrap(offset) => offset.clamp(0.0, duration * (1.0 - f64::EPSILON)),
            };
            // Wrapped progress stays in [offset, duration).
            active.progress = offset + (active.progress - duration) % (duration - offset);
            active.apply(object, active.progress)?;
        }

        for index in finished.into_iter().rev() {
            let done = entry.running.remove(index);
            log::debug!("Animation {:?} on {id} finished", done.handle);
            events.extend(lifecycle_events(object, id, &done.animation.properties(), "end"));
        }
        Ok(events)
    }

    /// Stops one animation, leaving the properties at their current values.
    ///
    /// # Returns
    ///
    /// The end events, empty if the handle was not running on `id`.
    pub fn stop(&mut self, objects: &ObjectStore, id: ObjectId, handle: AnimationHandle) -> Vec<Event> {
        let Some(entry) = self.objects.get_mut(&id) else {
            return Vec::new();
        };
        let Some(index) = entry.running.iter().position(|a| a.handle == handle) else {
            return Vec::new();
        };
        let stopped = entry.running.remove(index);
        match objects.get(id) {
            Some(object) => lifecycle_events(object, id, &stopped.animation.properties(), "end"),
            None => Vec::new(),
        }
    }

    /// Stops every animation of `id`.
    pub fn stop_all(&mut self, objects: &ObjectStore, id: ObjectId) -> Vec<Event> {
        let Some(entry) = self.objects.get_mut(&id) else {
            return Vec::new();
        };
        let stopped: Vec<ActiveAnimation> = entry.running.drain(..).collect();
        let Some(object) = objects.get(id) else {
            return Vec::new();
        };
        stopped
            .iter()
            .flat_map(|a| lifecycle_events(object, id, &a.animation.properties(), "end"))
            .collect()
    }

    /// Drops everything known about `id` without firing events.
    ///
    /// # Returns
    ///
    /// The ticker registration of the object, if it had one.
    pub fn forget(&mut self, id: ObjectId) -> Option<RegistrationId> {
        self.objects.remove(&id).and_then(|entry| entry.ticker)
    }

    // --- Queries ---

    /// Checks whether `id` has at least one running animation.
    pub fn is_animating(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|e| !e.running.is_empty())
    }

    /// The elapsed time of a running animation.
    pub fn progress(&self, id: ObjectId, handle: AnimationHandle) -> Option<f64> {
        self.objects
            .get(&id)?
            .running
            .iter()
            .find(|a| a.handle == handle)
            .map(|a| a.progress)
    }

    /// The properties currently animated on `id`.
    pub fn animated_properties(&self, id: ObjectId) -> Vec<Property> {
        self.objects
            .get(&id)
            .map(|e| e.running.iter().flat_map(|a| a.animation.properties()).collect())
            .unwrap_or_default()
    }

    /// The number of animated objects.
    pub fn animated_objects(&self) -> usize {
        self.objects.values().filter(|e| !e.running.is_empty()).count()
    }

    // --- Ticker bookkeeping ---

    pub(crate) fn ticker(&self, id: ObjectId) -> Option<RegistrationId> {
        self.objects.get(&id).and_then(|e| e.ticker)
    }

    pub(crate) fn set_ticker(&mut self, id: ObjectId, ticker: RegistrationId) {
        self.objects.entry(id).or_default().ticker = Some(ticker);
    }

    /// Removes the bookkeeping of an object whose list ran empty.
    ///
    /// # Returns
    ///
    /// The ticker to unsubscribe, `None` while animations remain.
    pub(crate) fn release_if_idle(&mut self, id: ObjectId) -> Option<RegistrationId> {
        if self.objects.get(&id).is_some_and(|e| e.running.is_empty()) {
            self.forget(id)
        } else {
            None
        }
    }
}

/// Builds `<Kind>.<property>.animation.<phase>` events, one per property.
fn lifecycle_events(object: &SceneObject, id: ObjectId, properties: &[Property], phase: &str) -> Vec<Event> {
    let kind = object.drawable().kind_name();
    properties
        .iter()
        .map(|property| {
            Event::new(format!("{kind}.{property}.animation.{phase}"))
                .with("object", id.to_string())
                .with("property", property.name())
        })
        .collect()
}
