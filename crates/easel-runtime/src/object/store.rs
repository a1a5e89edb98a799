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

//! Arena storage and ID management for the objects of one scene.

use super::scene_object::SceneObject;
use easel_core::{ObjectId, Rect, Vec2};

/// The arena holding every live object of a scene.
///
/// Slots are recycled through a free list. Recycling bumps the slot's
/// generation, so a stale [`ObjectId`] never resolves to the newcomer. This is
/// what makes event handlers and animations bound to destroyed objects safe:
/// they are looked up by id and simply find nothing.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    /// Every slot that has ever been created, with the id currently owning it.
    objects: Vec<(ObjectId, Option<SceneObject>)>,
    /// Indices available for reuse.
    freed_objects: Vec<u32>,
}

impl ObjectStore {
    /// Creates a new, empty `ObjectStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `object` in a new or recycled slot.
    pub fn spawn(&mut self, object: SceneObject) -> ObjectId {
        if let Some(index) = self.freed_objects.pop() {
            let (id_slot, object_slot) = &mut self.objects[index as usize];
            id_slot.generation += 1;
            *object_slot = Some(object);
            *id_slot
        } else {
            let id = ObjectId {
                index: self.objects.len() as u32,
                generation: 0,
            };
            self.objects.push((id, Some(object)));
            id
        }
    }

    /// Removes an object and frees its slot.
    ///
    /// # Returns
    ///
    /// The removed object, or `None` if `id` was already stale.
    pub fn despawn(&mut self, id: ObjectId) -> Option<SceneObject> {
        let (slot_id, slot) = self.objects.get_mut(id.index as usize)?;
        if *slot_id != id {
            return None;
        }
        let removed = slot.take()?;
        self.freed_objects.push(id.index);
        Some(removed)
    }

    /// Checks if `id` refers to a live object. This is an O(1) generation check.
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the object behind `id`, if it is alive.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects
            .get(id.index as usize)
            .filter(|(slot_id, _)| *slot_id == id)
            .and_then(|(_, object)| object.as_ref())
    }

    /// Returns the object behind `id` mutably, if it is alive.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects
            .get_mut(id.index as usize)
            .filter(|(slot_id, _)| *slot_id == id)
            .and_then(|(_, object)| object.as_mut())
    }

    /// The number of live objects.
    pub fn len(&self) -> usize {
        self.objects.iter().filter(|(_, o)| o.is_some()).count()
    }

    /// Returns `true` if no object is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .filter_map(|(id, object)| object.as_ref().map(|o| (*id, o)))
    }

    /// Iterates mutably over live objects in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut SceneObject)> {
        self.objects
            .iter_mut()
            .filter_map(|(id, object)| object.as_mut().map(|o| (*id, o)))
    }

    /// The ids of all live objects, in slot order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Forces every live object off the static path.
    pub fn expire_all(&mut self) {
        for (_, object) in self.iter_mut() {
            object.expire();
        }
    }

    // --- Collision queries ---

    /// Checks whether two live objects overlap. Dead objects never collide.
    pub fn collide(&self, a: ObjectId, b: ObjectId) -> bool {
        match (self.collision_box(a), self.collision_box(b)) {
            (Some(ra), Some(rb)) => a != b && ra.intersects(&rb),
            _ => false,
        }
    }

    /// Checks whether a live object covers `point`.
    pub fn collide_point(&self, id: ObjectId, point: Vec2) -> bool {
        self.collision_box(id).is_some_and(|r| r.contains_point(point))
    }

    /// Checks whether a live object overlaps `rect`.
    pub fn collide_rect(&self, id: ObjectId, rect: Rect) -> bool {
        self.collision_box(id).is_some_and(|r| r.intersects(&rect))
    }

    /// Checks whether `a` would overlap `b` if its anchor were at `at`.
    ///
    /// `a` itself is not modified.
    pub fn would_collide(&self, a: ObjectId, at: Vec2, b: ObjectId) -> bool {
        let moved = self.get(a).and_then(|o| o.compute_collision(at));
        match (moved, self.collision_box(b)) {
            (Some(ra), Some(rb)) => a != b && ra.intersects(&rb),
            _ => false,
        }
    }

    /// Returns every live object whose collision box covers `point`, topmost slot last.
    pub fn objects_at(&self, point: Vec2) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, o)| o.collision_box().is_some_and(|r| r.contains_point(point)))
            .map(|(id, _)| id)
            .collect()
    }

    fn collision_box(&self, id: ObjectId) -> Option<Rect> {
        self.get(id).and_then(SceneObject::collision_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::Rgba8;

    #[test]
    fn test_recycled_slot_invalidates_old_id() {
        // --- 1. SETUP ---
        let mut store = ObjectStore::new();
        let first = store.spawn(SceneObject::blank(1.0, 1.0));

        // --- 2. ACTION ---
        assert!(store.despawn(first).is_some());
        let second = store.spawn(SceneObject::blank(1.0, 1.0));

        // --- 3. ASSERTIONS ---
        assert_eq!(first.index, second.index, "The slot should be reused");
        assert_ne!(first.generation, second.generation);
        assert!(!store.is_alive(first), "A stale id must not resolve");
        assert!(store.get_mut(first).is_none());
        assert!(store.despawn(first).is_none(), "Double destroy is a no-op");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_collision_queries() {
        let mut store = ObjectStore::new();
        let a = store.spawn(SceneObject::rectangle(Rgba8::RED, 10.0, 10.0));
        let b = store.spawn(SceneObject::rectangle(Rgba8::BLUE, 10.0, 10.0).at(20.0, 0.0));

        assert!(!store.collide(a, b));
        assert!(store.would_collide(a, Vec2::new(15.0, 0.0), b));
        assert_eq!(store.get(a).unwrap().position(), Vec2::ZERO, "would_collide must not move the object");
        assert!(store.collide_point(b, Vec2::new(25.0, 5.0)));
        assert!(store.collide_rect(a, Rect::new(5, 5, 2, 2)));

        store.get_mut(b).unwrap().set_x(5.0);
        assert!(store.collide(a, b), "Collision boxes are recomputed on mutation");

        store.despawn(b);
        assert!(!store.collide(a, b), "Destroyed objects never collide");
    }
}
