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

//! Generation-checked identifiers for scene objects and views.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a drawable object inside one scene.
///
/// It combines an arena index with a generation count. When an object is
/// destroyed its slot can be recycled for a new object, but the generation is
/// incremented, so every handle still pointing at the old object (event
/// registrations, animations, user code) becomes stale and resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    /// The index of the object's slot in the scene arena.
    pub index: u32,
    /// A generation counter that is incremented each time the index is recycled.
    pub generation: u32,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}v{}", self.index, self.generation)
    }
}

/// A unique identifier for a view (a group of objects with its own layers).
///
/// Views use the same index + generation scheme as [`ObjectId`]. Every scene
/// owns a root view created together with the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId {
    /// The index of the view's slot in the layer tree.
    pub index: u32,
    /// A generation counter that is incremented each time the index is recycled.
    pub generation: u32,
}

impl ViewId {
    /// The root view that every scene starts with.
    pub const ROOT: ViewId = ViewId {
        index: 0,
        generation: 0,
    };
}
