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

//! # Easel Runtime
//!
//! The tick-driven core of the easel 2D scene runtime.
//!
//! A [`Director`] owns a stack of [`Scene`]s. Each scene keeps its own
//! [`EventBus`], objects, [`LayerTree`], [`AnimationScheduler`] and
//! [`Compositor`]. Every tick the director feeds normalized input and
//! lifecycle events to the top scene, then draws it incrementally: objects
//! that stopped changing are promoted to retained static blits and only
//! damaged regions are presented.
//!
//! Handlers never reach for global state. They receive the scene's world
//! value and an [`EventContext`] through which every other mutation flows.

#![warn(missing_docs)]

pub mod animation;
pub mod clock;
pub mod compositor;
pub mod context;
pub mod director;
pub mod error;
pub mod event;
mod fuzzy;
pub mod input;
pub mod layer_tree;
pub mod object;
pub mod scene;

pub use animation::{Animation, AnimationHandle, AnimationScheduler, Easing, Interpolation, LoopMode};
pub use clock::{GameClock, ManualClock, SystemClock, TimeSource};
pub use compositor::{Compositor, FrameReport};
pub use context::{EventContext, RuntimeContext};
pub use director::{Director, When};
pub use error::{AnimationError, EventError, PropertyError, RuntimeError, SceneError};
pub use event::{Binding, Event, EventBus, Params, RegistrationId, Subscribe};
pub use layer_tree::{LayerRank, LayerTree};
pub use object::{ObjectStore, Property, PropertyValue, SceneObject};
pub use scene::Scene;
