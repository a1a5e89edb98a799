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

//! Contracts for the collaborators the runtime consumes but does not implement.
//!
//! Any backend (a real window, a headless test harness, a recorded session)
//! can be plugged into the runtime by implementing these three traits.

use crate::error::{InputError, ProviderError, SurfaceError};
use crate::input::InputEvent;
use crate::math::{Rect, Vec2};
use crate::object::Drawable;
use crate::pixels::PixelBuffer;

/// Everything a provider needs to rasterize one object, before transforms.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// The visual payload.
    pub drawable: &'a Drawable,
    /// The untransformed width of the object's box.
    pub width: f32,
    /// The untransformed height of the object's box.
    pub height: f32,
}

/// Turns a drawable description into a pixel buffer.
///
/// Shape rasterization, text layout and image decoding live behind this trait.
/// The returned buffer's size is the object's untransformed bounding size; the
/// runtime applies flip, scale, rotation and opacity afterwards.
pub trait DrawableProvider {
    /// Renders `request` into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the drawable kind is unsupported or an
    /// asset it references cannot be loaded.
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<PixelBuffer, ProviderError>;
}

/// A per-frame source of normalized OS events.
///
/// The runtime calls [`tick`](InputSource::tick) once per update and then
/// [`get`](InputSource::get) to take that frame's batch. Live hardware input and
/// replayed logs look identical from the runtime's side.
pub trait InputSource {
    /// Advances the source to the next frame.
    fn tick(&mut self) -> Result<(), InputError>;

    /// Takes the batch of events for the current frame.
    fn get(&mut self) -> Vec<InputEvent>;

    /// The last known cursor position, if the source tracks one.
    fn mouse_position(&self) -> Option<Vec2> {
        None
    }
}

/// The OS-facing screen that receives finished frames.
pub trait PresentationSurface {
    /// Returns the `(width, height)` of the drawable area.
    fn size(&self) -> (u32, u32);

    /// Copies the `damage` regions of `frame` to the screen.
    ///
    /// An empty `damage` list means nothing changed since the previous call.
    fn present(&mut self, damage: &[Rect], frame: &PixelBuffer) -> Result<(), SurfaceError>;

    /// Sets the window caption. Surfaces without a caption ignore it.
    fn set_title(&mut self, _title: &str) {}
}
