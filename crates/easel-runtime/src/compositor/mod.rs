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

//! The incremental renderer of one scene.
//!
//! Each frame the compositor restores the background under every damaged
//! rectangle, draws the dynamic blits of the frame plus those retained static
//! blits that were uncovered, and presents only the damaged regions.
//!
//! Three damage lists drive this:
//! - `clear_this`: restored this frame and presented.
//! - `clear_next`: rectangles drawn by dynamic blits this frame. They become
//!   next frame's `clear_this`, which is how a moving object's old position
//!   gets wiped.
//! - `soft_clear`: rectangles of static blits redrawn because they were
//!   uncovered. They are restored and redrawn once more on the next frame,
//!   then dropped, so a static object heals into the picture without being
//!   re-cleared forever.

mod blit;

pub use self::blit::Blit;

use crate::object::ObjectStore;
use easel_core::{ObjectId, PixelBuffer, Rect, Rgba8};

/// Counters and damage of one drawn frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// The regions handed to the presentation surface.
    pub damage: Vec<Rect>,
    /// Static blits redrawn this frame.
    pub drawn_static: usize,
    /// Retained static blits.
    pub static_count: usize,
    /// Dynamic blits of this frame.
    pub dynamic_count: usize,
}

/// The retained state and damage bookkeeping of one scene's screen.
#[derive(Debug, Clone)]
pub struct Compositor {
    screen: PixelBuffer,
    background: PixelBuffer,
    /// Static blits, in the order they were promoted.
    retained: Vec<Blit>,
    dynamic: Vec<Blit>,
    clear_this: Vec<Rect>,
    clear_next: Vec<Rect>,
    soft_clear: Vec<Rect>,
    frames: u64,
}

impl Compositor {
    /// Creates a compositor whose first frame repaints the whole screen.
    pub fn new(width: u32, height: u32, background: Rgba8) -> Self {
        let background = PixelBuffer::new(width, height, background);
        Self {
            screen: background.clone(),
            clear_this: vec![background.rect()],
            background,
            retained: Vec::new(),
            dynamic: Vec::new(),
            clear_next: Vec::new(),
            soft_clear: Vec::new(),
            frames: 0,
        }
    }

    // --- Getters ---

    /// The composed screen.
    pub fn screen(&self) -> &PixelBuffer {
        &self.screen
    }

    /// The screen extent.
    pub fn screen_rect(&self) -> Rect {
        self.screen.rect()
    }

    /// The number of retained static blits.
    pub fn static_count(&self) -> usize {
        self.retained.len()
    }

    /// The number of dynamic blits queued for the next frame.
    pub fn dynamic_count(&self) -> usize {
        self.dynamic.len()
    }

    /// Checks whether `owner` currently has a retained static blit.
    pub fn is_retained(&self, owner: ObjectId) -> bool {
        self.retained.iter().any(|b| b.owner == Some(owner))
    }

    /// The rectangles scheduled for restoration on the next frame.
    pub fn pending_clears(&self) -> &[Rect] {
        &self.clear_this
    }

    /// The number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    // --- Frame building ---

    /// Replaces the background image. It is stretched to the screen if needed.
    pub fn set_background(&mut self, image: PixelBuffer) {
        let size = self.screen.rect();
        self.background = if image.rect() == size {
            image
        } else {
            image.scaled(easel_core::Vec2::new(
                size.w as f32 / image.width().max(1) as f32,
                size.h as f32 / image.height().max(1) as f32,
            ))
        };
        self.full_redraw();
    }

    /// Fills the background with one color.
    pub fn set_background_color(&mut self, color: Rgba8) {
        let size = self.screen.rect();
        self.set_background(PixelBuffer::new(size.w as u32, size.h as u32, color));
    }

    /// Schedules the whole screen for restoration.
    pub fn full_redraw(&mut self) {
        self.clear_this.push(self.screen.rect());
    }

    /// Adds a blit drawn on the next frame only.
    pub fn push_dynamic(&mut self, mut blit: Blit) {
        blit.is_static = false;
        self.dynamic.push(blit);
    }

    /// Retains a blit across frames. Its rectangle is cleared on the next
    /// frame, so it is drawn at least once.
    pub fn retain_static(&mut self, mut blit: Blit) {
        blit.is_static = true;
        if let Some(owner) = blit.owner {
            self.release_static(owner);
        }
        log::trace!("Retained static blit of {:?} at {:?}", blit.owner, blit.rect());
        self.clear_this.push(blit.rect());
        self.retained.push(blit);
    }

    /// Drops the retained blit of `owner` and schedules its area for restoration.
    ///
    /// # Returns
    ///
    /// `true` if `owner` had a retained blit.
    pub fn release_static(&mut self, owner: ObjectId) -> bool {
        let Some(index) = self.retained.iter().position(|b| b.owner == Some(owner)) else {
            return false;
        };
        let released = self.retained.remove(index);
        self.clear_this.push(released.rect());
        true
    }

    /// Releases the retained blits whose owner is dead, hidden or no longer static.
    pub fn sync_retained(&mut self, objects: &ObjectStore) {
        let clear_this = &mut self.clear_this;
        self.retained.retain(|blit| {
            let keep = blit
                .owner
                .and_then(|owner| objects.get(owner))
                .is_some_and(|object| object.is_static() && object.is_visible());
            if !keep {
                clear_this.push(blit.rect());
            }
            keep
        });
    }

    /// Drops every retained and dynamic blit and repaints the whole screen.
    pub fn reset(&mut self) {
        self.retained.clear();
        self.dynamic.clear();
        self.soft_clear.clear();
        self.clear_next.clear();
        self.clear_this = vec![self.screen.rect()];
    }

    // --- Drawing ---

    /// Composes the frame and returns the regions to present.
    pub fn draw(&mut self) -> FrameReport {
        let screen_rect = self.screen.rect();

        // Restore the background under last frame's damage.
        for rect in self.clear_this.iter().chain(self.soft_clear.iter()) {
            self.screen.copy_region(&self.background, *rect);
        }

        let dynamic = std::mem::take(&mut self.dynamic);
        let mut report = FrameReport {
            static_count: self.retained.len(),
            dynamic_count: dynamic.len(),
            ..FrameReport::default()
        };

        let mut order: Vec<&Blit> = self.retained.iter().chain(dynamic.iter()).collect();
        // Stable: equal ranks keep statics-then-dynamics insertion order.
        order.sort_by(|a, b| a.layer.cmp(&b.layer));

        let mut clear_this = std::mem::take(&mut self.clear_this);
        let mut soft_this = std::mem::take(&mut self.soft_clear);

        for blit in order {
            let rect = blit.rect();
            if !screen_rect.intersects(&rect) {
                continue;
            }
            if blit.is_static {
                if rect.intersects_any(&clear_this) {
                    self.screen.blit(&blit.image, blit.x, blit.y, blit.blend);
                    clear_this.push(rect);
                    self.soft_clear.push(rect);
                    report.drawn_static += 1;
                } else if rect.intersects_any(&soft_this) {
                    self.screen.blit(&blit.image, blit.x, blit.y, blit.blend);
                    soft_this.push(rect);
                    report.drawn_static += 1;
                }
            } else if let Some(drawn) = self.screen.blit(&blit.image, blit.x, blit.y, blit.blend) {
                self.clear_next.push(drawn);
            }
        }

        report.damage = self
            .clear_next
            .iter()
            .chain(clear_this.iter())
            .filter_map(|rect| screen_rect.clip(rect))
            .collect();
        self.clear_this = std::mem::take(&mut self.clear_next);
        self.frames += 1;

        log::trace!(
            "Frame {}: {} damage rect(s), {}/{} static drawn, {} dynamic",
            self.frames,
            report.damage.len(),
            report.drawn_static,
            report.static_count,
            report.dynamic_count
        );
        report
    }
}
