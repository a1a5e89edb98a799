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

//! A presentation surface that keeps frames in memory.

use easel_core::error::SurfaceError;
use easel_core::platform::PresentationSurface;
use easel_core::{PixelBuffer, Rect, Rgba8};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// One call to [`PresentationSurface::present`].
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    /// The regions that were copied.
    pub damage: Vec<Rect>,
    /// Pixels copied by this frame.
    pub copied_pixels: i64,
}

#[derive(Debug)]
struct LogState {
    screen: PixelBuffer,
    frames: Vec<PresentedFrame>,
    titles: Vec<String>,
    closed: bool,
}

/// A shared view on what a [`HeadlessSurface`] received.
///
/// The director owns the surface, so tests keep a clone of its log instead.
#[derive(Debug, Clone)]
pub struct FrameLog {
    state: Rc<RefCell<LogState>>,
}

impl FrameLog {
    /// Every presented frame, oldest first.
    pub fn frames(&self) -> Vec<PresentedFrame> {
        self.state.borrow().frames.clone()
    }

    /// The number of presented frames.
    pub fn frame_count(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// The damage list of the most recent frame.
    pub fn last_damage(&self) -> Option<Vec<Rect>> {
        self.state.borrow().frames.last().map(|frame| frame.damage.clone())
    }

    /// The screen as the damage copies left it.
    pub fn screen(&self) -> Ref<'_, PixelBuffer> {
        Ref::map(self.state.borrow(), |state| &state.screen)
    }

    /// The color of one screen pixel.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        self.state.borrow().screen.get(x, y)
    }

    /// The most recent window caption.
    pub fn title(&self) -> Option<String> {
        self.state.borrow().titles.last().cloned()
    }

    /// Every caption set so far.
    pub fn titles(&self) -> Vec<String> {
        self.state.borrow().titles.clone()
    }

    /// Makes every later presentation fail with [`SurfaceError::Closed`].
    pub fn close(&self) {
        self.state.borrow_mut().closed = true;
    }
}

/// A [`PresentationSurface`] copying damaged regions into an in-memory screen.
///
/// Only the damage is copied, so a wrong damage list shows up as stale pixels.
#[derive(Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    log: FrameLog,
}

impl HeadlessSurface {
    /// Creates a black surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let state = LogState {
            screen: PixelBuffer::new(width, height, Rgba8::BLACK),
            frames: Vec::new(),
            titles: Vec::new(),
            closed: false,
        };
        Self {
            width,
            height,
            log: FrameLog {
                state: Rc::new(RefCell::new(state)),
            },
        }
    }

    /// A handle on the frames and captions this surface receives.
    pub fn log(&self) -> FrameLog {
        self.log.clone()
    }
}

impl PresentationSurface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self, damage: &[Rect], frame: &PixelBuffer) -> Result<(), SurfaceError> {
        let mut state = self.log.state.borrow_mut();
        if state.closed {
            return Err(SurfaceError::Closed);
        }
        if (frame.width(), frame.height()) != (self.width, self.height) {
            return Err(SurfaceError::SizeMismatch {
                frame: (frame.width(), frame.height()),
                surface: (self.width, self.height),
            });
        }

        let bounds = state.screen.rect();
        let mut copied_pixels = 0;
        for rect in damage {
            if let Some(clipped) = rect.clip(&bounds) {
                state.screen.copy_region(frame, clipped);
                copied_pixels += clipped.area();
            }
        }
        log::trace!("Presented {} region(s), {copied_pixels} pixel(s)", damage.len());
        state.frames.push(PresentedFrame {
            damage: damage.to_vec(),
            copied_pixels,
        });
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.log.state.borrow_mut().titles.push(title.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_damaged_regions_reach_the_screen() {
        // --- 1. SETUP ---
        let mut surface = HeadlessSurface::new(8, 8);
        let log = surface.log();
        let frame = PixelBuffer::new(8, 8, Rgba8::RED);

        // --- 2. ACTION ---
        surface.present(&[Rect::new(0, 0, 2, 2)], &frame).unwrap();
        surface.present(&[], &frame).unwrap();

        // --- 3. ASSERTIONS ---
        assert_eq!(log.pixel(1, 1), Some(Rgba8::RED));
        assert_eq!(log.pixel(5, 5), Some(Rgba8::BLACK), "Undamaged pixels are untouched");
        assert_eq!(log.frame_count(), 2);
        assert_eq!(log.frames()[0].copied_pixels, 4);
        assert_eq!(log.last_damage(), Some(Vec::new()));
    }

    #[test]
    fn test_mismatched_and_closed_presentations_fail() {
        let mut surface = HeadlessSurface::new(4, 4);
        let log = surface.log();

        let wrong = PixelBuffer::new(2, 2, Rgba8::RED);
        assert!(matches!(
            surface.present(&[], &wrong),
            Err(SurfaceError::SizeMismatch { .. })
        ));

        log.close();
        let right = PixelBuffer::new(4, 4, Rgba8::RED);
        assert!(matches!(surface.present(&[], &right), Err(SurfaceError::Closed)));
        assert_eq!(log.frame_count(), 0);
    }

    #[test]
    fn test_titles_are_recorded() {
        let mut surface = HeadlessSurface::new(1, 1);
        surface.set_title("one");
        surface.set_title("two");
        assert_eq!(surface.log().title().as_deref(), Some("two"));
        assert_eq!(surface.log().titles().len(), 2);
    }
}
