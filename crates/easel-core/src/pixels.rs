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

//! CPU-side pixel storage and the handful of raster operations the compositor needs.
//!
//! Shape rasterization is *not* done here; providers hand over finished buffers.
//! This module only copies, blends and applies the per-object transforms
//! (flip, scale, rotation, opacity) to those buffers.

use crate::color::Rgba8;
use crate::math::{rotated_extent, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// How a source pixel is combined with the destination when blitting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Straight-alpha "source over destination".
    #[default]
    Alpha,
    /// Alpha-weighted additive blending.
    Additive,
    /// Source pixels replace the destination, alpha included.
    Opaque,
}

/// A rectangular image of [`Rgba8`] pixels stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl PixelBuffer {
    /// Creates a buffer of the given size where every pixel is `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba8) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Wraps existing pixel data.
    ///
    /// # Returns
    ///
    /// `None` if `pixels.len()` is not `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// The width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The buffer's extent as a rectangle at the origin.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    /// Read-only access to the pixels.
    #[inline]
    pub fn pixels(&self) -> &[Rgba8] {
        &self.pixels
    }

    /// The pixel data reinterpreted as a tightly packed `RGBA8` byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrites the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Rgba8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fills the part of `rect` that lies inside the buffer with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        let Some(area) = self.rect().clip(&rect) else {
            return;
        };
        for y in area.y..area.bottom() {
            let row = y as usize * self.width as usize;
            let start = row + area.x as usize;
            self.pixels[start..start + area.w as usize].fill(color);
        }
    }

    /// Copies the pixels under `rect` from `source` into the same location of `self`.
    ///
    /// This is how damaged screen regions are restored from the background.
    pub fn copy_region(&mut self, source: &PixelBuffer, rect: Rect) {
        let Some(area) = self.rect().clip(&rect).and_then(|r| source.rect().clip(&r)) else {
            return;
        };
        for y in area.y..area.bottom() {
            let dst = y as usize * self.width as usize + area.x as usize;
            let src = y as usize * source.width as usize + area.x as usize;
            let len = area.w as usize;
            self.pixels[dst..dst + len].copy_from_slice(&source.pixels[src..src + len]);
        }
    }

    /// Draws `source` with its top-left corner at `(x, y)`.
    ///
    /// # Returns
    ///
    /// The screen rectangle that was actually touched, `None` if nothing was drawn.
    pub fn blit(&mut self, source: &PixelBuffer, x: i32, y: i32, mode: BlendMode) -> Option<Rect> {
        let target = Rect::new(x, y, source.width as i32, source.height as i32);
        let area = self.rect().clip(&target)?;
        for dy in area.y..area.bottom() {
            for dx in area.x..area.right() {
                let src = source.pixels[((dy - y) as usize) * source.width as usize + (dx - x) as usize];
                let i = dy as usize * self.width as usize + dx as usize;
                let dst = self.pixels[i];
                self.pixels[i] = match mode {
                    BlendMode::Alpha => src.over(dst),
                    BlendMode::Additive => src.add_onto(dst),
                    BlendMode::Opaque => src,
                };
            }
        }
        Some(area)
    }

    /// Returns a mirrored copy of the buffer.
    pub fn flipped(&self, horizontal: bool, vertical: bool) -> PixelBuffer {
        if !horizontal && !vertical {
            return self.clone();
        }
        let (w, h) = (self.width as usize, self.height as usize);
        let mut out = Vec::with_capacity(self.pixels.len());
        for y in 0..h {
            let sy = if vertical { h - 1 - y } else { y };
            for x in 0..w {
                let sx = if horizontal { w - 1 - x } else { x };
                out.push(self.pixels[sy * w + sx]);
            }
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: out,
        }
    }

    /// Returns a nearest-neighbour resized copy of the buffer.
    pub fn scaled(&self, scale: Vec2) -> PixelBuffer {
        if scale.approx_eq(Vec2::ONE) {
            return self.clone();
        }
        let new_w = (self.width as f32 * scale.x.abs()).round().max(0.0) as u32;
        let new_h = (self.height as f32 * scale.y.abs()).round().max(0.0) as u32;
        let mut out = PixelBuffer::new(new_w, new_h, Rgba8::TRANSPARENT);
        for y in 0..new_h {
            let sy = ((y as f32 + 0.5) * self.height as f32 / new_h as f32) as u32;
            for x in 0..new_w {
                let sx = ((x as f32 + 0.5) * self.width as f32 / new_w as f32) as u32;
                out.pixels[(y * new_w + x) as usize] =
                    self.pixels[(sy.min(self.height - 1) * self.width + sx.min(self.width - 1)) as usize];
            }
        }
        out
    }

    /// Returns a copy rotated counter-clockwise (on screen) by `degrees`.
    ///
    /// The result is grown to the rotated bounding box and uncovered corners
    /// are transparent.
    pub fn rotated(&self, degrees: f32) -> PixelBuffer {
        let turns = degrees.rem_euclid(360.0);
        if turns.abs() < f32::EPSILON || self.pixels.is_empty() {
            return self.clone();
        }
        let (w, h) = (self.width as f32, self.height as f32);
        let extent = rotated_extent(w, h, turns);
        let (new_w, new_h) = (extent.x.ceil() as u32, extent.y.ceil() as u32);
        let (cx, cy) = (w / 2.0, h / 2.0);
        let (ncx, ncy) = (new_w as f32 / 2.0, new_h as f32 / 2.0);
        let mut out = PixelBuffer::new(new_w, new_h, Rgba8::TRANSPARENT);
        for y in 0..new_h {
            for x in 0..new_w {
                // Inverse mapping: rotate the destination sample back into source space.
                let local = Vec2::new(x as f32 + 0.5 - ncx, y as f32 + 0.5 - ncy).rotated_degrees(-turns);
                let sx = (local.x + cx).floor() as i32;
                let sy = (local.y + cy).floor() as i32;
                if let Some(color) = self.get(sx, sy) {
                    out.pixels[(y * new_w + x) as usize] = color;
                }
            }
        }
        out
    }

    /// Returns a copy whose alpha channel is multiplied by `opacity`.
    pub fn faded(&self, opacity: f32) -> PixelBuffer {
        if opacity >= 1.0 {
            return self.clone();
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|p| p.faded(opacity)).collect(),
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blit_reports_clipped_area() {
        let mut screen = PixelBuffer::new(10, 10, Rgba8::WHITE);
        let sprite = PixelBuffer::new(4, 4, Rgba8::RED);

        let touched = screen.blit(&sprite, 8, -2, BlendMode::Alpha);

        assert_eq!(touched, Some(Rect::new(8, 0, 2, 2)));
        assert_eq!(screen.get(9, 1), Some(Rgba8::RED));
        assert_eq!(screen.get(7, 1), Some(Rgba8::WHITE));
        assert_eq!(screen.blit(&sprite, 50, 50, BlendMode::Alpha), None);
    }

    #[test]
    fn test_copy_region_restores_background() {
        let background = PixelBuffer::new(10, 10, Rgba8::BLUE);
        let mut screen = PixelBuffer::new(10, 10, Rgba8::RED);

        screen.copy_region(&background, Rect::new(2, 2, 3, 3));

        assert_eq!(screen.get(2, 2), Some(Rgba8::BLUE));
        assert_eq!(screen.get(4, 4), Some(Rgba8::BLUE));
        assert_eq!(screen.get(5, 5), Some(Rgba8::RED));
    }

    #[test]
    fn test_rotation_by_quarter_turn_swaps_extent() {
        let strip = PixelBuffer::new(8, 2, Rgba8::RED);
        let rotated = strip.rotated(90.0);
        assert_eq!((rotated.width(), rotated.height()), (2, 8));
        assert!(rotated.pixels().iter().all(|p| *p == Rgba8::RED), "No transparent seam");
    }

    #[test]
    fn test_half_turn_keeps_the_size() {
        let strip = PixelBuffer::new(20, 10, Rgba8::RED);
        let rotated = strip.rotated(180.0);
        assert_eq!((rotated.width(), rotated.height()), (20, 10));
        assert_eq!((strip.rotated(270.0).width(), strip.rotated(270.0).height()), (10, 20));
    }

    #[test]
    fn test_scaled_and_flipped() {
        let mut img = PixelBuffer::new(2, 1, Rgba8::RED);
        img.set(1, 0, Rgba8::BLUE);

        let flipped = img.flipped(true, false);
        assert_eq!(flipped.get(0, 0), Some(Rgba8::BLUE));

        let big = img.scaled(Vec2::new(2.0, 3.0));
        assert_eq!((big.width(), big.height()), (4, 3));
        assert_eq!(big.get(3, 2), Some(Rgba8::BLUE));
    }

    #[test]
    fn test_bytes_view_is_rgba() {
        let img = PixelBuffer::new(1, 1, Rgba8::new(1, 2, 3, 4));
        assert_eq!(img.as_bytes(), &[1, 2, 3, 4]);
    }
}
