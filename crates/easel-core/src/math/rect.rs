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

//! Provides the integer screen rectangle used for damage tracking and collision.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// An axis-aligned rectangle in integer screen coordinates.
///
/// The rectangle covers the half-open pixel ranges `[x, x + w)` and `[y, y + h)`.
/// A rectangle with a non-positive width or height is *empty*: it covers no
/// pixels and intersects nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// The left edge.
    pub x: i32,
    /// The top edge.
    pub y: i32,
    /// The width in pixels.
    pub w: i32,
    /// The height in pixels.
    pub h: i32,
}

impl Rect {
    /// Creates a new `Rect` from its top-left corner and size.
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle anchored at the origin with the given size.
    #[inline]
    pub const fn from_size(w: i32, h: i32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Creates the smallest integer rectangle enclosing the float box `[min, max]`.
    pub fn enclosing(min: Vec2, max: Vec2) -> Self {
        let left = min.x.min(max.x).floor() as i32;
        let top = min.y.min(max.y).floor() as i32;
        let right = min.x.max(max.x).ceil() as i32;
        let bottom = min.y.max(max.y).ceil() as i32;
        Self::new(left, top, right - left, bottom - top)
    }

    /// The exclusive right edge (`x + w`).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// The exclusive bottom edge (`y + h`).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// The number of pixels covered by the rectangle, `0` when empty.
    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.w as i64 * self.h as i64
        }
    }

    /// Checks if this rectangle shares at least one pixel with `other`.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Checks whether `rects` contains any rectangle that intersects `self`.
    pub fn intersects_any(&self, rects: &[Rect]) -> bool {
        rects.iter().any(|r| self.intersects(r))
    }

    /// Checks if a point lies inside the rectangle.
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x as f32
            && point.x < self.right() as f32
            && point.y >= self.y as f32
            && point.y < self.bottom() as f32
    }

    /// Checks if `other` lies entirely inside this rectangle.
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Computes the overlapping part of two rectangles.
    ///
    /// # Returns
    ///
    /// `Some(Rect)` with the shared area, or `None` if the rectangles do not intersect.
    pub fn clip(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Returns the smallest rectangle enclosing both `self` and `other`.
    ///
    /// Empty rectangles are ignored, so the union of an empty rect with `r` is `r`.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Returns a copy of the rectangle moved by `(dx, dy)`.
    #[inline]
    pub const fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Returns a copy of the rectangle whose top-left corner is `(x, y)`.
    #[inline]
    pub const fn moved_to(&self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(&b), "Edges are exclusive, touching is not overlapping");
        assert!(a.intersects(&Rect::new(9, 9, 2, 2)));
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(2, 2, 0, 5)));
        assert_eq!(a.union(&Rect::default()), a);
    }

    #[test]
    fn test_clip_returns_shared_area() {
        let screen = Rect::from_size(100, 100);
        let partially_off = Rect::new(90, -5, 20, 20);
        assert_eq!(screen.clip(&partially_off), Some(Rect::new(90, 0, 10, 15)));
        assert!(!screen.contains_rect(&partially_off));
        assert_eq!(screen.clip(&Rect::new(200, 200, 5, 5)), None);
    }

    #[test]
    fn test_enclosing_rounds_outwards() {
        let r = Rect::enclosing(Vec2::new(0.5, 1.2), Vec2::new(10.1, 3.0));
        assert_eq!(r, Rect::new(0, 1, 11, 2));
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(Vec2::new(0.0, 0.0)));
        assert!(r.contains_point(Vec2::new(9.9, 9.9)));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
    }
}
