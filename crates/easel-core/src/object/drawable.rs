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

//! The closed set of things a scene object can look like.

use crate::color::Rgba8;
use crate::math::Vec2;
use serde::{Deserialize, Serialize};

/// The visual payload of a scene object.
///
/// The runtime never rasterizes these itself: a
/// [`DrawableProvider`](crate::platform::DrawableProvider) turns a variant plus
/// the object's size into pixels. Geometry that every variant shares (position,
/// size, rotation, scale, opacity) lives on the object, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drawable {
    /// A filled or outlined circle whose diameter is the object's width.
    Circle {
        /// The fill or outline color.
        color: Rgba8,
        /// Outline thickness, `0.0` means filled.
        border: f32,
    },
    /// An ellipse inscribed in the object's box.
    Ellipse {
        /// The fill or outline color.
        color: Rgba8,
        /// Outline thickness, `0.0` means filled.
        border: f32,
    },
    /// An axis-aligned rectangle covering the object's box.
    Rectangle {
        /// The fill or outline color.
        color: Rgba8,
        /// Outline thickness, `0.0` means filled.
        border: f32,
    },
    /// A straight segment between two points relative to the object's box.
    Line {
        /// The start point.
        start: Vec2,
        /// The end point.
        end: Vec2,
        /// The line thickness.
        thickness: f32,
        /// The line color.
        color: Rgba8,
    },
    /// A section of an ellipse outline.
    Arc {
        /// The start angle in degrees.
        start_angle: f32,
        /// The stop angle in degrees.
        stop_angle: f32,
        /// The outline thickness.
        thickness: f32,
        /// The outline color.
        color: Rgba8,
    },
    /// A run of text.
    Text {
        /// The characters to lay out.
        text: String,
        /// The font family name, `None` for the provider's default.
        font: Option<String>,
        /// The font size in points.
        size: f32,
        /// The text color.
        color: Rgba8,
    },
    /// A single emoji looked up by name.
    Emoji {
        /// The emoji name, e.g. `"dog"`.
        name: String,
    },
    /// A decoded image asset.
    Image {
        /// The asset path or URL handed to the provider.
        source: String,
    },
    /// Nothing visible, only a box (useful for groups and hit areas).
    Blank,
}

impl Drawable {
    /// Returns the variant's kind name, used to build animation event names
    /// such as `Circle.x.animation.end`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Drawable::Circle { .. } => "Circle",
            Drawable::Ellipse { .. } => "Ellipse",
            Drawable::Rectangle { .. } => "Rectangle",
            Drawable::Line { .. } => "Line",
            Drawable::Arc { .. } => "Arc",
            Drawable::Text { .. } => "Text",
            Drawable::Emoji { .. } => "Emoji",
            Drawable::Image { .. } => "Image",
            Drawable::Blank => "Blank",
        }
    }

    /// Returns `true` if the variant produces pixels.
    pub fn is_visible_kind(&self) -> bool {
        !matches!(self, Drawable::Blank)
    }

    /// The main color of the variant, when it has one.
    pub fn color(&self) -> Option<Rgba8> {
        match self {
            Drawable::Circle { color, .. }
            | Drawable::Ellipse { color, .. }
            | Drawable::Rectangle { color, .. }
            | Drawable::Line { color, .. }
            | Drawable::Arc { color, .. }
            | Drawable::Text { color, .. } => Some(*color),
            _ => None,
        }
    }

    /// Replaces the main color of the variant.
    ///
    /// # Returns
    ///
    /// `true` if the variant has a color and it changed.
    pub fn set_color(&mut self, new_color: Rgba8) -> bool {
        match self {
            Drawable::Circle { color, .. }
            | Drawable::Ellipse { color, .. }
            | Drawable::Rectangle { color, .. }
            | Drawable::Line { color, .. }
            | Drawable::Arc { color, .. }
            | Drawable::Text { color, .. } => {
                let changed = *color != new_color;
                *color = new_color;
                changed
            }
            _ => false,
        }
    }
}

/// The point of an object's box that its `(x, y)` position refers to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// The top-left corner.
    #[default]
    TopLeft,
    /// The middle of the top edge.
    TopCenter,
    /// The top-right corner.
    TopRight,
    /// The middle of the left edge.
    MiddleLeft,
    /// The center of the box.
    Center,
    /// The middle of the right edge.
    MiddleRight,
    /// The bottom-left corner.
    BottomLeft,
    /// The middle of the bottom edge.
    BottomCenter,
    /// The bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// Returns the anchor's position inside a box of the given size,
    /// measured from the box's top-left corner.
    pub fn offset_in(&self, width: f32, height: f32) -> Vec2 {
        let (fx, fy) = match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopCenter => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::MiddleLeft => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::MiddleRight => (1.0, 0.5),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::BottomCenter => (0.5, 1.0),
            Anchor::BottomRight => (1.0, 1.0),
        };
        Vec2::new(width * fx, height * fy)
    }

    /// Parses the anchor names accepted by property access (`"center"`, `"top left"`, …).
    pub fn from_name(name: &str) -> Option<Anchor> {
        let normalized = name.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Some(match normalized.as_str() {
            "topleft" | "top left" => Anchor::TopLeft,
            "midtop" | "top" | "top center" => Anchor::TopCenter,
            "topright" | "top right" => Anchor::TopRight,
            "midleft" | "left" | "middle left" => Anchor::MiddleLeft,
            "center" | "middle" => Anchor::Center,
            "midright" | "right" | "middle right" => Anchor::MiddleRight,
            "bottomleft" | "bottom left" => Anchor::BottomLeft,
            "midbottom" | "bottom" | "bottom center" => Anchor::BottomCenter,
            "bottomright" | "bottom right" => Anchor::BottomRight,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_offsets() {
        assert_eq!(Anchor::TopLeft.offset_in(10.0, 20.0), Vec2::ZERO);
        assert_eq!(Anchor::Center.offset_in(10.0, 20.0), Vec2::new(5.0, 10.0));
        assert_eq!(Anchor::BottomRight.offset_in(10.0, 20.0), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_anchor_names() {
        assert_eq!(Anchor::from_name("Top Left"), Some(Anchor::TopLeft));
        assert_eq!(Anchor::from_name("midbottom"), Some(Anchor::BottomCenter));
        assert_eq!(Anchor::from_name("nowhere"), None);
    }

    #[test]
    fn test_set_color_reports_change() {
        let mut d = Drawable::Circle {
            color: Rgba8::RED,
            border: 0.0,
        };
        assert!(!d.set_color(Rgba8::RED));
        assert!(d.set_color(Rgba8::BLUE));
        assert_eq!(d.color(), Some(Rgba8::BLUE));
        assert!(!Drawable::Blank.clone().set_color(Rgba8::BLUE));
    }
}
