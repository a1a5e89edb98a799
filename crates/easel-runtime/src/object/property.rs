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

//! Name-based access to scene object properties.

use crate::error::PropertyError;
use crate::fuzzy::closest_names;
use easel_core::{Anchor, Rgba8};
use std::fmt;
use std::str::FromStr;

/// A property of a scene object that can be read, written and animated by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Horizontal position of the anchor point.
    X,
    /// Vertical position of the anchor point.
    Y,
    /// Untransformed width.
    Width,
    /// Untransformed height.
    Height,
    /// Horizontal scale factor.
    ScaleX,
    /// Vertical scale factor.
    ScaleY,
    /// Rotation in degrees, counter-clockwise.
    Angle,
    /// Opacity between `0.0` and `1.0`.
    Alpha,
    /// Whether the object is drawn.
    Visible,
    /// Horizontal mirroring.
    FlipX,
    /// Vertical mirroring.
    FlipY,
    /// The point of the box that the position refers to.
    Anchor,
    /// The layer inside the owning view.
    Layer,
    /// The main color of shapes and text.
    Color,
    /// The characters of a text object.
    Text,
    /// The font size of a text object.
    FontSize,
    /// The emoji name of an emoji object.
    Name,
    /// The asset path or URL of an image object.
    Source,
}

impl Property {
    /// Every property, in declaration order.
    pub const ALL: [Property; 18] = [
        Property::X,
        Property::Y,
        Property::Width,
        Property::Height,
        Property::ScaleX,
        Property::ScaleY,
        Property::Angle,
        Property::Alpha,
        Property::Visible,
        Property::FlipX,
        Property::FlipY,
        Property::Anchor,
        Property::Layer,
        Property::Color,
        Property::Text,
        Property::FontSize,
        Property::Name,
        Property::Source,
    ];

    /// The name used by property access and in animation event names.
    pub fn name(&self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Width => "width",
            Property::Height => "height",
            Property::ScaleX => "scale_x",
            Property::ScaleY => "scale_y",
            Property::Angle => "angle",
            Property::Alpha => "alpha",
            Property::Visible => "visible",
            Property::FlipX => "flip_x",
            Property::FlipY => "flip_y",
            Property::Anchor => "anchor",
            Property::Layer => "layer",
            Property::Color => "color",
            Property::Text => "text",
            Property::FontSize => "font_size",
            Property::Name => "name",
            Property::Source => "source",
        }
    }

    /// Returns `true` for properties holding a plain number (the ones that can be tweened).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Property::X
                | Property::Y
                | Property::Width
                | Property::Height
                | Property::ScaleX
                | Property::ScaleY
                | Property::Angle
                | Property::Alpha
                | Property::FontSize
        )
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| PropertyError::UnknownProperty {
                name: s.to_string(),
                suggestions: closest_names(s, Property::ALL.iter().map(|p| p.name())),
            })
    }
}

/// A value read from or written to a [`Property`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A number (positions, sizes, angles, …).
    Number(f64),
    /// A flag.
    Bool(bool),
    /// A string (text, emoji name, image source).
    Text(String),
    /// A color.
    Color(Rgba8),
    /// An anchor point.
    Anchor(Anchor),
    /// A layer name, `None` for "no layer".
    Layer(Option<String>),
}

impl PropertyValue {
    /// Returns the number held by the value, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the flag held by the value, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string held by the value, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<Rgba8> for PropertyValue {
    fn from(value: Rgba8) -> Self {
        PropertyValue::Color(value)
    }
}

impl From<Anchor> for PropertyValue {
    fn from(value: Anchor) -> Self {
        PropertyValue::Anchor(value)
    }
}
