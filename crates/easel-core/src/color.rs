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

//! Defines the `Rgba8` color type stored in pixel buffers.

use serde::{Deserialize, Serialize};

/// Represents a color as four 8-bit **sRGB** channels with straight alpha.
///
/// `#[repr(C)]` and `Pod` allow a slice of colors to be reinterpreted as the raw
/// `RGBA8` byte stream expected by presentation surfaces.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Rgba8 {
    /// The red channel.
    pub r: u8,
    /// The green channel.
    pub g: u8,
    /// The blue channel.
    pub b: u8,
    /// The alpha channel, `255` is fully opaque.
    pub a: u8,
}

impl Rgba8 {
    // --- Common Color Constants ---

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a new color with explicit channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns the same color with its alpha scaled by `opacity` in `[0, 1]`.
    pub fn faded(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Composites `self` over `dst` using straight-alpha "source over".
    pub fn over(self, dst: Rgba8) -> Rgba8 {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let sa = a as u32;
                let inv = 255 - sa;
                let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * inv + 127) / 255) as u8;
                let out_a = sa + (dst.a as u32 * inv + 127) / 255;
                Rgba8::new(
                    mix(self.r, dst.r),
                    mix(self.g, dst.g),
                    mix(self.b, dst.b),
                    out_a.min(255) as u8,
                )
            }
        }
    }

    /// Adds the alpha-weighted channels of `self` onto `dst`, saturating at `255`.
    pub fn add_onto(self, dst: Rgba8) -> Rgba8 {
        let sa = self.a as u32;
        let add = |s: u8, d: u8| (d as u32 + (s as u32 * sa + 127) / 255).min(255) as u8;
        Rgba8::new(
            add(self.r, dst.r),
            add(self.g, dst.g),
            add(self.b, dst.b),
            dst.a.max(self.a),
        )
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<(u8, u8, u8)> for Rgba8 {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}
