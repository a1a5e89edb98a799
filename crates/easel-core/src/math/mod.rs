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

//! Provides the 2D mathematics primitives used by the scene runtime.
//!
//! Angles exposed to users are in **degrees** (objects are rotated by a
//! property named `angle`), internal trigonometry converts with
//! [`DEG_TO_RAD`].

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

/// The factor to convert degrees to radians (PI / 180.0).
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

pub mod rect;
pub mod vector;

pub use self::rect::Rect;
pub use self::vector::Vec2;

/// Tolerance under which `sin`/`cos` values are snapped to `0` or `±1`.
const TRIG_SNAP: f32 = 1e-6;

fn snap_unit(value: f32) -> f32 {
    if value.abs() < TRIG_SNAP {
        0.0
    } else if (1.0 - value.abs()).abs() < TRIG_SNAP {
        value.signum()
    } else {
        value
    }
}

/// The size of the axis-aligned box enclosing a `width` x `height` box
/// rotated by `degrees`.
///
/// Quarter turns are exact: a 20x10 box at 90 degrees gives exactly 10x20.
pub fn rotated_extent(width: f32, height: f32, degrees: f32) -> Vec2 {
    let (sin, cos) = (degrees.rem_euclid(360.0) * DEG_TO_RAD).sin_cos();
    let (sin, cos) = (snap_unit(sin).abs(), snap_unit(cos).abs());
    Vec2::new(width * cos + height * sin, width * sin + height * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotated_extent_is_exact_on_quarter_turns() {
        for (degrees, expected) in [(90.0, (10.0, 20.0)), (180.0, (20.0, 10.0)), (270.0, (10.0, 20.0)), (-90.0, (10.0, 20.0))] {
            let extent = rotated_extent(20.0, 10.0, degrees);
            assert_eq!((extent.x, extent.y), expected, "At {degrees} degrees");
        }
    }

    #[test]
    fn test_rotated_extent_grows_between_quarter_turns() {
        let extent = rotated_extent(10.0, 10.0, 45.0);
        assert_relative_eq!(extent.x, 10.0 * std::f32::consts::SQRT_2, epsilon = 1e-4);
        assert_relative_eq!(extent.y, extent.x);
    }
}
