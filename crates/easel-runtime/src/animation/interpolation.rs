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

//! Interpolation rules: how a property value is derived from animation progress.

use crate::object::{Property, PropertyValue};
use easel_core::Vec2;

/// A shaping curve over normalized progress `t` in `[0, 1]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Quadratic, accelerating from zero velocity.
    QuadIn,
    /// Quadratic, decelerating to zero velocity.
    QuadOut,
    /// Quadratic, accelerating then decelerating.
    QuadInOut,
    /// Cubic, accelerating from zero velocity.
    CubicIn,
    /// Cubic, decelerating to zero velocity.
    CubicOut,
    /// Cubic, accelerating then decelerating.
    CubicInOut,
}

impl Easing {
    /// Maps `t` (clamped to `[0, 1]`) through the curve.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
        }
    }
}

/// The rule producing property values from progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    /// Moves a numeric property from `start` to `end` along an easing curve.
    Tween {
        /// The animated property.
        property: Property,
        /// The value at progress `0`.
        start: f64,
        /// The value at the end of the duration.
        end: f64,
        /// The curve.
        easing: Easing,
    },
    /// Oscillates a numeric property: `amplitude * sin(phase)` with the phase
    /// running from `start_phase` to `end_phase` (radians) over the duration.
    Sine {
        /// The animated property.
        property: Property,
        /// The peak value.
        amplitude: f64,
        /// The phase at progress `0`.
        start_phase: f64,
        /// The phase at the end of the duration.
        end_phase: f64,
    },
    /// Drives `x` and `y` together along a circle.
    Polar {
        /// The circle center.
        center: Vec2,
        /// The circle radius.
        radius: f64,
        /// The angle at progress `0`, in degrees counter-clockwise from `+x`.
        start_angle: f64,
        /// The angle swept over the duration, in degrees.
        sweep: f64,
    },
    /// Steps through discrete values, going through the list `times` times.
    Iterate {
        /// The animated property.
        property: Property,
        /// The values, in order.
        values: Vec<PropertyValue>,
        /// How many passes over the list the duration spans.
        times: u32,
    },
    /// Runs several rules over the same duration. Their properties must be disjoint.
    Parallel(Vec<Interpolation>),
    /// Runs rules one after another, each for its own duration in seconds.
    Sequence(Vec<(Interpolation, f64)>),
}

impl Interpolation {
    /// A linear tween.
    pub fn linear(property: Property, start: f64, end: f64) -> Self {
        Interpolation::Tween {
            property,
            start,
            end,
            easing: Easing::Linear,
        }
    }

    /// The properties written by this rule.
    pub fn properties(&self) -> Vec<Property> {
        match self {
            Interpolation::Tween { property, .. }
            | Interpolation::Sine { property, .. }
            | Interpolation::Iterate { property, .. } => vec![*property],
            Interpolation::Polar { .. } => vec![Property::X, Property::Y],
            Interpolation::Parallel(parts) => parts.iter().flat_map(Interpolation::properties).collect(),
            Interpolation::Sequence(steps) => {
                let mut all = Vec::new();
                for property in steps.iter().flat_map(|(step, _)| step.properties()) {
                    if !all.contains(&property) {
                        all.push(property);
                    }
                }
                all
            }
        }
    }

    /// Evaluates the rule at `progress` seconds of a `duration`-second animation.
    pub fn evaluate(&self, progress: f64, duration: f64) -> Vec<(Property, PropertyValue)> {
        let t = if duration > 0.0 { (progress / duration).clamp(0.0, 1.0) } else { 1.0 };
        match self {
            Interpolation::Tween {
                property,
                start,
                end,
                easing,
            } => vec![(*property, PropertyValue::Number(start + (end - start) * easing.apply(t)))],
            Interpolation::Sine {
                property,
                amplitude,
                start_phase,
                end_phase,
            } => {
                let phase = start_phase + (end_phase - start_phase) * t;
                vec![(*property, PropertyValue::Number(amplitude * phase.sin()))]
            }
            Interpolation::Polar {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let angle = (start_angle + sweep * t).to_radians();
                // Screen space is y-down, counter-clockwise means decreasing y.
                let x = center.x as f64 + radius * angle.cos();
                let y = center.y as f64 - radius * angle.sin();
                vec![
                    (Property::X, PropertyValue::Number(x)),
                    (Property::Y, PropertyValue::Number(y)),
                ]
            }
            Interpolation::Iterate { property, values, times } => {
                if values.is_empty() {
                    return Vec::new();
                }
                let steps = values.len() * (*times).max(1) as usize;
                let step = ((t * steps as f64) as usize).min(steps - 1);
                vec![(*property, values[step % values.len()].clone())]
            }
            Interpolation::Parallel(parts) => parts
                .iter()
                .flat_map(|part| part.evaluate(progress, duration))
                .collect(),
            Interpolation::Sequence(steps) => {
                let mut start = 0.0;
                for (index, (step, length)) in steps.iter().enumerate() {
                    let last = index + 1 == steps.len();
                    if progress <= start + length || last {
                        return step.evaluate((progress - start).clamp(0.0, *length), *length);
                    }
                    start += length;
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_easings_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::CubicInOut,
        ] {
            assert_relative_eq!(easing.apply(0.0), 0.0, epsilon = 1e-9);
            assert_relative_eq!(easing.apply(1.0), 1.0, epsilon = 1e-9);
        }
        assert!(Easing::QuadIn.apply(0.5) < 0.5);
        assert!(Easing::QuadOut.apply(0.5) > 0.5);
    }

    #[test]
    fn test_polar_moves_counter_clockwise() {
        let rule = Interpolation::Polar {
            center: Vec2::new(100.0, 100.0),
            radius: 10.0,
            start_angle: 0.0,
            sweep: 360.0,
        };
        let quarter = rule.evaluate(1.0, 4.0);
        assert_relative_eq!(quarter[0].1.as_number().unwrap(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(quarter[1].1.as_number().unwrap(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sequence_hands_over_between_steps() {
        let rule = Interpolation::Sequence(vec![
            (Interpolation::linear(Property::X, 0.0, 10.0), 1.0),
            (Interpolation::linear(Property::X, 10.0, 0.0), 2.0),
        ]);
        let at = |p: f64| rule.evaluate(p, 3.0)[0].1.as_number().unwrap();
        assert_relative_eq!(at(0.5), 5.0);
        assert_relative_eq!(at(1.0), 10.0);
        assert_relative_eq!(at(2.0), 5.0);
        assert_relative_eq!(at(3.0), 0.0);
        assert_eq!(rule.properties(), vec![Property::X], "Repeated properties are listed once");
    }

    #[test]
    fn test_iterate_steps_through_values() {
        let rule = Interpolation::Iterate {
            property: Property::Name,
            values: vec!["a".into(), "b".into()],
            times: 2,
        };
        let at = |p: f64| rule.evaluate(p, 4.0)[0].1.clone();
        assert_eq!(at(0.0), PropertyValue::Text("a".into()));
        assert_eq!(at(1.0), PropertyValue::Text("b".into()));
        assert_eq!(at(2.0), PropertyValue::Text("a".into()));
        assert_eq!(at(4.0), PropertyValue::Text("b".into()), "The end shows the last value");
    }
}
