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

//! Property animations and the per-scene scheduler that advances them.

mod interpolation;
mod scheduler;

pub use self::interpolation::{Easing, Interpolation};
pub use self::scheduler::{AnimationHandle, AnimationScheduler};

use crate::error::AnimationError;
use crate::object::Property;
use easel_core::Vec2;

/// What happens when an animation's progress runs past its duration.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum LoopMode {
    /// The end value is applied and the animation is removed.
    #[default]
    NoLoop,
    /// Progress restarts at the overshoot past the duration.
    Wrap,
    /// Progress restarts at `overshoot + offset`, so only the interval
    /// `[offset, duration]` repeats.
    OffsetWrap(f64),
}

/// A description of how one or more properties of an object change over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    /// The rule producing values.
    pub interpolation: Interpolation,
    /// The length of one pass, in seconds.
    pub duration: f64,
    /// The loop behaviour.
    pub loop_mode: LoopMode,
    /// Numeric values are added to the property value captured at start.
    pub relative: bool,
    /// A constant added to every numeric value.
    pub shift: f64,
}

impl Animation {
    /// Creates a non-looping, absolute animation.
    pub fn new(interpolation: Interpolation, duration: f64) -> Self {
        Self {
            interpolation,
            duration,
            loop_mode: LoopMode::NoLoop,
            relative: false,
            shift: 0.0,
        }
    }

    /// A linear tween of one numeric property.
    pub fn tween(property: Property, start: f64, end: f64, duration: f64) -> Self {
        Self::new(Interpolation::linear(property, start, end), duration)
    }

    /// Sets the loop mode.
    pub fn looping(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// Makes numeric values relative to the property values at start.
    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }

    /// Adds `shift` to every numeric value.
    pub fn shifted(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    // --- Helpers ---

    /// Moves an object from `from` to `to` along `easing`.
    pub fn glide_to(from: Vec2, to: Vec2, duration: f64, easing: Easing) -> Self {
        Self::new(
            Interpolation::Parallel(vec![
                Interpolation::Tween {
                    property: Property::X,
                    start: from.x as f64,
                    end: to.x as f64,
                    easing,
                },
                Interpolation::Tween {
                    property: Property::Y,
                    start: from.y as f64,
                    end: to.y as f64,
                    easing,
                },
            ]),
            duration,
        )
    }

    /// Turns an object a full circle every `period` seconds, forever.
    ///
    /// A negative period spins clockwise.
    pub fn spin(period: f64) -> Self {
        let sweep = if period < 0.0 { -360.0 } else { 360.0 };
        Self::new(Interpolation::linear(Property::Angle, 0.0, sweep), period.abs()).looping(LoopMode::Wrap)
    }

    /// Chains animations one after another into a single animation.
    ///
    /// Only the interpolation and duration of each part are kept; loop mode,
    /// `relative` and `shift` are taken from the returned value.
    ///
    /// # Errors
    ///
    /// [`AnimationError::Invalid`] for an empty list.
    pub fn sequence(parts: Vec<Animation>) -> Result<Self, AnimationError> {
        if parts.is_empty() {
            return Err(AnimationError::Invalid("a sequence needs at least one animation".into()));
        }
        let duration = parts.iter().map(|p| p.duration).sum();
        let steps = parts.into_iter().map(|p| (p.interpolation, p.duration)).collect();
        Ok(Self::new(Interpolation::Sequence(steps), duration))
    }

    /// The properties written by this animation.
    pub fn properties(&self) -> Vec<Property> {
        self.interpolation.properties()
    }

    pub(crate) fn validate(&self) -> Result<(), AnimationError> {
        if self.duration <= 0.0 || !self.duration.is_finite() {
            return Err(AnimationError::Invalid(format!(
                "duration must be a positive number of seconds, got {}",
                self.duration
            )));
        }
        if let LoopMode::OffsetWrap(offset) = self.loop_mode {
            if !(0.0..self.duration).contains(&offset) {
                return Err(AnimationError::Invalid(format!(
                    "loop offset {offset} is outside [0, {})",
                    self.duration
                )));
            }
        }
        check_rule(&self.interpolation)?;
        let properties = self.properties();
        for (i, property) in properties.iter().enumerate() {
            if properties[..i].contains(property) && !matches!(self.interpolation, Interpolation::Sequence(_)) {
                return Err(AnimationError::Invalid(format!(
                    "'{property}' is animated twice by the same animation"
                )));
            }
        }
        Ok(())
    }
}

fn check_rule(rule: &Interpolation) -> Result<(), AnimationError> {
    match rule {
        Interpolation::Tween { property, .. } | Interpolation::Sine { property, .. } if !property.is_numeric() => {
            Err(AnimationError::Invalid(format!("'{property}' is not a numeric property")))
        }
        Interpolation::Iterate { values, .. } if values.is_empty() => {
            Err(AnimationError::Invalid("iterate needs at least one value".into()))
        }
        Interpolation::Parallel(parts) => parts.iter().try_for_each(check_rule),
        Interpolation::Sequence(steps) => {
            if steps.is_empty() || steps.iter().any(|(_, d)| *d <= 0.0 || d.is_nan()) {
                return Err(AnimationError::Invalid("sequence steps need positive durations".into()));
            }
            steps.iter().try_for_each(|(step, _)| check_rule(step))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rejects_bad_durations_and_offsets() {
        assert!(Animation::tween(Property::X, 0.0, 1.0, 0.0).validate().is_err());
        assert!(Animation::tween(Property::X, 0.0, 1.0, 2.0)
            .looping(LoopMode::OffsetWrap(2.0))
            .validate()
            .is_err());
        assert!(Animation::tween(Property::Visible, 0.0, 1.0, 1.0).validate().is_err());
        assert!(Animation::spin(3.0).validate().is_ok());
    }

    #[test]
    fn test_sequence_sums_durations() {
        let seq = Animation::sequence(vec![
            Animation::tween(Property::X, 0.0, 1.0, 1.5),
            Animation::tween(Property::Y, 0.0, 1.0, 0.5),
        ])
        .unwrap();
        assert_eq!(seq.duration, 2.0);
        assert_eq!(seq.properties(), vec![Property::X, Property::Y]);
        assert!(Animation::sequence(Vec::new()).is_err());
    }

    #[test]
    fn test_parallel_rules_must_not_overlap() {
        let bad = Animation::new(
            Interpolation::Parallel(vec![
                Interpolation::linear(Property::X, 0.0, 1.0),
                Interpolation::linear(Property::X, 1.0, 0.0),
            ]),
            1.0,
        );
        assert!(bad.validate().is_err());
        assert!(Animation::glide_to(Vec2::ZERO, Vec2::ONE, 1.0, Easing::QuadOut).validate().is_ok());
    }
}
