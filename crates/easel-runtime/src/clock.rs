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

//! Frame pacing for the director's real-time loop.

use easel_core::RuntimeConfig;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// The most fixed updates run in one frame before the backlog is dropped.
const MAX_CATCH_UP: u32 = 5;

/// Absorbs floating-point drift so an exactly elapsed step is never missed.
const STEP_EPSILON: f64 = 1e-9;

/// A monotonic clock the [`GameClock`] reads and waits on.
pub trait TimeSource {
    /// Seconds elapsed since an arbitrary origin.
    fn now(&self) -> f64;

    /// Blocks for `seconds`.
    fn sleep(&mut self, seconds: f64);
}

/// The wall clock, backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    /// # Returns
    /// A new instance of the SystemClock struct.
    #[inline]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    #[inline]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, seconds: f64) {
        if seconds > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(seconds));
        }
    }
}

/// A clock that only moves when told to. Sleeping advances it instantly.
///
/// Clones share the same time, so a test can keep one and hand the other
/// to a [`GameClock`].
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Creates a clock at time `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds.max(0.0));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn sleep(&mut self, seconds: f64) {
        self.advance(seconds);
    }
}

/// What the loop should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBudget {
    /// Fixed updates that are due.
    pub updates: u32,
    /// A render is due.
    pub render: bool,
}

/// A fixed-step update accumulator with an independent render rate.
///
/// Updates always advance the game by the same `delta`, however irregular the
/// real frame times are. Rates are measured over one-second windows.
#[derive(Debug, Clone)]
pub struct GameClock<T: TimeSource = SystemClock> {
    source: T,
    update_step: f64,
    render_step: f64,
    last: f64,
    accumulator: f64,
    next_render: f64,
    window_start: f64,
    window_updates: u32,
    window_renders: u32,
    ups: f64,
    fps: f64,
}

impl<T: TimeSource> GameClock<T> {
    /// Creates a clock running `max_ups` updates and at most `max_fps`
    /// renders per second. Zero rates are treated as one.
    pub fn new(source: T, max_ups: u32, max_fps: u32) -> Self {
        let now = source.now();
        Self {
            source,
            update_step: 1.0 / f64::from(max_ups.max(1)),
            render_step: 1.0 / f64::from(max_fps.max(1)),
            last: now,
            accumulator: 0.0,
            next_render: now,
            window_start: now,
            window_updates: 0,
            window_renders: 0,
            ups: 0.0,
            fps: 0.0,
        }
    }

    /// Creates a clock with the rates of `config`.
    pub fn from_config(source: T, config: &RuntimeConfig) -> Self {
        Self::new(source, config.max_ups, config.max_fps)
    }

    // --- Getters ---

    /// The fixed `delta` of every update, in seconds.
    pub fn update_delta(&self) -> f64 {
        self.update_step
    }

    /// Updates measured over the last full second.
    pub fn ups(&self) -> f64 {
        self.ups
    }

    /// Renders measured over the last full second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// The underlying time source.
    pub fn source(&self) -> &T {
        &self.source
    }

    // --- Pacing ---

    /// Accounts for the time elapsed since the last call.
    ///
    /// # Returns
    /// The updates and render due now. When more than a few updates are
    /// due, the backlog beyond them is dropped so a slow frame cannot snowball.
    pub fn begin_frame(&mut self) -> FrameBudget {
        let now = self.source.now();
        self.accumulator += (now - self.last).max(0.0);
        self.last = now;

        let mut updates = ((self.accumulator + STEP_EPSILON) / self.update_step).floor() as u32;
        if updates > MAX_CATCH_UP {
            log::debug!("Dropping {} late update(s)", updates - MAX_CATCH_UP);
            updates = MAX_CATCH_UP;
            self.accumulator = 0.0;
        } else {
            self.accumulator = (self.accumulator - f64::from(updates) * self.update_step).max(0.0);
        }

        let render = now + STEP_EPSILON >= self.next_render;
        if render {
            self.next_render = (self.next_render + self.render_step).max(now);
        }
        FrameBudget { updates, render }
    }

    /// Counts a finished update towards the measured rate.
    pub fn record_update(&mut self) {
        self.window_updates += 1;
        self.roll_window();
    }

    /// Counts a finished render towards the measured rate.
    pub fn record_render(&mut self) {
        self.window_renders += 1;
        self.roll_window();
    }

    fn roll_window(&mut self) {
        let now = self.source.now();
        let elapsed = now - self.window_start;
        if elapsed >= 1.0 {
            self.ups = f64::from(self.window_updates) / elapsed;
            self.fps = f64::from(self.window_renders) / elapsed;
            self.window_updates = 0;
            self.window_renders = 0;
            self.window_start = now;
        }
    }

    /// Sleeps until the next update or render boundary.
    pub fn wait(&mut self) {
        let now = self.source.now();
        let next_update = self.last + (self.update_step - self.accumulator);
        let until = next_update.min(self.next_render) - now;
        if until > 0.0 {
            self.source.sleep(until);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_steps_accumulate() {
        // --- 1. SETUP ---
        let time = ManualClock::new();
        let mut clock = GameClock::new(time.clone(), 10, 10);

        // --- 2. ACTION ---
        let first = clock.begin_frame();
        time.advance(0.25);
        let second = clock.begin_frame();
        time.advance(0.06);
        let third = clock.begin_frame();

        // --- 3. ASSERTIONS ---
        assert_eq!(first.updates, 0);
        assert!(first.render, "The first frame renders immediately");
        assert_eq!(second.updates, 2, "0.25s holds two 0.1s steps");
        assert_eq!(third.updates, 1, "The 0.05s remainder is carried over");
        assert_relative_eq!(clock.update_delta(), 0.1);
    }

    #[test]
    fn test_backlog_is_capped() {
        let time = ManualClock::new();
        let mut clock = GameClock::new(time.clone(), 30, 30);
        clock.begin_frame();
        time.advance(10.0);
        assert_eq!(clock.begin_frame().updates, MAX_CATCH_UP);
        assert_eq!(clock.begin_frame().updates, 0, "The dropped backlog does not come back");
    }

    #[test]
    fn test_render_rate_is_independent() {
        let time = ManualClock::new();
        let mut clock = GameClock::new(time.clone(), 60, 2);
        clock.begin_frame();
        time.advance(0.1);
        let budget = clock.begin_frame();
        assert!(budget.updates > 0);
        assert!(!budget.render, "The next render is half a second away");
    }

    #[test]
    fn test_wait_sleeps_to_the_next_boundary_and_rates_are_measured() {
        // --- 1. SETUP ---
        let time = ManualClock::new();
        let mut clock = GameClock::new(time.clone(), 10, 10);

        // --- 2. ACTION ---
        for _ in 0..30 {
            let budget = clock.begin_frame();
            for _ in 0..budget.updates {
                clock.record_update();
            }
            if budget.render {
                clock.record_render();
            }
            clock.wait();
        }

        // --- 3. ASSERTIONS ---
        assert!(time.now() > 1.0, "Waiting advanced the manual clock");
        assert!(clock.ups() > 5.0 && clock.ups() <= 11.0, "Measured ups: {}", clock.ups());
        assert!(clock.fps() > 5.0 && clock.fps() <= 11.0, "Measured fps: {}", clock.fps());
    }
}
