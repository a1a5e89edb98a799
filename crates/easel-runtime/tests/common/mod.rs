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

//! Shared fixtures for the runtime integration tests.

#![allow(dead_code)]

use easel_core::{Rgba8, RuntimeConfig};
use easel_infra::{FrameLog, HeadlessSurface, InputSender, ScriptedInput, SolidFillProvider};
use easel_runtime::Director;

/// The fixed update delta used by the tests.
pub const DELTA: f64 = 1.0 / 30.0;

/// A director on a black headless surface of `width` x `height`, fed by a
/// scripted input channel.
pub fn director<W: Default + 'static>(width: u32, height: u32) -> (Director<W>, FrameLog, InputSender) {
    let config = RuntimeConfig {
        width,
        height,
        background: Rgba8::BLACK,
        ..RuntimeConfig::default()
    };
    let surface = HeadlessSurface::new(width, height);
    let log = surface.log();
    let (input, sender) = ScriptedInput::channel();
    let director = Director::new(config, SolidFillProvider::new(), input, surface).expect("valid config");
    (director, log, sender)
}
