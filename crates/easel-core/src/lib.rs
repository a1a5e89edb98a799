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

//! # Easel Core
//!
//! Foundational crate containing the value types and the interface contracts
//! that the scene runtime is built against.
//!
//! Everything that touches pixels on the far side of the runtime (shape
//! rasterization, asset decoding, the OS window) is expressed here as a trait
//! so that `easel-runtime` never depends on a concrete backend.

#![warn(missing_docs)]

pub mod color;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod object;
pub mod pixels;
pub mod platform;

pub use color::Rgba8;
pub use config::RuntimeConfig;
pub use math::{Rect, Vec2};
pub use object::{Anchor, Drawable, ObjectId, ViewId};
pub use pixels::PixelBuffer;
