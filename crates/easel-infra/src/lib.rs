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

//! # Easel Infra
//!
//! Concrete implementations of the collaborator traits of `easel-core`.
//!
//! None of them opens a window: they present into memory, read input from
//! scripts or recorded logs and fill bounding boxes instead of rasterizing
//! shapes. That is enough to drive the runtime in tests, in demos and when
//! replaying a recorded session.

#![warn(missing_docs)]

pub mod input;
pub mod provider;
pub mod replay;
pub mod surface;

pub use input::{InputSender, ScriptedInput};
pub use provider::SolidFillProvider;
pub use replay::{RecordingInput, ReplayInput};
pub use surface::{FrameLog, HeadlessSurface, PresentedFrame};
