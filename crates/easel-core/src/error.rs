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

//! Error types reported by the external collaborators and the configuration loader.

use thiserror::Error;

/// A failure while turning a drawable description into pixels.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider does not know how to draw this kind of drawable.
    #[error("Unsupported drawable kind '{kind}'")]
    Unsupported {
        /// The drawable kind name.
        kind: String,
    },
    /// An asset (image, font, emoji) could not be loaded or decoded.
    #[error("Failed to load asset '{source_name}': {details}")]
    AssetLoad {
        /// The asset path, URL or name.
        source_name: String,
        /// The underlying decoder or I/O message.
        details: String,
    },
}

/// A failure while presenting a frame to the screen.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface has been closed and can no longer present frames.
    #[error("Presentation surface is closed")]
    Closed,
    /// The frame does not match the surface dimensions.
    #[error("Frame size {frame:?} does not match surface size {surface:?}")]
    SizeMismatch {
        /// The `(width, height)` of the frame.
        frame: (u32, u32),
        /// The `(width, height)` of the surface.
        surface: (u32, u32),
    },
    /// A backend-specific failure.
    #[error("Presentation backend error: {0}")]
    Backend(String),
}

/// A failure while polling an input source.
#[derive(Debug, Error)]
pub enum InputError {
    /// Reading recorded events failed.
    #[error("Failed to read input events: {0}")]
    Io(#[from] std::io::Error),
    /// A recorded event could not be parsed.
    #[error("Malformed input event on line {line}: {source}")]
    Malformed {
        /// The 1-based line number in the event log.
        line: usize,
        /// The JSON error.
        source: serde_json::Error,
    },
    /// The input backend disconnected.
    #[error("Input source disconnected")]
    Disconnected,
}

/// A failure while loading a [`RuntimeConfig`](crate::config::RuntimeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// The path of the configuration file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration text is not valid JSON for the config schema.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its permitted range.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
