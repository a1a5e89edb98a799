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

//! Runtime configuration, loaded from JSON with a default for every field.

use crate::color::Rgba8;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by the director and every scene it creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// The scene width in pixels.
    pub width: u32,
    /// The scene height in pixels.
    pub height: u32,
    /// The color restored into damaged regions.
    pub background: Rgba8,
    /// The maximum number of rendered frames per second.
    pub max_fps: u32,
    /// The number of fixed updates per second.
    pub max_ups: u32,
    /// A fixed window caption. `None` shows live frame statistics instead.
    pub title: Option<String>,
    /// How many consecutive unchanged draws an object needs before it is
    /// promoted to the static path.
    pub static_age_threshold: u32,
    /// Whether the whole screen is repainted when a scene becomes the top.
    pub full_redraw_on_enter: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Rgba8::WHITE,
            max_fps: 30,
            max_ups: 30,
            title: None,
            static_age_threshold: 4,
            full_redraw_on_enter: true,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from JSON text. Missing fields take their default.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!(
            "Loaded runtime config from '{}' ({}x{}, {} ups, {} fps)",
            path.display(),
            config.width,
            config.height,
            config.max_ups,
            config.max_fps
        );
        Ok(config)
    }

    /// Checks the values that the tick loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "width/height",
                reason: format!("scene size must be positive, got {}x{}", self.width, self.height),
            });
        }
        if self.max_ups == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_ups",
                reason: "update rate must be at least 1".to_string(),
            });
        }
        if self.max_fps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_fps",
                reason: "frame rate must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RuntimeConfig::from_json_str(r#"{ "width": 320, "title": "Pong" }"#)
            .expect("partial config should parse");

        assert_eq!(config.width, 320);
        assert_eq!(config.height, 600, "Missing fields must keep their default");
        assert_eq!(config.title.as_deref(), Some("Pong"));
        assert_eq!(config.static_age_threshold, 4);
    }

    #[test]
    fn test_zero_rates_are_rejected() {
        let result = RuntimeConfig::from_json_str(r#"{ "max_ups": 0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { field: "max_ups", .. })));
    }
}
