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

//! Backend-agnostic OS events, as produced by an [`InputSource`](crate::platform::InputSource).
//!
//! The runtime turns these into dot-namespaced bus events (`input.mouse.down.left`,
//! `system.quit`, …). The serde representation is the line format of recorded
//! event logs.

use serde::{Deserialize, Serialize};

/// A raw user or system event for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// The user asked to close the window.
    Quit,
    /// A keyboard key was pressed.
    KeyDown {
        /// The lowercase key name, e.g. `"space"` or `"a"`.
        key: String,
        /// The modifier bit mask active during the press.
        #[serde(default)]
        modifier: u32,
        /// The character produced by the press, if any.
        #[serde(default)]
        character: Option<String>,
    },
    /// A keyboard key was released.
    KeyUp {
        /// The lowercase key name.
        key: String,
        /// The modifier bit mask active during the release.
        #[serde(default)]
        modifier: u32,
    },
    /// Text was typed (after keyboard layout and IME processing).
    TextInput {
        /// The produced text.
        text: String,
    },
    /// A mouse button was pressed.
    MouseDown {
        /// The cursor x-coordinate.
        x: f32,
        /// The cursor y-coordinate.
        y: f32,
        /// The button that was pressed.
        button: MouseButton,
    },
    /// A mouse button was released.
    MouseUp {
        /// The cursor x-coordinate.
        x: f32,
        /// The cursor y-coordinate.
        y: f32,
        /// The button that was released.
        button: MouseButton,
    },
    /// The cursor moved.
    MouseMotion {
        /// The new cursor x-coordinate.
        x: f32,
        /// The new cursor y-coordinate.
        y: f32,
        /// The buttons held during the motion.
        #[serde(default)]
        buttons: MouseButtons,
    },
    /// The wheel was scrolled.
    MouseWheel {
        /// Horizontal scroll amount.
        x: f32,
        /// Vertical scroll amount, positive is away from the user.
        y: f32,
    },
    /// The window was resized.
    Resize {
        /// The new width.
        width: u32,
        /// The new height.
        height: u32,
    },
    /// The window gained or lost focus.
    FocusChange {
        /// `true` when focus was gained.
        gained: bool,
    },
    /// The window contents were exposed and need repainting.
    Expose,
}

/// A mouse button. Wheel steps are reported as buttons by some platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The middle mouse button.
    Middle,
    /// The right mouse button.
    Right,
    /// One wheel step up.
    ScrollUp,
    /// One wheel step down.
    ScrollDown,
}

impl MouseButton {
    /// The namespace segment used for this button (`input.mouse.down.<name>`).
    pub fn name(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
            MouseButton::ScrollUp => "scroll_up",
            MouseButton::ScrollDown => "scroll_down",
        }
    }
}

/// The held state of the three physical mouse buttons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButtons {
    /// The left button is held.
    #[serde(default)]
    pub left: bool,
    /// The middle button is held.
    #[serde(default)]
    pub middle: bool,
    /// The right button is held.
    #[serde(default)]
    pub right: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_line_format() {
        let line = r#"{"type":"mouse_down","x":3.0,"y":4.0,"button":"left"}"#;
        let event: InputEvent = serde_json::from_str(line).expect("valid log line");
        assert_eq!(
            event,
            InputEvent::MouseDown {
                x: 3.0,
                y: 4.0,
                button: MouseButton::Left
            }
        );

        let key: InputEvent = serde_json::from_str(r#"{"type":"key_down","key":"space"}"#).unwrap();
        assert!(matches!(key, InputEvent::KeyDown { ref key, modifier: 0, character: None } if key == "space"));
    }
}
