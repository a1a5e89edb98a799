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

//! The table of known event names and their friendly aliases.

use super::namespace;
use crate::error::EventError;
use crate::fuzzy::closest_names;

// --- Director lifecycle ---

/// Fired before `director.update` each tick.
pub const PRE_UPDATE: &str = "director.pre_update";
/// Fired once per fixed update with a `delta` attribute.
pub const UPDATE: &str = "director.update";
/// Fired after `director.update` each tick.
pub const POST_UPDATE: &str = "director.post_update";
/// Fired before the draw pass.
pub const PRE_RENDER: &str = "director.pre_render";
/// Fired right before the compositor draws.
pub const RENDER: &str = "director.render";
/// Fired after the frame was presented.
pub const POST_RENDER: &str = "director.post_render";
/// Requests a full repaint of the scene.
pub const REDRAW: &str = "director.redraw";
/// Fired once when a scene is created. Handlers may return the world.
pub const SCENE_START: &str = "director.scene.start";
/// Fired whenever a scene becomes the top of the stack.
pub const SCENE_ENTER: &str = "director.scene.enter";
/// Fired whenever a scene stops being the top of the stack.
pub const SCENE_EXIT: &str = "director.scene.exit";

// --- System and input ---

/// The user closed the window.
pub const QUIT: &str = "system.quit";
/// The window gained or lost focus.
pub const FOCUS_CHANGE: &str = "system.focus_change";
/// The window was resized.
pub const VIDEO_RESIZE: &str = "system.video_resize";
/// The window needs repainting.
pub const VIDEO_EXPOSE: &str = "system.video_expose";
/// A key was pressed. The key name is appended as a segment.
pub const KEY_DOWN: &str = "input.keyboard.down";
/// A key was released. The key name is appended as a segment.
pub const KEY_UP: &str = "input.keyboard.up";
/// The cursor moved.
pub const MOUSE_MOTION: &str = "input.mouse.motion";
/// A mouse button was pressed. The button name is appended as a segment.
pub const MOUSE_DOWN: &str = "input.mouse.down";
/// A mouse button was released. The button name is appended as a segment.
pub const MOUSE_UP: &str = "input.mouse.up";
/// The wheel was scrolled.
pub const MOUSE_WHEEL: &str = "input.mouse.wheel";
/// Text was typed.
pub const TEXT_INPUT: &str = "input.text.input";

/// Every canonical event name the friendly registration API accepts.
pub const KNOWN_EVENTS: &[&str] = &[
    QUIT,
    FOCUS_CHANGE,
    VIDEO_RESIZE,
    VIDEO_EXPOSE,
    KEY_DOWN,
    KEY_UP,
    MOUSE_MOTION,
    MOUSE_DOWN,
    MOUSE_UP,
    MOUSE_WHEEL,
    TEXT_INPUT,
    PRE_UPDATE,
    UPDATE,
    POST_UPDATE,
    PRE_RENDER,
    RENDER,
    POST_RENDER,
    REDRAW,
    SCENE_START,
    SCENE_ENTER,
    SCENE_EXIT,
];

/// Friendly names and the canonical namespace they stand for.
pub const ALIASES: &[(&str, &str)] = &[
    ("starting", SCENE_START),
    ("entering", SCENE_ENTER),
    ("exiting", SCENE_EXIT),
    ("updating", UPDATE),
    ("drawing", RENDER),
    ("quitting", QUIT),
    ("typing", KEY_DOWN),
    ("done typing", KEY_UP),
    ("clicking", MOUSE_DOWN),
    ("done clicking", MOUSE_UP),
    ("scrolling", MOUSE_WHEEL),
    ("mouse motion", MOUSE_MOTION),
];

/// Maps a friendly alias to its namespace. Other names are returned unchanged.
pub fn resolve_alias(name: &str) -> &str {
    let trimmed = name.trim();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(trimmed)
}

/// Checks a name given to the friendly registration API and returns its namespace.
///
/// A name is accepted if it is an alias, a known event, a prefix of a known event
/// (`input.mouse`), or something more specific than a known event
/// (`input.keyboard.down.space`).
///
/// # Errors
///
/// [`EventError::UnknownEvent`] carrying the closest known names.
pub fn validate(name: &str) -> Result<String, EventError> {
    let canonical = namespace::normalize(resolve_alias(name));
    let known = KNOWN_EVENTS.iter().any(|known| {
        namespace::matches(&canonical, known) || namespace::matches(known, &canonical)
    });
    if known {
        Ok(canonical)
    } else {
        let candidates = KNOWN_EVENTS.iter().copied().chain(ALIASES.iter().map(|(a, _)| *a));
        Err(EventError::UnknownEvent {
            name: name.trim().to_string(),
            suggestions: closest_names(name, candidates),
        })
    }
}

/// A parsed `when` specification such as `"clicking: title"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    /// The canonical namespace.
    pub namespace: String,
    /// The scene names the registration is limited to. Empty means every scene.
    pub targets: Vec<String>,
}

/// Parses `"<event>[: scene[: scene…]]"` and validates the event part.
pub fn parse_spec(spec: &str) -> Result<EventSpec, EventError> {
    let mut parts = spec.split(':');
    let event = parts.next().unwrap_or_default();
    let targets = parts
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    Ok(EventSpec {
        namespace: validate(event)?,
        targets,
    })
}
