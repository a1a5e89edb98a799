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

//! Translation of raw input into bus events.

use crate::event::{names, Event};
use easel_core::input::InputEvent;
use easel_core::Vec2;

/// Builds the bus event of a raw input event.
///
/// Keys and mouse buttons become a trailing namespace segment
/// (`input.keyboard.down.space`, `input.mouse.down.left`), so handlers can
/// listen to one key or to all of them. Every event carries a `type`
/// attribute naming the raw event.
pub fn to_event(input: &InputEvent) -> Event {
    match input {
        InputEvent::Quit => Event::new(names::QUIT).with("type", "quit"),
        InputEvent::KeyDown {
            key,
            modifier,
            character,
        } => Event::new(format!("{}.{key}", names::KEY_DOWN))
            .with("type", "key_down")
            .with("key", key.as_str())
            .with("modifier", *modifier)
            .with("character", character.clone()),
        InputEvent::KeyUp { key, modifier } => Event::new(format!("{}.{key}", names::KEY_UP))
            .with("type", "key_up")
            .with("key", key.as_str())
            .with("modifier", *modifier),
        InputEvent::TextInput { text } => Event::new(names::TEXT_INPUT)
            .with("type", "text_input")
            .with("text", text.as_str()),
        InputEvent::MouseDown { x, y, button } => Event::new(format!("{}.{}", names::MOUSE_DOWN, button.name()))
            .with("type", "mouse_down")
            .with("x", *x)
            .with("y", *y)
            .with("button", button.name()),
        InputEvent::MouseUp { x, y, button } => Event::new(format!("{}.{}", names::MOUSE_UP, button.name()))
            .with("type", "mouse_up")
            .with("x", *x)
            .with("y", *y)
            .with("button", button.name()),
        InputEvent::MouseMotion { x, y, buttons } => Event::new(names::MOUSE_MOTION)
            .with("type", "mouse_motion")
            .with("x", *x)
            .with("y", *y)
            .with("left", buttons.left)
            .with("middle", buttons.middle)
            .with("right", buttons.right),
        InputEvent::MouseWheel { x, y } => Event::new(names::MOUSE_WHEEL)
            .with("type", "mouse_wheel")
            .with("x", *x)
            .with("y", *y),
        InputEvent::Resize { width, height } => Event::new(names::VIDEO_RESIZE)
            .with("type", "resize")
            .with("width", *width)
            .with("height", *height),
        InputEvent::FocusChange { gained } => Event::new(names::FOCUS_CHANGE)
            .with("type", "focus_change")
            .with("gained", *gained),
        InputEvent::Expose => Event::new(names::VIDEO_EXPOSE).with("type", "expose"),
    }
}

/// The cursor position carried by a pointer event.
pub fn pointer_position(input: &InputEvent) -> Option<Vec2> {
    match input {
        InputEvent::MouseDown { x, y, .. } | InputEvent::MouseUp { x, y, .. } | InputEvent::MouseMotion { x, y, .. } => {
            Some(Vec2::new(*x, *y))
        }
        _ => None,
    }
}
