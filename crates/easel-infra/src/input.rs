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

//! An input source fed through a channel, one batch per frame.

use easel_core::error::InputError;
use easel_core::input::InputEvent;
use easel_core::platform::InputSource;
use easel_core::Vec2;
use flume::TryRecvError;

/// Updates `mouse` with the last pointer position found in `events`.
pub(crate) fn track_pointer(events: &[InputEvent], mouse: &mut Option<Vec2>) {
    for event in events {
        match event {
            InputEvent::MouseDown { x, y, .. }
            | InputEvent::MouseUp { x, y, .. }
            | InputEvent::MouseMotion { x, y, .. } => *mouse = Some(Vec2::new(*x, *y)),
            _ => {}
        }
    }
}

/// The sending half of a [`ScriptedInput`]. It can be cloned and moved to
/// other threads.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: flume::Sender<Vec<InputEvent>>,
}

impl InputSender {
    /// Queues the batch of one frame.
    ///
    /// # Arguments
    /// * `batch` - The events delivered together on one tick.
    pub fn send_frame(&self, batch: Vec<InputEvent>) {
        log::trace!("Scripting a frame of {} input event(s)", batch.len());
        if let Err(e) = self.sender.send(batch) {
            log::error!("Failed to script input: {e}. The input source was dropped.");
        }
    }

    /// Queues a frame holding a single event.
    pub fn send(&self, event: InputEvent) {
        self.send_frame(vec![event]);
    }

    /// Queues a frame without events.
    pub fn idle(&self) {
        self.send_frame(Vec::new());
    }
}

/// An [`InputSource`] replaying scripted frames in order.
///
/// Each `tick` takes the next queued batch. Ticks beyond the script yield
/// empty batches.
#[derive(Debug)]
pub struct ScriptedInput {
    receiver: flume::Receiver<Vec<InputEvent>>,
    current: Vec<InputEvent>,
    mouse: Option<Vec2>,
    exhausted: bool,
}

impl ScriptedInput {
    /// Creates an empty script and the sender that fills it.
    ///
    /// # Returns
    /// The input source and its sender.
    pub fn channel() -> (Self, InputSender) {
        let (sender, receiver) = flume::unbounded();
        let input = Self {
            receiver,
            current: Vec::new(),
            mouse: None,
            exhausted: false,
        };
        (input, InputSender { sender })
    }

    /// Creates a source that plays `frames` and then stays idle.
    pub fn from_frames(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        let (input, sender) = Self::channel();
        for frame in frames {
            sender.send_frame(frame);
        }
        input
    }

    /// The number of scripted frames not played yet.
    pub fn remaining(&self) -> usize {
        self.receiver.len()
    }
}

impl InputSource for ScriptedInput {
    fn tick(&mut self) -> Result<(), InputError> {
        self.current = match self.receiver.try_recv() {
            Ok(batch) => batch,
            Err(TryRecvError::Empty) => Vec::new(),
            Err(TryRecvError::Disconnected) => {
                if !self.exhausted {
                    log::debug!("Input script finished, every sender was dropped");
                    self.exhausted = true;
                }
                Vec::new()
            }
        };
        track_pointer(&self.current, &mut self.mouse);
        Ok(())
    }

    fn get(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.current)
    }

    fn mouse_position(&self) -> Option<Vec2> {
        self.mouse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::input::MouseButton;
    use std::thread;

    #[test]
    fn test_frames_are_played_one_per_tick() {
        // --- 1. SETUP ---
        let mut input = ScriptedInput::from_frames([vec![InputEvent::Quit], vec![], vec![InputEvent::Expose]]);

        // --- 2. ACTION ---
        let mut batches = Vec::new();
        for _ in 0..4 {
            input.tick().unwrap();
            batches.push(input.get());
        }

        // --- 3. ASSERTIONS ---
        assert_eq!(batches[0], vec![InputEvent::Quit]);
        assert!(batches[1].is_empty());
        assert_eq!(batches[2], vec![InputEvent::Expose]);
        assert!(batches[3].is_empty(), "Past the script the source is idle");
    }

    #[test]
    fn test_mouse_position_follows_pointer_events() {
        let (mut input, sender) = ScriptedInput::channel();
        sender.send(InputEvent::MouseDown {
            x: 4.0,
            y: 9.0,
            button: MouseButton::Left,
        });
        assert_eq!(input.mouse_position(), None);
        input.tick().unwrap();
        assert_eq!(input.mouse_position(), Some(Vec2::new(4.0, 9.0)));
    }

    #[test]
    fn test_sender_works_from_another_thread() {
        let (mut input, sender) = ScriptedInput::channel();
        let handle = thread::spawn(move || sender.send(InputEvent::Quit));
        handle.join().expect("Thread join failed");

        input.tick().unwrap();
        assert_eq!(input.get(), vec![InputEvent::Quit]);
        assert_eq!(input.remaining(), 0);
    }
}
