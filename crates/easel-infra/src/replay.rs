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

//! Recording and replaying input sessions.
//!
//! A session log holds one line per frame: the JSON array of the events of
//! that frame, e.g. `[{"type":"mouse_down","x":3.0,"y":4.0,"button":"left"}]`.
//! An empty line or `[]` is a frame without input.

use crate::input::track_pointer;
use anyhow::Context;
use easel_core::error::InputError;
use easel_core::input::InputEvent;
use easel_core::platform::InputSource;
use easel_core::Vec2;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// An [`InputSource`] reading a session log one line per tick.
pub struct ReplayInput {
    reader: Box<dyn BufRead>,
    line: usize,
    current: Vec<InputEvent>,
    mouse: Option<Vec2>,
    finished: bool,
}

impl ReplayInput {
    /// Replays the log read from `reader`.
    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            line: 0,
            current: Vec::new(),
            mouse: None,
            finished: false,
        }
    }

    /// Opens the session log at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open input log '{}'", path.display()))?;
        log::info!("Replaying input from '{}'", path.display());
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Returns `true` once every line has been played.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl InputSource for ReplayInput {
    fn tick(&mut self) -> Result<(), InputError> {
        self.current.clear();
        if self.finished {
            return Ok(());
        }

        let mut text = String::new();
        if self.reader.read_line(&mut text)? == 0 {
            log::warn!("Input log exhausted after {} frame(s)", self.line);
            self.finished = true;
            return Ok(());
        }
        self.line += 1;

        let text = text.trim();
        if !text.is_empty() {
            self.current = serde_json::from_str(text).map_err(|source| InputError::Malformed {
                line: self.line,
                source,
            })?;
        }
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

/// Wraps another [`InputSource`] and writes every batch it yields to a
/// session log that [`ReplayInput`] can play back.
pub struct RecordingInput<S, O: Write> {
    inner: S,
    output: O,
    current: Vec<InputEvent>,
    frames: usize,
}

impl<S: InputSource, O: Write> RecordingInput<S, O> {
    /// Records `inner` into `output`.
    pub fn new(inner: S, output: O) -> Self {
        Self {
            inner,
            output,
            current: Vec::new(),
            frames: 0,
        }
    }

    /// The number of frames written.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Flushes the log and returns the wrapped source and the output.
    ///
    /// # Errors
    ///
    /// Fails if flushing the output fails.
    pub fn finish(mut self) -> Result<(S, O), InputError> {
        self.output.flush()?;
        Ok((self.inner, self.output))
    }
}

impl<S: InputSource> RecordingInput<S, BufWriter<File>> {
    /// Records `inner` into a new session log at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created.
    pub fn create(inner: S, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Failed to create input log '{}'", path.display()))?;
        log::info!("Recording input to '{}'", path.display());
        Ok(Self::new(inner, BufWriter::new(file)))
    }
}

impl<S: InputSource, O: Write> InputSource for RecordingInput<S, O> {
    fn tick(&mut self) -> Result<(), InputError> {
        self.inner.tick()?;
        self.current = self.inner.get();
        let line = serde_json::to_string(&self.current).map_err(std::io::Error::other)?;
        writeln!(self.output, "{line}")?;
        self.frames += 1;
        Ok(())
    }

    fn get(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.current)
    }

    fn mouse_position(&self) -> Option<Vec2> {
        self.inner.mouse_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use easel_core::input::MouseButton;
    use std::io::Cursor;

    fn drain(input: &mut impl InputSource, ticks: usize) -> Vec<Vec<InputEvent>> {
        (0..ticks)
            .map(|_| {
                input.tick().expect("tick failed");
                input.get()
            })
            .collect()
    }

    #[test]
    fn test_replay_plays_one_line_per_tick() {
        // --- 1. SETUP ---
        let log = "[{\"type\":\"quit\"}]\n\n[{\"type\":\"mouse_up\",\"x\":1.0,\"y\":2.0,\"button\":\"right\"}]\n";
        let mut input = ReplayInput::from_reader(Cursor::new(log));

        // --- 2. ACTION ---
        let batches = drain(&mut input, 4);

        // --- 3. ASSERTIONS ---
        assert_eq!(batches[0], vec![InputEvent::Quit]);
        assert!(batches[1].is_empty(), "A blank line is an idle frame");
        assert_eq!(
            batches[2],
            vec![InputEvent::MouseUp {
                x: 1.0,
                y: 2.0,
                button: MouseButton::Right
            }]
        );
        assert!(batches[3].is_empty());
        assert!(input.is_finished());
        assert_eq!(input.mouse_position(), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_malformed_lines_report_their_number() {
        let mut input = ReplayInput::from_reader(Cursor::new("[]\n[{\"type\":\"teleport\"}]\n"));
        input.tick().unwrap();
        let error = input.tick().unwrap_err();
        assert!(matches!(error, InputError::Malformed { line: 2, .. }), "Got {error:?}");
    }

    #[test]
    fn test_a_recording_replays_identically() {
        // --- 1. SETUP ---
        let frames = vec![
            vec![InputEvent::KeyDown {
                key: "space".into(),
                modifier: 0,
                character: Some(" ".into()),
            }],
            vec![],
            vec![InputEvent::Expose, InputEvent::Quit],
        ];
        let mut recorder = RecordingInput::new(ScriptedInput::from_frames(frames.clone()), Vec::new());

        // --- 2. ACTION ---
        let seen = drain(&mut recorder, 3);
        assert_eq!(recorder.frames(), 3);
        let (_, bytes) = recorder.finish().unwrap();
        let mut replay = ReplayInput::from_reader(Cursor::new(bytes));

        // --- 3. ASSERTIONS ---
        assert_eq!(seen, frames, "Recording does not alter the batches");
        assert_eq!(drain(&mut replay, 3), frames);
    }

    #[test]
    fn test_opening_a_missing_log_names_the_path() {
        let error = ReplayInput::open("/definitely/not/here.jsonl").err().expect("open should fail");
        assert!(format!("{error}").contains("/definitely/not/here.jsonl"));
    }
}
