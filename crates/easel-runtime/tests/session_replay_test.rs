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

mod common;

use common::DELTA;
use easel_core::input::{InputEvent, MouseButton};
use easel_core::{Rgba8, RuntimeConfig};
use easel_infra::{HeadlessSurface, RecordingInput, ReplayInput, ScriptedInput, SolidFillProvider};
use easel_runtime::{Director, GameClock, ManualClock, Params, RuntimeError};

#[derive(Default)]
struct Clicks(u32);

fn config() -> RuntimeConfig {
    RuntimeConfig {
        width: 24,
        height: 24,
        background: Rgba8::BLACK,
        ..RuntimeConfig::default()
    }
}

fn count_clicks(director: &mut Director<Clicks>) {
    director
        .when("clicking")
        .unwrap()
        .click(|clicks: &mut Clicks, _, _| clicks.0 += 1);
    director.push("main", Params::new()).unwrap();
}

#[test]
fn test_a_recorded_session_replays_under_the_real_time_loop() {
    // --- 1. ARRANGE ---
    let path = std::env::temp_dir().join(format!("easel-session-{}.jsonl", std::process::id()));
    let click = InputEvent::MouseDown {
        x: 1.0,
        y: 2.0,
        button: MouseButton::Left,
    };
    let script = ScriptedInput::from_frames([vec![click.clone()], vec![], vec![click], vec![InputEvent::Quit]]);
    let recorder = RecordingInput::create(script, &path).unwrap();
    let mut live = Director::new(config(), SolidFillProvider::new(), recorder, HeadlessSurface::new(24, 24)).unwrap();
    count_clicks(&mut live);

    // --- 2. ACT ---
    let mut ended = false;
    for _ in 0..4 {
        match live.step(DELTA) {
            Ok(_) => {}
            Err(RuntimeError::GameEnded) => ended = true,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }
    let live_clicks = live.current_scene().unwrap().world().0;
    drop(live);

    let surface = HeadlessSurface::new(24, 24);
    let log = surface.log();
    let replay = ReplayInput::open(&path).unwrap();
    let mut replayed = Director::new(config(), SolidFillProvider::new(), replay, surface).unwrap();
    count_clicks(&mut replayed);
    let result = replayed.run_with(GameClock::new(ManualClock::new(), 30, 30));
    std::fs::remove_file(&path).ok();

    // --- 3. ASSERT ---
    assert!(ended, "The recorded quit ended the live session");
    assert_eq!(live_clicks, 2);
    assert!(result.is_ok(), "The end of the game is not an error: {result:?}");
    assert!(replayed.is_stopped());
    assert_eq!(replayed.current_scene().unwrap().world().0, live_clicks);
    assert_eq!(replayed.tick_count(), 3, "The quit frame ends the game before its tick is counted");
    assert!(log.frame_count() >= 1);
    assert!(log.title().is_some_and(|title| title.contains("static")));
}
