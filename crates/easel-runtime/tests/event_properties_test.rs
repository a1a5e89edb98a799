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

use approx::assert_relative_eq;
use common::{director, DELTA};
use easel_core::input::{InputEvent, MouseButton};
use easel_core::{ObjectId, Rgba8};
use easel_runtime::{
    Animation, Binding, Event, LoopMode, Params, Property, RuntimeError, SceneObject, Subscribe,
};

#[derive(Default)]
struct Journal {
    order: Vec<i32>,
    broad: u32,
    narrow: u32,
    pings: u32,
    updates: u32,
    target: Option<ObjectId>,
}

#[test]
fn test_handlers_run_by_ascending_priority() {
    // --- 1. ARRANGE ---
    let (mut director, _log, input) = director::<Journal>(32, 32);
    for priority in [2, 0, 1] {
        director
            .when("clicking")
            .unwrap()
            .priority(priority)
            .click(move |journal, _, _| journal.order.push(priority));
    }
    director.push("main", Params::new()).unwrap();
    input.send(InputEvent::MouseDown {
        x: 3.0,
        y: 3.0,
        button: MouseButton::Left,
    });

    // --- 2. ACT ---
    director.step(DELTA).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(director.current_scene().unwrap().world().order, vec![0, 1, 2]);
    assert_eq!(director.runtime().mouse().x, 3.0, "The click moved the tracked cursor");
}

#[test]
fn test_namespaces_match_from_general_to_specific_only() {
    // --- 1. ARRANGE ---
    let (mut director, _log, _input) = director::<Journal>(32, 32);
    director.push("main", Params::new()).unwrap();
    director
        .with_scene(|_, ctx| {
            ctx.on_event("input.mouse", |journal: &mut Journal, _, _| journal.broad += 1);
            ctx.on_event("input.mouse.down.left", |journal: &mut Journal, _, _| journal.narrow += 1);
        })
        .unwrap();

    // --- 2. ACT ---
    let specific = director.dispatch(&Event::new("input.mouse.down.left")).unwrap().unwrap();
    let general = director.dispatch(&Event::new("input.mouse")).unwrap().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(specific.invoked, 2, "A general registration hears specific events");
    assert_eq!(general.invoked, 1, "A specific registration ignores general events");
    let journal = director.current_scene().unwrap().world();
    assert_eq!((journal.broad, journal.narrow), (2, 1));
}

#[test]
fn test_wrapping_animation_keeps_progress_below_its_duration() {
    // --- 1. ARRANGE ---
    let (mut director, _log, _input) = director::<Journal>(32, 32);
    director.push("main", Params::new()).unwrap();
    let (id, handle) = director
        .with_scene(|_, ctx| {
            let id = ctx.spawn(SceneObject::rectangle(Rgba8::RED, 4.0, 4.0));
            let animation = Animation::tween(Property::X, 0.0, 20.0, 2.0).looping(LoopMode::Wrap);
            (id, ctx.animate(id, animation).unwrap())
        })
        .unwrap();

    // --- 2. ACT ---
    let mut progress = Vec::new();
    for _ in 0..3 {
        director.step(1.5).unwrap();
        let scene = director.current_scene().unwrap();
        progress.push(scene.animations().progress(id, handle).unwrap());
    }

    // --- 3. ASSERT ---
    for value in &progress {
        assert!((0.0..2.0).contains(value), "Progress {value} left [0, 2)");
    }
    assert_relative_eq!(progress[0], 1.5);
    assert_relative_eq!(progress[1], 1.0);
    assert_relative_eq!(progress[2], 0.5);
    let x = director.current_scene().unwrap().objects().get(id).unwrap().position().x;
    assert_relative_eq!(x, 5.0);
}

#[test]
fn test_handlers_of_destroyed_objects_are_never_invoked() {
    // --- 1. ARRANGE ---
    let (mut director, _log, _input) = director::<Journal>(32, 32);
    director.push("main", Params::new()).unwrap();
    director
        .with_scene(|journal, ctx| {
            let target = ctx.spawn(SceneObject::circle(Rgba8::BLUE, 2.0));
            journal.target = Some(target);
            ctx.on_event(Binding::new("game.ping").owner(target), |journal: &mut Journal, _, _| {
                journal.pings += 1
            });
        })
        .unwrap();
    let ping = Event::new("game.ping");
    director.dispatch(&ping).unwrap();

    // --- 2. ACT ---
    // The object is removed behind the bus's back, its registration stays.
    director
        .with_scene(|journal, ctx| {
            let target = journal.target.unwrap();
            ctx.objects_mut().despawn(target);
        })
        .unwrap();
    let outcome = director.dispatch(&ping).unwrap().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(outcome.invoked, 0);
    assert_eq!(director.current_scene().unwrap().world().pings, 1);
}

#[test]
fn test_destroy_drops_the_registrations_of_an_object() {
    let (mut director, _log, _input) = director::<Journal>(32, 32);
    director.push("main", Params::new()).unwrap();
    let before = director.current_scene().unwrap().bus().len();

    let target = director
        .with_scene(|_, ctx| {
            let target = ctx.spawn(SceneObject::blank(2.0, 2.0));
            ctx.on_event(Binding::new("game.ping").owner(target), |journal: &mut Journal, _, _| {
                journal.pings += 1
            });
            target
        })
        .unwrap();
    assert_eq!(director.current_scene().unwrap().bus().len(), before + 1);

    let destroyed = director.with_scene(|_, ctx| ctx.destroy(target)).unwrap();

    assert!(destroyed);
    assert_eq!(director.current_scene().unwrap().bus().len(), before);
    assert!(director.dispatch(&Event::new("game.ping")).is_ok());
}

#[test]
fn test_registration_targeted_at_a_future_scene_fires_on_its_first_tick() {
    // --- 1. ARRANGE ---
    let (mut director, _log, _input) = director::<Journal>(32, 32);
    director
        .when("updating: level2")
        .unwrap()
        .update(|journal, _, _| journal.updates += 1);
    director.push("menu", Params::new()).unwrap();
    director.step(DELTA).unwrap();
    assert_eq!(director.current_scene().unwrap().world().updates, 0, "The menu is not targeted");

    // --- 2. ACT ---
    director.push("level2", Params::new()).unwrap();
    director.step(DELTA).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(director.scene_names(), vec!["menu", "level2"]);
    assert_eq!(director.current_scene().unwrap().world().updates, 1);
}

#[test]
fn test_quit_input_ends_the_game() {
    let (mut director, _log, input) = director::<Journal>(32, 32);
    director.push("main", Params::new()).unwrap();
    input.send(InputEvent::Quit);

    let result = director.update(DELTA);

    assert!(matches!(result, Err(RuntimeError::GameEnded)));
    assert!(director.is_stopped());
}
