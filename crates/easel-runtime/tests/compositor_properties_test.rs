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

use common::{director, DELTA};
use easel_core::{ObjectId, Rect, Rgba8};
use easel_runtime::{FrameReport, Params, SceneObject};

#[derive(Default)]
struct Stage {
    mover: Option<ObjectId>,
    still: Option<ObjectId>,
    ticks: u32,
}

#[test]
fn test_untouched_object_goes_static_on_the_fifth_frame() {
    // --- 1. ARRANGE ---
    let (mut director, _log, _input) = director::<Stage>(64, 64);
    director
        .when("starting")
        .unwrap()
        .start(|ctx, _| Stage {
            still: Some(ctx.spawn(SceneObject::rectangle(Rgba8::WHITE, 8.0, 8.0).at(10.0, 10.0))),
            ..Stage::default()
        });
    director.push("main", Params::new()).unwrap();
    let id = director.current_scene().unwrap().world().still.unwrap();

    // --- 2. ACT ---
    let mut reports = Vec::new();
    let mut retained = Vec::new();
    for _ in 0..6 {
        reports.push(director.step(DELTA).unwrap());
        retained.push(director.current_scene().unwrap().compositor().is_retained(id));
    }

    // --- 3. ASSERT ---
    let dynamic: Vec<usize> = reports.iter().map(|r| r.dynamic_count).collect();
    assert_eq!(dynamic, vec![1, 1, 1, 1, 0, 0], "Four dynamic frames, then the static path");
    assert_eq!(retained, vec![false, false, false, false, true, true]);
    assert_eq!(reports[4].static_count, 1);

    // A mutation sends the object back to the dynamic list.
    director
        .with_scene(|_, ctx| ctx.object_mut(id).unwrap().set_x(12.0))
        .unwrap();
    let report = director.step(DELTA).unwrap();
    assert_eq!(report.dynamic_count, 1);
    assert_eq!(report.static_count, 0);
    assert!(!director.current_scene().unwrap().compositor().is_retained(id));
}

#[test]
fn test_moving_across_a_static_object_redraws_and_heals_it() {
    // --- 1. ARRANGE ---
    let (mut director, log, _input) = director::<Stage>(120, 60);
    director.when("starting").unwrap().start(|ctx, _| Stage {
        mover: Some(ctx.spawn(SceneObject::rectangle(Rgba8::RED, 10.0, 10.0).at(0.0, 20.0))),
        still: Some(ctx.spawn(SceneObject::rectangle(Rgba8::WHITE, 10.0, 10.0).at(20.0, 20.0))),
        ticks: 0,
    });
    // From the sixth tick on, the mover slides right by 4 pixels per tick.
    director.when("updating").unwrap().update(|stage, ctx, _| {
        stage.ticks += 1;
        if stage.ticks < 6 {
            return;
        }
        if let Some(mover) = stage.mover.and_then(|id| ctx.object_mut(id)) {
            let x = mover.position().x;
            mover.set_x(x + 4.0);
        }
    });
    director.push("main", Params::new()).unwrap();
    let still = director.current_scene().unwrap().world().still.unwrap();
    let still_rect = Rect::new(20, 20, 10, 10);

    // --- 2. ACT ---
    let mut reports: Vec<FrameReport> = vec![FrameReport::default()];
    for frame in 1..=20 {
        reports.push(director.step(DELTA).unwrap());
        if frame >= 5 {
            assert!(
                director.current_scene().unwrap().compositor().is_retained(still),
                "The still object stays static on frame {frame}"
            );
        }
    }

    // --- 3. ASSERT ---
    // The mover overlaps the still object at x = 12..28 (frames 8 to 12), so
    // its trail invalidates the still object on frames 9 to 13.
    for frame in 9..=13 {
        assert!(reports[frame].drawn_static >= 1, "Redrawn on frame {frame}");
        assert!(
            reports[frame].damage.contains(&still_rect),
            "The still rect is presented on frame {frame}"
        );
    }
    for frame in 15..=20 {
        assert_eq!(reports[frame].drawn_static, 0, "Left alone on frame {frame}");
        assert_eq!(reports[frame].static_count, 1);
        assert_eq!(reports[frame].dynamic_count, 1, "Only the mover is dynamic");
    }

    assert_eq!(log.pixel(25, 25), Some(Rgba8::WHITE), "The still object was healed");
    assert_eq!(log.pixel(5, 25), Some(Rgba8::BLACK), "The mover left no trail");
    assert_eq!(log.pixel(65, 25), Some(Rgba8::RED), "The mover sits at x = 60");
}

#[test]
fn test_an_idle_scene_presents_no_damage() {
    // --- 1. ARRANGE ---
    let (mut director, log, _input) = director::<Stage>(40, 40);
    director.when("starting").unwrap().start(|ctx, _| {
        ctx.spawn(SceneObject::circle(Rgba8::BLUE, 5.0).at(20.0, 20.0));
        Stage::default()
    });
    director.push("main", Params::new()).unwrap();

    // --- 2. ACT ---
    let reports: Vec<FrameReport> = (0..8).map(|_| director.step(DELTA).unwrap()).collect();

    // --- 3. ASSERT ---
    assert!(
        reports[0].damage.contains(&Rect::new(0, 0, 40, 40)),
        "The first frame paints everything"
    );
    for (index, report) in reports.iter().enumerate().skip(5) {
        assert!(report.damage.is_empty(), "Frame {} presented {:?}", index + 1, report.damage);
    }
    assert_eq!(log.frame_count(), 8);
    assert_eq!(log.last_damage(), Some(Vec::new()));
}

#[test]
fn test_redraw_request_repaints_the_whole_screen() {
    let (mut director, _log, _input) = director::<Stage>(16, 16);
    director.push("main", Params::new()).unwrap();
    director.step(DELTA).unwrap();
    assert!(director.step(DELTA).unwrap().damage.is_empty());

    director.with_scene(|_, ctx| ctx.request_redraw()).unwrap();

    assert_eq!(director.step(DELTA).unwrap().damage, vec![Rect::new(0, 0, 16, 16)]);
}
