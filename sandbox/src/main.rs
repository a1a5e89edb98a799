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

// Easel Sandbox
// Plays a scripted session of a small two-scene game without a window.
//
// Usage: sandbox [config.json] [record.jsonl]

use std::thread;

use anyhow::{anyhow, Context, Result};
use easel_core::input::{InputEvent, MouseButton};
use easel_core::platform::InputSource;
use easel_core::{Anchor, ObjectId, Rgba8, RuntimeConfig, Vec2, ViewId};
use easel_infra::{HeadlessSurface, InputSender, RecordingInput, ScriptedInput, SolidFillProvider};
use easel_runtime::{Animation, Director, Easing, GameClock, ManualClock, Params, SceneObject, Subscribe};

/// The world of both scenes.
#[derive(Default)]
struct Playfield {
    balls: Vec<ObjectId>,
    clicks: u32,
    glides_done: u32,
    celebrated: bool,
}

fn level_params(balls: u64) -> Params {
    let mut params = Params::new();
    params.insert("balls".into(), balls.into());
    params
}

/// Feeds the session: leave the title, click twice, then leave the level.
fn play_script(input: InputSender) {
    let click = |x: f32, y: f32| InputEvent::MouseDown {
        x,
        y,
        button: MouseButton::Left,
    };
    let key = |name: &str| InputEvent::KeyDown {
        key: name.to_string(),
        modifier: 0,
        character: None,
    };
    let idle = |frames: usize| {
        for _ in 0..frames {
            input.idle();
        }
    };

    idle(5);
    input.send(key("space"));
    idle(30);
    input.send(click(100.0, 80.0));
    idle(5);
    input.send(click(200.0, 120.0));
    idle(60);
    input.send(key("escape"));
}

fn setup_title(director: &mut Director<Playfield>) -> Result<()> {
    director.when("starting: title")?.start(|ctx, _| {
        ctx.spawn(
            SceneObject::text(Rgba8::BLACK, "Press space", 24.0)
                .anchored(Anchor::Center)
                .at(160.0, 100.0),
        );
        Playfield::default()
    });
    director
        .when("input.keyboard.down.space: title")?
        .call(|_, ctx, _| ctx.replace_scene("level", level_params(3)));
    Ok(())
}

fn setup_level(director: &mut Director<Playfield>) -> Result<()> {
    director.when("starting: level")?.start(|ctx, params| {
        if let Err(e) = ctx.layers_mut().set_layers(ViewId::ROOT, ["ground", "balls", "hud"]) {
            log::warn!("Could not define layers: {e}");
        }
        ctx.spawn(SceneObject::rectangle(Rgba8::rgb(40, 40, 60), 320.0, 20.0).at(0.0, 180.0).in_layer("ground"));
        ctx.spawn(SceneObject::text(Rgba8::WHITE, "Click anywhere", 12.0).at(4.0, 4.0).in_layer("hud"));

        let spinner = ctx.spawn(
            SceneObject::rectangle(Rgba8::RED, 16.0, 16.0)
                .anchored(Anchor::Center)
                .at(290.0, 30.0)
                .in_layer("hud"),
        );
        if let Err(e) = ctx.animate(spinner, Animation::spin(1.5)) {
            log::warn!("Could not spin: {e}");
        }

        let count = params.get("balls").and_then(|v| v.as_u64()).unwrap_or(1);
        let mut field = Playfield::default();
        for index in 0..count {
            let from = Vec2::new(20.0 + 40.0 * index as f32, 20.0);
            let ball = ctx.spawn(
                SceneObject::circle(Rgba8::BLUE, 8.0)
                    .anchored(Anchor::Center)
                    .at(from.x, from.y)
                    .in_layer("balls"),
            );
            let glide = Animation::glide_to(from, Vec2::new(from.x, 170.0), 1.0 + index as f64, Easing::QuadIn);
            match ctx.animate(ball, glide) {
                Ok(_) => field.balls.push(ball),
                Err(e) => log::warn!("Could not animate {ball}: {e}"),
            }
        }
        // Each finished glide fires one end event per animated property.
        ctx.on_event("Circle.y.animation.end", |field: &mut Playfield, _, _| {
            field.glides_done += 1;
        });
        field
    });

    director.when("clicking: level")?.click(|field, ctx, click| {
        field.clicks += 1;
        ctx.spawn(
            SceneObject::circle(Rgba8::GREEN, 4.0)
                .anchored(Anchor::Center)
                .at(click.position.x, click.position.y)
                .in_layer("balls"),
        );
    });

    director.when_condition(
        |field: &Playfield| field.clicks >= 2 && !field.celebrated,
        |field, ctx, _| {
            field.celebrated = true;
            log::info!("Two clicks after {} tick(s), {} glide(s) done", ctx.tick(), field.glides_done);
            ctx.request_redraw();
        },
    );

    director
        .when("input.keyboard.down.escape: level")?
        .call(|_, ctx, _| ctx.pop_scene(Params::new()));
    Ok(())
}

fn run(config: RuntimeConfig, input: impl InputSource + 'static) -> Result<()> {
    let surface = HeadlessSurface::new(config.width, config.height);
    let frames = surface.log();
    let clock = GameClock::from_config(ManualClock::new(), &config);

    let mut director = Director::new(config, SolidFillProvider::new(), input, surface)?;
    setup_title(&mut director)?;
    setup_level(&mut director)?;
    director.push("title", Params::new())?;
    director.run_with(clock)?;

    log::info!(
        "Session over after {} tick(s): {} frame(s) presented, caption {:?}",
        director.tick_count(),
        frames.frame_count(),
        frames.title().unwrap_or_default()
    );
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => RuntimeConfig::load(&path).with_context(|| format!("Loading '{path}'"))?,
        None => RuntimeConfig {
            width: 320,
            height: 200,
            background: Rgba8::rgb(230, 230, 240),
            ..RuntimeConfig::default()
        },
    };

    let (input, sender) = ScriptedInput::channel();
    let script = thread::spawn(move || play_script(sender));
    script.join().map_err(|_| anyhow!("The input script thread panicked"))?;
    log::info!("Scripted {} frame(s) of input", input.remaining());

    match args.next() {
        Some(path) => run(config, RecordingInput::create(input, path)?),
        None => run(config, input),
    }
}
