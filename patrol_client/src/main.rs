//! Headless demo binary.
//!
//! Usage:
//!   cargo run -p patrol_client -- [--config cfg.json] [--level mall.json]
//!                                 [--choice host|join] [--frames 240]
//!
//! Walks the menu, then runs two peers in one process: the local peer is
//! driven by a scripted touch sequence (joystick drag, swipe, double tap),
//! the other idles. Player states cross between them as length-prefixed
//! frames, the way they would over a real transport.

use std::env;
use std::time::{Duration, Instant};

use anyhow::Context;
use bytes::BytesMut;
use patrol_client::{
    menu::{MenuButton, HOST_BUTTON_KEY, JOIN_BUTTON_KEY},
    player::sheet_keys,
    session::{role_for_choice, ScriptedTouch, Spawns, TouchScript},
    GameSession, MenuScene,
};
use patrol_shared::{
    audio::HeadlessAudio,
    config::GameConfig,
    event::{TouchEvent, TouchId},
    level::LevelDescription,
    math::{Rect, Vec2},
    net::{decode_frame, encode_frame, PatrolMsg, PROTOCOL_VERSION},
    resources::{AssetManager, SpriteSheet},
    role::PlayerRole,
    shared,
    ui::Button,
};
use tracing::{info, warn};

const DISPLAY: Rect = Rect::new(0.0, 0.0, 1280.0, 720.0);

struct Args {
    config: Option<String>,
    level: Option<String>,
    choice: MenuButton,
    frames: u32,
}

fn parse_args() -> Args {
    let mut out = Args {
        config: None,
        level: None,
        choice: MenuButton::Host,
        frames: 240,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(args[i + 1].clone());
                i += 2;
            }
            "--level" if i + 1 < args.len() => {
                out.level = Some(args[i + 1].clone());
                i += 2;
            }
            "--choice" if i + 1 < args.len() => {
                out.choice = match args[i + 1].as_str() {
                    "join" => MenuButton::Join,
                    _ => MenuButton::Host,
                };
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                out.frames = args[i + 1].parse().unwrap_or(out.frames);
                i += 2;
            }
            other => {
                warn!(arg = %other, "ignoring argument");
                i += 1;
            }
        }
    }
    out
}

fn load_assets(cfg: &GameConfig) -> AssetManager {
    let mut assets = AssetManager::new();
    assets.insert(HOST_BUTTON_KEY, Button::new(HOST_BUTTON_KEY));
    assets.insert(JOIN_BUTTON_KEY, Button::new(JOIN_BUTTON_KEY));
    for role in [PlayerRole::Cop, PlayerRole::Thief] {
        for (key, frames) in sheet_keys(role).into_iter().zip(cfg.player.anim_frames) {
            assets.insert(key.clone(), SpriteSheet::new(key, frames));
        }
    }
    assets
}

fn load_spawns(path: Option<&str>) -> anyhow::Result<Spawns> {
    let Some(path) = path else {
        return Ok(Spawns::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("read level {path}"))?;
    let level = LevelDescription::from_json_str(&text).with_context(|| format!("level {path}"))?;
    info!(
        width = level.width,
        height = level.height,
        obstacles = level.obstacles().len(),
        "Level loaded"
    );
    Ok(Spawns {
        cop: level.cop_spawn()?,
        thief: level.thief_spawn()?,
    })
}

/// Joystick drag to the right and back, a swipe, then a double tap.
fn demo_script(t0: Instant, dt: Duration) -> TouchScript {
    let at = |frame: u32| t0 + dt * frame;
    let ev = |id: u64, x: f32, y: f32, frame: u32| {
        TouchEvent::new(TouchId(id), Vec2::new(x, y), at(frame))
    };
    let mut script = TouchScript::new().at(0, ScriptedTouch::Began(ev(1, 200.0, 500.0, 0)));
    for f in 1..=30 {
        let x = 200.0 + 4.0 * f as f32;
        script = script.at(
            f,
            ScriptedTouch::Moved {
                event: ev(1, x, 500.0 - f as f32, f),
                previous: Vec2::new(x - 4.0, 501.0 - f as f32),
            },
        );
    }
    script
        .at(90, ScriptedTouch::Ended(ev(1, 320.0, 470.0, 90)))
        .at(100, ScriptedTouch::Began(ev(2, 900.0, 400.0, 100)))
        .at(103, ScriptedTouch::Ended(ev(2, 900.0, 200.0, 103)))
        .at(120, ScriptedTouch::Began(ev(3, 1000.0, 300.0, 120)))
        .at(121, ScriptedTouch::Ended(ev(3, 1000.0, 300.0, 121)))
        .at(125, ScriptedTouch::Began(ev(4, 1002.0, 301.0, 125)))
        .at(126, ScriptedTouch::Ended(ev(4, 1002.0, 301.0, 126)))
}

/// Forwards every complete frame in `wire` to `session`.
fn deliver(wire: &mut BytesMut, session: &mut GameSession) -> anyhow::Result<()> {
    while let Some(msg) = decode_frame(wire)? {
        match msg {
            PatrolMsg::PlayerSync(sync) => session.apply_remote(&sync),
            PatrolMsg::Hello { protocol } if protocol != PROTOCOL_VERSION => {
                anyhow::bail!("peer speaks protocol {protocol}, expected {PROTOCOL_VERSION}");
            }
            PatrolMsg::Hello { .. } => {}
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let cfg = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    info!(tick_hz = cfg.tick_hz, frames = args.frames, "Starting patrol demo");

    let assets = load_assets(&cfg);
    let audio = shared(HeadlessAudio::new());

    let mut menu = MenuScene::new(&assets, audio.clone(), DISPLAY.size, cfg.scene_height)
        .context("menu init")?;
    menu.set_active(true);
    menu.press(args.choice, true);
    menu.press(args.choice, false);
    let choice = menu.choice();
    menu.dispose();
    let role = role_for_choice(choice).context("menu closed without a choice")?;
    info!(?choice, ?role, "Menu done");

    let spawns = load_spawns(args.level.as_deref())?;
    let mut local = GameSession::new(&cfg, &assets, role, DISPLAY, spawns)?;
    let mut peer = GameSession::new(&cfg, &assets, role.opponent(), DISPLAY, spawns)?;

    let tick = Duration::from_secs_f32(1.0 / cfg.tick_hz.max(1) as f32);
    let dt = tick.as_secs_f32();
    let script = demo_script(Instant::now(), tick);

    let mut to_peer = BytesMut::new();
    let mut to_local = BytesMut::new();
    let hello = PatrolMsg::Hello {
        protocol: PROTOCOL_VERSION,
    };
    encode_frame(&hello, &mut to_peer)?;
    encode_frame(&hello, &mut to_local)?;

    let mut interval = tokio::time::interval(tick);
    for frame in 0..args.frames {
        interval.tick().await;
        script.deliver(frame, &mut local.input);

        let mine = local.frame(dt);
        let theirs = peer.frame(dt);
        encode_frame(&PatrolMsg::PlayerSync(mine), &mut to_peer)?;
        encode_frame(&PatrolMsg::PlayerSync(theirs), &mut to_local)?;
        deliver(&mut to_peer, &mut peer)?;
        deliver(&mut to_local, &mut local)?;

        if frame % cfg.tick_hz.max(1) == 0 {
            info!(
                frame,
                position = ?mine.position,
                direction = ?local.local().direction(),
                mirrored = ?peer.remote().position(),
                "Frame"
            );
        }
    }

    let stats = local.stats();
    info!(
        frames = stats.frames,
        swipes = stats.swipes,
        switches = stats.switches,
        final_position = ?local.local().position(),
        "Demo finished"
    );
    local.dispose();
    peer.dispose();
    Ok(())
}
