//! Configuration system.
//!
//! Gameplay tuning loaded from JSON strings or files. Every field has a
//! default so partial files are valid.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Number of directional animation clips (right, up, left, down, still).
pub const DIRECTION_COUNT: usize = 5;

/// Root configuration for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Fixed frame rate for the headless driver.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Scene height the menu locks its layout to.
    #[serde(default = "default_scene_height")]
    pub scene_height: f32,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

fn default_tick_hz() -> u32 {
    60
}

fn default_scene_height() -> f32 {
    720.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            scene_height: default_scene_height(),
            input: InputConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg = Self::from_json_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        info!(path = %path.display(), tick_hz = cfg.tick_hz, "config loaded");
        Ok(cfg)
    }
}

/// Touch gesture thresholds, in scene units and milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Minimum net drag that counts as a swipe.
    pub swipe_length: f32,
    /// Maximum gap between two taps of a double tap.
    pub tap_threshold_ms: u64,
    /// Joystick knob travel limit.
    pub joystick_radius: f32,
    /// Joystick offsets shorter than this are ignored.
    pub joystick_deadzone: f32,
    /// Fraction of the screen width, from the left, that starts the joystick.
    pub joystick_zone: f32,
    /// Movement gain when controlling the cop.
    pub cop_gain: f32,
    /// Movement gain when controlling the thief.
    pub thief_gain: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            swipe_length: 100.0,
            tap_threshold_ms: 200,
            joystick_radius: 100.0,
            joystick_deadzone: 15.0,
            joystick_zone: 0.5,
            cop_gain: 1.0,
            thief_gain: 1.0,
        }
    }
}

/// Player body and animation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Force applied per unit of input.
    pub acceleration: f32,
    /// Counter-force per unit of velocity.
    pub damping: f32,
    pub max_speed: f32,
    /// Screen units per world unit.
    pub draw_scale: f32,
    /// Scale applied to character sprite nodes.
    pub char_scale: f32,
    /// Frames per directional sheet: right, up, left, down, still.
    pub anim_frames: [usize; DIRECTION_COUNT],
    /// Clip duration in seconds.
    pub anim_duration: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.4,
            restitution: 0.4,
            acceleration: 20.0,
            damping: 5.0,
            max_speed: 6.0,
            draw_scale: 32.0,
            char_scale: 0.5,
            anim_frames: [8, 8, 8, 8, 4],
            anim_duration: 1.0,
        }
    }
}
