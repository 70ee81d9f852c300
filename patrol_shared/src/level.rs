//! Level description schema.
//!
//! Levels are exported from a tile editor as JSON. The loader reads four
//! layers in fixed order: wall tiles, obstacle objects, the thief spawn and
//! the cop spawn. Object pixel coordinates are y-down; [`LevelDescription::to_world`]
//! converts them to y-up world units (one unit per tile).

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    math::{Size, Vec2},
    physics::BodyType,
};

/// Asset path of the first level.
pub const LEVEL_ONE_FILE: &str = "json/testmall.json";
/// Asset key of the first level.
pub const LEVEL_ONE_KEY: &str = "testmall";
pub const WALL_TEXTURE_KEY: &str = "wall";
pub const OBSTACLE_TEXTURE_KEY: &str = "obstacle";

/// Fixed layer order.
pub const TILES_LAYER: usize = 0;
pub const OBJECTS_LAYER: usize = 1;
pub const THIEF_SPAWN_LAYER: usize = 2;
pub const COP_SPAWN_LAYER: usize = 3;

/// Whole level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    pub layers: Vec<Layer>,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
}

/// One editor layer; tile layers carry `data`, object layers carry `objects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Layer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Vec<u32>,
    #[serde(default)]
    pub objects: Vec<LevelObject>,
}

/// A placed editor object, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LevelObject {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub ellipse: bool,
    /// Vertices relative to (`x`, `y`).
    #[serde(default)]
    pub polygon: Vec<Vec2>,
}

/// Shape of an obstacle object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleShape {
    Rect,
    Ellipse,
    Polygon,
}

impl LevelObject {
    pub fn shape(&self) -> ObstacleShape {
        if !self.polygon.is_empty() {
            ObstacleShape::Polygon
        } else if self.ellipse {
            ObstacleShape::Ellipse
        } else {
            ObstacleShape::Rect
        }
    }
}

/// Physics object definition used by hand-authored object files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsObjectDef {
    pub pos: Vec2,
    pub size: Size,
    #[serde(rename = "bodytype", default)]
    pub body_type: BodyType,
    #[serde(default = "default_density")]
    pub density: f32,
    #[serde(default)]
    pub friction: f32,
    #[serde(default)]
    pub restitution: f32,
    #[serde(default)]
    pub damping: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(rename = "debugcolor", default)]
    pub debug_color: Option<String>,
    #[serde(rename = "debugopacity", default)]
    pub debug_opacity: Option<f32>,
}

fn default_density() -> f32 {
    1.0
}

impl LevelDescription {
    /// Parses and validates a level file.
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let level: Self = serde_json::from_str(s).context("parse level json")?;
        if level.layers.len() <= COP_SPAWN_LAYER {
            warn!(layers = level.layers.len(), "level is missing spawn layers");
            bail!(
                "level has {} layers, expected at least {}",
                level.layers.len(),
                COP_SPAWN_LAYER + 1
            );
        }
        if level.tile_width == 0 || level.tile_height == 0 {
            warn!(
                tile_width = level.tile_width,
                tile_height = level.tile_height,
                "level has an empty tile size"
            );
            bail!("level tile size must be positive");
        }
        debug!(
            width = level.width,
            height = level.height,
            layers = level.layers.len(),
            "level parsed"
        );
        Ok(level)
    }

    /// Level extent in world units.
    pub fn world_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Wall tile ids, row-major, top row first.
    pub fn tiles(&self) -> &[u32] {
        &self.layers[TILES_LAYER].data
    }

    pub fn obstacles(&self) -> &[LevelObject] {
        &self.layers[OBJECTS_LAYER].objects
    }

    pub fn thief_spawn(&self) -> anyhow::Result<Vec2> {
        self.spawn(THIEF_SPAWN_LAYER).context("thief spawn")
    }

    pub fn cop_spawn(&self) -> anyhow::Result<Vec2> {
        self.spawn(COP_SPAWN_LAYER).context("cop spawn")
    }

    /// Converts a y-down pixel position to y-up world units.
    pub fn to_world(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            pixel.x / self.tile_width as f32,
            self.height as f32 - pixel.y / self.tile_height as f32,
        )
    }

    fn spawn(&self, layer: usize) -> anyhow::Result<Vec2> {
        let Some(obj) = self.layers[layer].objects.first() else {
            bail!("layer {layer} has no spawn object");
        };
        Ok(self.to_world(Vec2::new(obj.x, obj.y)))
    }
}
