//! Player entity.
//!
//! A player is a capsule body plus a node in the scene graph. The body is
//! owned by the player; the scene graph and action manager are shared by
//! every player and injected.
//!
//! Motion has two authorities:
//! - local: [`PlayerModel::apply_force`] pushes the body and the physics
//!   engine integrates it;
//! - network: [`PlayerModel::apply_network`] mirrors a peer's state and
//!   never touches forces or velocity.
//!
//! Animation is a five-state machine (`Still` plus four compass buckets)
//! driven by the velocity each frame.

use std::{cell::RefCell, rc::Rc};

use patrol_shared::{
    animation::{ActionManager, AnimationClip},
    config::{PlayerConfig, DIRECTION_COUNT},
    error::{InitError, InitResult},
    math::{Color, Size, Vec2},
    physics::{BodyMaterial, BodyType, RigidBody},
    render::{NodeId, SceneGraph},
    resources::SpriteSheet,
    role::PlayerRole,
};
use tracing::{debug, warn};

/// Handle to the shared scene graph.
pub type SharedScene = Rc<RefCell<dyn SceneGraph>>;
/// Handle to the shared action manager.
pub type SharedActions = Rc<RefCell<dyn ActionManager>>;

/// Directional animation bucket. The discriminant is the clip index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right = 0,
    Up = 1,
    Left = 2,
    Down = 3,
    Still = 4,
}

impl Direction {
    pub const ALL: [Direction; DIRECTION_COUNT] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Still,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sprite sheet suffix, e.g. `cop_left`.
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Down => "down",
            Direction::Still => "still",
        }
    }
}

/// Asset keys of a role's five directional sheets, in clip order.
pub fn sheet_keys(role: PlayerRole) -> [String; DIRECTION_COUNT] {
    Direction::ALL.map(|d| format!("{}_{}", role.sheet_prefix(), d.suffix()))
}

/// Classifies a movement vector into one of the four compass buckets.
///
/// Uses the angle to the +x axis: `[45°, 135°)` is up, `[-135°, -45°)` is
/// down, `135°` and beyond (either sign) is left, everything else is right.
/// A vector along the negative x axis is left even when its y is `-0.0`.
/// The zero vector falls into right; callers check for it first.
pub fn find_direction(movement: Vec2) -> Direction {
    let angle = movement.angle_deg();
    if (45.0..135.0).contains(&angle) {
        Direction::Up
    } else if angle >= 135.0 || angle < -135.0 || (movement.y == 0.0 && movement.x < 0.0) {
        Direction::Left
    } else if (-135.0..-45.0).contains(&angle) {
        Direction::Down
    } else {
        Direction::Right
    }
}

/// Body bookkeeping pushed to the physics engine on the next update.
#[derive(Debug, Clone, PartialEq)]
struct Obstacle {
    name: &'static str,
    body_type: BodyType,
    material: BodyMaterial,
    fixed_rotation: bool,
    debug_color: Color,
    dirty: bool,
}

/// Acceleration model for local authority.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Motion {
    acceleration: f32,
    damping: f32,
    max_speed: f32,
}

/// A cop or thief in the level.
pub struct PlayerModel<B: RigidBody> {
    role: PlayerRole,
    body: B,
    obstacle: Obstacle,
    motion: Motion,
    size: Size,
    /// Screen units per world unit.
    scale: f32,
    char_scale: f32,
    collision_sound: String,

    scene: SharedScene,
    actions: SharedActions,
    node: Option<NodeId>,
    dropshadow: Option<NodeId>,
    sprite_nodes: Vec<NodeId>,
    anim_frames: [usize; DIRECTION_COUNT],
    animations: Vec<AnimationClip>,
    /// Per-direction ping-pong state: true while frames ascend.
    cycles: [bool; DIRECTION_COUNT],
    direction: Direction,
    /// Key of this player's action on the shared action manager.
    act_key: String,
}

impl<B: RigidBody> PlayerModel<B> {
    /// Builds a player around `body`, centered at `position` (world units).
    ///
    /// Creates the player's top-level node and drop shadow in `scene` and one
    /// clip per direction. Sprites are attached separately with
    /// [`attach_sprites`](Self::attach_sprites).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        role: PlayerRole,
        mut body: B,
        position: Vec2,
        size: Size,
        scale: f32,
        scene: SharedScene,
        actions: SharedActions,
        config: &PlayerConfig,
    ) -> InitResult<Self> {
        if size.is_degenerate() || scale.is_nan() || scale <= 0.0 {
            return Err(InitError::DegenerateGeometry {
                width: size.width,
                height: size.height,
                scale,
            });
        }

        let obstacle = Obstacle {
            name: "player",
            body_type: BodyType::Dynamic,
            material: BodyMaterial {
                density: config.density,
                friction: config.friction,
                restitution: config.restitution,
            },
            fixed_rotation: true,
            debug_color: Color::RED,
            dirty: true,
        };
        body.set_position(position);

        let (node, dropshadow) = {
            let mut scene = scene.borrow_mut();
            let node = scene.add_group(None, obstacle.name);
            scene.set_position(node, position * scale);
            let shadow = scene.add_capsule(node, size * scale, Color::new(0.0, 0.0, 0.0, 0.25));
            scene.set_position(shadow, Vec2::ZERO);
            (node, shadow)
        };

        let animations = config
            .anim_frames
            .iter()
            .map(|&n| AnimationClip::sequential(n, config.anim_duration))
            .collect();

        let mut player = Self {
            role,
            body,
            obstacle,
            motion: Motion {
                acceleration: config.acceleration,
                damping: config.damping,
                max_speed: config.max_speed,
            },
            size,
            scale,
            char_scale: config.char_scale,
            collision_sound: String::new(),
            scene,
            actions,
            node: Some(node),
            dropshadow: Some(dropshadow),
            sprite_nodes: Vec::new(),
            anim_frames: config.anim_frames,
            animations,
            cycles: [false; DIRECTION_COUNT],
            direction: Direction::Still,
            act_key: format!("{}_anim", role.sheet_prefix()),
        };
        player.sync_obstacle();
        debug!(role = ?role, ?position, "player created");
        Ok(player)
    }

    /// Creates one sprite node per direction under the player node. Only the
    /// still sprite starts visible.
    pub fn attach_sprites(&mut self, sheets: &[SpriteSheet; DIRECTION_COUNT], width: f32) {
        let Some(node) = self.node else {
            warn!(role = ?self.role, "sprites attached to a disposed player");
            return;
        };
        let mut scene = self.scene.borrow_mut();
        for id in self.sprite_nodes.drain(..) {
            scene.remove(id);
        }
        for (i, sheet) in sheets.iter().enumerate() {
            let frames = sheet.frames.max(1);
            if frames != self.anim_frames[i] {
                self.anim_frames[i] = frames;
                self.animations[i] = AnimationClip::sequential(frames, self.animations[i].duration);
            }
            let sprite = scene.add_sprite(node, &sheet.key, frames);
            scene.set_scale(sprite, self.char_scale);
            scene.set_position(sprite, Vec2::new(0.0, width / 2.5));
            scene.set_visible(sprite, false);
            self.sprite_nodes.push(sprite);
        }
        if let Some(&still) = self.sprite_nodes.get(Direction::Still.index()) {
            scene.set_visible(still, true);
        }
        self.direction = Direction::Still;
    }

    /// Releases every scene node and animation this player owns.
    pub fn dispose(&mut self) {
        self.actions.borrow_mut().remove(&self.act_key);
        let mut scene = self.scene.borrow_mut();
        for id in self.sprite_nodes.drain(..) {
            scene.remove(id);
        }
        if let Some(id) = self.dropshadow.take() {
            scene.remove(id);
        }
        if let Some(id) = self.node.take() {
            scene.remove(id);
        }
        self.animations.clear();
    }

    // ─── Motion ───

    /// Local authority: pushes the body toward `force` with damping and a
    /// speed cap. The physics engine integrates on its next step.
    pub fn apply_force(&mut self, force: Vec2) {
        self.body
            .apply_force_to_center(force * self.motion.acceleration, true);

        let velocity = self.body.linear_velocity();
        self.body
            .apply_force_to_center(velocity * -self.motion.damping, true);

        let max = self.motion.max_speed;
        if velocity.len_sq() >= max * max {
            self.body
                .set_linear_velocity(velocity.normalize_or_zero() * max);
        }
    }

    /// Network authority: mirrors a peer's position and animation state.
    pub fn apply_network(&mut self, position: Vec2, velocity: Vec2, _force: Vec2) {
        self.body.set_position(position);
        self.play_animation(velocity);
    }

    /// Pushes pending body settings, then moves the node to the body.
    /// Call after the physics engine has stepped.
    pub fn update(&mut self, _timestep: f32) {
        self.sync_obstacle();
        if let Some(node) = self.node {
            self.scene
                .borrow_mut()
                .set_position(node, self.body.position() * self.scale);
        }
    }

    fn sync_obstacle(&mut self) {
        if !self.obstacle.dirty {
            return;
        }
        self.body.set_body_type(self.obstacle.body_type);
        self.body.set_material(self.obstacle.material);
        self.body.set_fixed_rotation(self.obstacle.fixed_rotation);
        self.obstacle.dirty = false;
    }

    // ─── Animation ───

    /// Shows and advances the clip for `movement`.
    ///
    /// Moving frames ping-pong between the first and last frame; standing
    /// still resets the still clip to frame 0.
    pub fn play_animation(&mut self, movement: Vec2) {
        let key = if movement.len_sq() == 0.0 {
            Direction::Still
        } else {
            find_direction(movement)
        };
        self.direction = key;

        let Some(&sprite) = self.sprite_nodes.get(key.index()) else {
            return;
        };
        let mut scene = self.scene.borrow_mut();
        for &s in &self.sprite_nodes {
            scene.set_visible(s, false);
        }
        self.actions
            .borrow_mut()
            .activate(&self.act_key, &self.animations[key.index()], sprite);
        scene.set_visible(sprite, true);

        if key == Direction::Still {
            scene.set_frame(sprite, 0);
            return;
        }

        let frame = scene.frame(sprite);
        let last = scene.frame_count(sprite).saturating_sub(1);
        let cycle = &mut self.cycles[key.index()];
        if frame >= last {
            *cycle = false;
        } else if frame == 0 {
            *cycle = true;
        }
        let next = if *cycle {
            (frame + 1).min(last)
        } else {
            frame.saturating_sub(1)
        };
        scene.set_frame(sprite, next);
    }

    // ─── Accessors ───

    pub fn role(&self) -> PlayerRole {
        self.role
    }

    pub fn name(&self) -> &str {
        self.obstacle.name
    }

    pub fn debug_color(&self) -> Color {
        self.obstacle.debug_color
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.linear_velocity()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Key this player's animation runs under.
    pub fn act_key(&self) -> &str {
        &self.act_key
    }

    pub fn sprite_node(&self, direction: Direction) -> Option<NodeId> {
        self.sprite_nodes.get(direction.index()).copied()
    }

    pub fn collision_sound(&self) -> &str {
        &self.collision_sound
    }

    pub fn set_collision_sound(&mut self, key: impl Into<String>) {
        self.collision_sound = key.into();
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    /// The body, for the physics engine to step.
    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }
}
