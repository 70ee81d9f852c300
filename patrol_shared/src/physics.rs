//! Physics abstraction.
//!
//! Gameplay code configures and reads bodies through [`RigidBody`]; the
//! engine owns integration and collision. [`SimBody`] is a headless capsule
//! body used by tests and the demo driver.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::math::{Size, Vec2};

/// How the physics engine treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Static,
    Kinematic,
    #[default]
    Dynamic,
}

/// Fixture material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMaterial {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BodyMaterial {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.0,
            restitution: 0.0,
        }
    }
}

/// A rigid body handle, in world units.
pub trait RigidBody {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn linear_velocity(&self) -> Vec2;
    fn set_linear_velocity(&mut self, velocity: Vec2);
    /// Accumulates a force for the next engine step.
    fn apply_force_to_center(&mut self, force: Vec2, wake: bool);
    fn set_body_type(&mut self, body_type: BodyType);
    fn set_material(&mut self, material: BodyMaterial);
    fn set_fixed_rotation(&mut self, fixed: bool);
}

/// Headless capsule body with semi-implicit Euler integration.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBody {
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    size: Size,
    body_type: BodyType,
    material: BodyMaterial,
    fixed_rotation: bool,
}

impl SimBody {
    pub fn capsule(position: Vec2, size: Size) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            size,
            body_type: BodyType::Dynamic,
            material: BodyMaterial::default(),
            fixed_rotation: false,
        }
    }

    /// Capsule area: two half discs on the short side plus the box between them.
    pub fn area(&self) -> f32 {
        let short = self.size.width.min(self.size.height);
        let long = self.size.width.max(self.size.height);
        let r = short / 2.0;
        PI * r * r + short * (long - short)
    }

    pub fn mass(&self) -> f32 {
        self.material.density * self.area()
    }

    /// Force accumulated since the last step.
    pub fn pending_force(&self) -> Vec2 {
        self.force
    }

    pub fn material(&self) -> BodyMaterial {
        self.material
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn fixed_rotation(&self) -> bool {
        self.fixed_rotation
    }

    /// Advances the body by `dt` seconds and clears the force accumulator.
    pub fn integrate(&mut self, dt: f32) {
        let force = std::mem::take(&mut self.force);
        if self.body_type != BodyType::Dynamic {
            return;
        }
        let mass = self.mass();
        if mass > 0.0 {
            self.velocity += force * (dt / mass);
        }
        self.position += self.velocity * dt;
    }
}

impl RigidBody for SimBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn linear_velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn apply_force_to_center(&mut self, force: Vec2, _wake: bool) {
        self.force += force;
    }

    fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
    }

    fn set_material(&mut self, material: BodyMaterial) {
        self.material = material;
    }

    fn set_fixed_rotation(&mut self, fixed: bool) {
        self.fixed_rotation = fixed;
    }
}
