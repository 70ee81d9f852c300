//! Animation actions.
//!
//! Clips are frame sequences with a duration. The action manager owns
//! timing; gameplay code only activates a clip on a node under a key.

use std::collections::HashMap;

use crate::render::NodeId;

/// A film-strip animation: frame indices played over `duration` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub frames: Vec<usize>,
    pub duration: f32,
}

impl AnimationClip {
    /// Clip that plays frames `0..count` in order.
    pub fn sequential(count: usize, duration: f32) -> Self {
        Self {
            frames: (0..count).collect(),
            duration,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Shared animation scheduler.
pub trait ActionManager {
    /// Starts (or restarts) `clip` on `node` under `key`, replacing whatever ran there.
    fn activate(&mut self, key: &str, clip: &AnimationClip, node: NodeId);
    fn is_active(&self, key: &str) -> bool;
    /// Removes the action under `key`, if any.
    fn remove(&mut self, key: &str);
    /// Advances all running actions.
    fn update(&mut self, dt: f32);
}

/// A running action.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningAction {
    pub node: NodeId,
    pub clip: AnimationClip,
    pub elapsed: f32,
}

/// In-memory action manager. Finished actions are dropped on update.
#[derive(Debug, Default)]
pub struct HeadlessActions {
    running: HashMap<String, RunningAction>,
    activations: usize,
}

impl HeadlessActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running(&self, key: &str) -> Option<&RunningAction> {
        self.running.get(key)
    }

    /// Total number of `activate` calls seen.
    pub fn activations(&self) -> usize {
        self.activations
    }
}

impl ActionManager for HeadlessActions {
    fn activate(&mut self, key: &str, clip: &AnimationClip, node: NodeId) {
        self.activations += 1;
        self.running.insert(
            key.to_string(),
            RunningAction {
                node,
                clip: clip.clone(),
                elapsed: 0.0,
            },
        );
    }

    fn is_active(&self, key: &str) -> bool {
        self.running.contains_key(key)
    }

    fn remove(&mut self, key: &str) {
        self.running.remove(key);
    }

    fn update(&mut self, dt: f32) {
        for action in self.running.values_mut() {
            action.elapsed += dt;
        }
        self.running.retain(|_, a| a.elapsed < a.clip.duration);
    }
}
