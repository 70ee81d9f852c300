//! Scene graph abstraction.
//!
//! Gameplay code never owns engine nodes; it holds [`NodeId`] handles and
//! drives them through [`SceneGraph`]. [`HeadlessScene`] keeps the node tree
//! in memory for tests and the demo driver.

use std::collections::BTreeMap;

use crate::math::{Color, Size, Vec2};

/// Opaque scene node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Transform-only container.
    Group { name: String },
    /// Filled capsule polygon.
    Capsule { size: Size, color: Color },
    /// Single-row film strip.
    Sprite { sheet: String, frames: usize, frame: usize },
}

/// Scene graph operations used by gameplay code.
pub trait SceneGraph {
    /// Adds a container node; `None` attaches it to the scene root.
    fn add_group(&mut self, parent: Option<NodeId>, name: &str) -> NodeId;
    fn add_capsule(&mut self, parent: NodeId, size: Size, color: Color) -> NodeId;
    fn add_sprite(&mut self, parent: NodeId, sheet: &str, frames: usize) -> NodeId;
    fn set_position(&mut self, node: NodeId, position: Vec2);
    fn position(&self, node: NodeId) -> Option<Vec2>;
    fn set_scale(&mut self, node: NodeId, scale: f32);
    fn set_visible(&mut self, node: NodeId, visible: bool);
    fn is_visible(&self, node: NodeId) -> bool;
    /// Sets the sprite frame, clamped to the strip. Ignored for non-sprites.
    fn set_frame(&mut self, node: NodeId, frame: usize);
    fn frame(&self, node: NodeId) -> usize;
    fn frame_count(&self, node: NodeId) -> usize;
    /// Removes a node and all of its descendants.
    fn remove(&mut self, node: NodeId);
}

/// Stored node state.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub position: Vec2,
    pub scale: f32,
    pub visible: bool,
}

/// In-memory scene graph.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next_id: u64,
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(id, _)| *id)
    }

    fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                parent,
                kind,
                position: Vec2::ZERO,
                scale: 1.0,
                visible: true,
            },
        );
        id
    }
}

impl SceneGraph for HeadlessScene {
    fn add_group(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        self.insert(
            parent,
            NodeKind::Group {
                name: name.to_string(),
            },
        )
    }

    fn add_capsule(&mut self, parent: NodeId, size: Size, color: Color) -> NodeId {
        self.insert(Some(parent), NodeKind::Capsule { size, color })
    }

    fn add_sprite(&mut self, parent: NodeId, sheet: &str, frames: usize) -> NodeId {
        self.insert(
            Some(parent),
            NodeKind::Sprite {
                sheet: sheet.to_string(),
                frames: frames.max(1),
                frame: 0,
            },
        )
    }

    fn set_position(&mut self, node: NodeId, position: Vec2) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.position = position;
        }
    }

    fn position(&self, node: NodeId) -> Option<Vec2> {
        self.nodes.get(&node).map(|n| n.position)
    }

    fn set_scale(&mut self, node: NodeId, scale: f32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.scale = scale;
        }
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.visible = visible;
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.visible)
    }

    fn set_frame(&mut self, node: NodeId, frame: usize) {
        if let Some(SceneNode {
            kind: NodeKind::Sprite { frames, frame: f, .. },
            ..
        }) = self.nodes.get_mut(&node)
        {
            *f = frame.min(*frames - 1);
        }
    }

    fn frame(&self, node: NodeId) -> usize {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Sprite { frame, .. }) => *frame,
            _ => 0,
        }
    }

    fn frame_count(&self, node: NodeId) -> usize {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Sprite { frames, .. }) => *frames,
            _ => 0,
        }
    }

    fn remove(&mut self, node: NodeId) {
        let mut doomed = vec![node];
        while let Some(id) = doomed.pop() {
            if self.nodes.remove(&id).is_some() {
                doomed.extend(self.children(id).collect::<Vec<_>>());
            }
        }
    }
}
