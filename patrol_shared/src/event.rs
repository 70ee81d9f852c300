//! Event and messaging system.
//!
//! Host callbacks never touch gameplay state directly. They push into a
//! typed [`FrameQueue`], and the owning controller drains it once per frame.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    time::Instant,
};

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Identifies one finger for the lifetime of its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TouchId(pub u64);

/// A raw touch sample as delivered by the host input system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub id: TouchId,
    /// Position in touch (display) coordinates.
    pub position: Vec2,
    pub timestamp: Instant,
}

impl TouchEvent {
    pub fn new(id: TouchId, position: Vec2, timestamp: Instant) -> Self {
        Self {
            id,
            position,
            timestamp,
        }
    }
}

/// Touch lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
}

/// A touch callback captured for processing at the next frame boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedTouch {
    pub phase: TouchPhase,
    pub event: TouchEvent,
}

/// Typed per-frame event queue.
#[derive(Default)]
pub struct FrameQueue {
    queues: HashMap<TypeId, Box<dyn Any>>,
}

impl FrameQueue {
    /// Appends an event to the queue for its type.
    pub fn push<E: 'static>(&mut self, e: E) {
        let q = self
            .queues
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<E>::new()));
        if let Some(q) = q.downcast_mut::<Vec<E>>() {
            q.push(e);
        }
    }

    /// Takes all queued events of a type, oldest first.
    pub fn drain<E: 'static>(&mut self) -> Vec<E> {
        self.queues
            .remove(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast::<Vec<E>>().ok())
            .map(|boxed| *boxed)
            .unwrap_or_default()
    }

    /// Number of pending events of a type.
    pub fn pending<E: 'static>(&self) -> usize {
        self.queues
            .get(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<E>>())
            .map_or(0, Vec::len)
    }

    /// Drops every pending event.
    pub fn clear(&mut self) {
        self.queues.clear();
    }
}
