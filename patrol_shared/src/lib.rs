//! `patrol_shared`
//!
//! Libraries shared by the mall patrol client crates.
//!
//! Design goals:
//! - Engine services (physics, scene graph, animation, audio) sit behind
//!   traits so gameplay code can run headless.
//! - Shared managers are injected as [`Shared`] handles, never globals.
//! - No `unsafe`.

use std::{cell::RefCell, rc::Rc};

pub mod animation;
pub mod audio;
pub mod config;
pub mod error;
pub mod event;
pub mod level;
pub mod math;
pub mod net;
pub mod physics;
pub mod render;
pub mod resources;
pub mod role;
pub mod ui;

/// A single-threaded shared handle to an engine manager.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
