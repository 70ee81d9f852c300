//! `patrol_client`
//!
//! Client-side gameplay:
//! - Touch input: virtual joystick, swipe and double-tap switch
//! - Player model: local force-driven and network-mirrored motion,
//!   directional sprite animation
//! - Menu scene: host/join choice
//! - Session glue and a scripted frame driver for headless runs

pub mod input;
pub mod menu;
pub mod player;
pub mod session;

pub use input::InputController;
pub use menu::{Choice, MenuScene};
pub use player::PlayerModel;
pub use session::GameSession;
