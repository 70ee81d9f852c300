//! Initialization errors.
//!
//! Setup routines for input, players and scenes fail only on missing
//! dependencies or degenerate geometry. Callers check and abort setup.

use thiserror::Error;

/// Setup failure for a gameplay component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitError {
    /// A bounds rectangle or display size with non-positive extent.
    #[error("degenerate bounds: {width}x{height}")]
    DegenerateBounds { width: f32, height: f32 },

    /// A body size or draw scale that cannot describe a player.
    #[error("degenerate geometry: size {width}x{height}, scale {scale}")]
    DegenerateGeometry { width: f32, height: f32, scale: f32 },

    /// A required asset was not registered.
    #[error("missing asset: {0}")]
    MissingAsset(String),
}

pub type InitResult<T> = std::result::Result<T, InitError>;
