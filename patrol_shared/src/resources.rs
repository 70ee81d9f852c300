//! Asset registry.
//!
//! Loaded assets are stored by key and type. Loading itself (files, atlases,
//! hot reload) happens in the engine; this is the lookup side.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use crate::error::InitError;

/// A loaded sprite sheet (single-row film strip).
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub key: String,
    pub frames: usize,
}

impl SpriteSheet {
    pub fn new(key: impl Into<String>, frames: usize) -> Self {
        Self {
            key: key.into(),
            frames,
        }
    }
}

/// In-memory asset registry keyed by name and type.
#[derive(Default)]
pub struct AssetManager {
    by_type: HashMap<TypeId, HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset, replacing any previous asset of the same type and key.
    pub fn insert<T: 'static + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.by_type
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(key.into(), Arc::new(value));
    }

    /// Gets an asset by key.
    pub fn get<T: 'static + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|map| map.get(key))
            .and_then(|arc_any| arc_any.clone().downcast::<T>().ok())
    }

    /// Gets an asset or reports it missing.
    pub fn require<T: 'static + Send + Sync>(&self, key: &str) -> Result<Arc<T>, InitError> {
        self.get(key)
            .ok_or_else(|| InitError::MissingAsset(key.to_string()))
    }
}
