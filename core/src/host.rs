//! Capabilities the host game provides
//!
//! The spawn core never renders, evaluates conditions, or reads assets
//! itself. Hosts implement these traits and pass them in per call.

use std::path::PathBuf;
use std::rc::Rc;

use crate::definitions::{ConfigError, DefinitionMap};
use crate::sprite::{SpawnedSprite, SpriteId};

/// Host renderer that owns the lifetime of spawned sprites
pub trait SpriteHost {
    /// Start rendering a newly spawned sprite
    fn add_sprite(&mut self, sprite: SpawnedSprite);

    /// Release a sprite's resources ahead of removal
    fn unload_sprite(&mut self, id: SpriteId);

    /// Stop rendering a sprite
    fn remove_sprite(&mut self, id: SpriteId);
}

/// Host object pool that recycles removed sprites
pub trait SpritePool {
    fn give_back(&mut self, id: SpriteId);
}

/// Host condition evaluator
pub trait ConditionEvaluator {
    /// Game state the expression is evaluated against
    type Context: ?Sized;

    fn evaluate(&mut self, expression: &str, context: &Self::Context) -> bool;
}

/// Host delayed-callback facility.
///
/// The host must hand each scheduled [`DelayedSpawn`](crate::scheduler::DelayedSpawn)
/// back to the owning context once `delay_ms` of game time has passed.
pub trait DelayScheduler {
    fn schedule_after(&mut self, delay_ms: u32, spawn: crate::scheduler::DelayedSpawn);
}

// ═══════════════════════════════════════════════════════════════════════════
// Content pipeline
// ═══════════════════════════════════════════════════════════════════════════

/// Host content pipeline that produces definition maps by asset name
pub trait ContentSource {
    fn load_definitions(&self, asset_name: &str) -> Result<DefinitionMap, ConfigError>;
}

impl<T: ContentSource + ?Sized> ContentSource for Rc<T> {
    fn load_definitions(&self, asset_name: &str) -> Result<DefinitionMap, ConfigError> {
        (**self).load_definitions(asset_name)
    }
}

/// "Asset requested" notification. Handlers claim the asset by naming the
/// file it should be loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub name: String,
    source_file: Option<PathBuf>,
}

impl AssetRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_file: None,
        }
    }

    /// Whether this request is for the given asset name (case-insensitive)
    pub fn is_for(&self, asset_name: &str) -> bool {
        self.name.eq_ignore_ascii_case(asset_name)
    }

    /// Provide the asset from a file relative to the content root
    pub fn load_from_file(&mut self, relative_path: impl Into<PathBuf>) {
        self.source_file = Some(relative_path.into());
    }

    pub fn source_file(&self) -> Option<&PathBuf> {
        self.source_file.as_ref()
    }
}

pub type AssetRequestedHandler = Box<dyn Fn(&mut AssetRequest)>;
pub type AssetsInvalidatedHandler = Box<dyn Fn(&[String])>;

/// Host event registration API for asset lifecycle notifications
pub trait AssetEventRegistry {
    fn subscribe_asset_requested(&self, handler: AssetRequestedHandler);
    fn subscribe_assets_invalidated(&self, handler: AssetsInvalidatedHandler);
}
