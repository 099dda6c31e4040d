pub mod actions;
pub mod cache;
pub mod context;
pub mod definitions;
pub mod host;
pub mod pipeline;
pub mod plugin_config;
pub mod scheduler;
pub mod sprite;

// Re-exports for convenience
pub use actions::{ActionRunner, ParsedAction};
pub use cache::DefinitionCache;
pub use context::{ConditionState, PIXEL_SCALE, SpawnContext};
pub use definitions::{ConfigError, DISABLED, DefinitionMap, RandomRange, TasDefinition};
pub use host::*;
pub use pipeline::FileContentPipeline;
pub use plugin_config::PluginConfig;
pub use scheduler::{DelayQueue, DelayedSpawn};
pub use sprite::{ContextId, SpawnedSprite, SpriteId, TasSprite};
