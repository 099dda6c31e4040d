//! Spawned sprite data handed to the host renderer

use std::sync::atomic::{AtomicU64, Ordering};

use tas_types::{Rgba, SourceRect, Vec2};

static NEXT_SPRITE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle for one spawned sprite, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u64);

impl SpriteId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SPRITE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Identity of a spawn context, used to route host callbacks back to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Fully resolved sprite parameters, every randomized field already applied.
///
/// Scale and position are in host pixels (definition values times
/// [`PIXEL_SCALE`](crate::context::PIXEL_SCALE)).
#[derive(Debug, Clone, PartialEq)]
pub struct TasSprite {
    pub texture: String,
    pub source_rect: SourceRect,
    pub interval: f32,
    pub frames: i32,
    pub loops: i32,
    pub position: Vec2,
    pub flicker: bool,
    pub flip: bool,
    pub layer_depth: f32,
    pub alpha_fade: f32,
    pub color: Rgba,
    pub scale: f32,
    pub scale_change: f32,
    pub scale_change_change: f32,
    pub rotation: f32,
    pub rotation_change: f32,
    pub alpha: f32,
    pub ping_pong: bool,
    pub motion: Vec2,
    pub acceleration: Vec2,
    pub acceleration_change: Vec2,
}

/// A sprite registered with its owning context, ready for the host.
///
/// The host reports natural expiry back to the context named by `context`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedSprite {
    pub id: SpriteId,
    pub context: ContextId,
    pub sprite: TasSprite,
}
