//! Per-placement spawn controller
//!
//! A `SpawnContext` binds one definition to one place in the world. It
//! applies randomization, gates spawns on the definition's condition, drives
//! the delayed and respawning timers, and keeps track of every sprite it has
//! handed to the host so they can be torn down together.

use std::sync::Arc;
use std::time::Duration;

use hashbrown::HashSet;
use rand::Rng;
use tas_types::Vec2;

use crate::actions::{ActionRunner, run_actions};
use crate::definitions::{RandomRange, TasDefinition};
use crate::host::{ConditionEvaluator, DelayScheduler, SpriteHost, SpritePool};
use crate::scheduler::DelayedSpawn;
use crate::sprite::{ContextId, SpawnedSprite, SpriteId, TasSprite};

use super::random::{draw_f64, draw_i32, draw_vec2, sample_visual};

/// Host sprites are drawn at 4x their source pixel size
pub const PIXEL_SCALE: f32 = 4.0;

/// Host tile size in pixels
const TILE_SIZE: f32 = 64.0;

/// Divisor mapping a y coordinate to draw layer depth
const SORT_Y_DIVISOR: f32 = 10000.0;

/// Per-tile x bias that breaks ties between sprites on the same row
const SORT_X_BIAS: f32 = 0.00001;

/// Cached result of the spawn condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionState {
    /// Not evaluated since the last reset
    #[default]
    Unknown,
    True,
    False,
}

impl From<bool> for ConditionState {
    fn from(passed: bool) -> Self {
        if passed { Self::True } else { Self::False }
    }
}

/// Spawn controller for one placement of a definition
#[derive(Debug)]
pub struct SpawnContext {
    id: ContextId,
    definition: Arc<TasDefinition>,

    // ─── Placement ──────────────────────────────────────────────────────────
    /// World position in host pixels
    position: Vec2,
    /// Per-spawn positional jitter, lower bound
    pos_offset_min: Vec2,
    /// Per-spawn positional jitter, upper bound
    pos_offset_max: Vec2,

    // ─── Overrides (take precedence over the definition) ────────────────────
    override_loops: Option<i32>,
    override_draw_layer: Option<f32>,
    override_rotation: Option<f32>,

    // ─── Timers (milliseconds) ──────────────────────────────────────────────
    spawn_timeout: f64,
    condition_timeout: f64,
    not_spawned_yet: bool,

    condition: ConditionState,

    /// Sprites spawned by this context that the host still renders
    spawned: HashSet<SpriteId>,
}

impl SpawnContext {
    pub fn new(definition: Arc<TasDefinition>, position: Vec2) -> Self {
        Self {
            id: ContextId::next(),
            definition,
            position,
            pos_offset_min: Vec2::ZERO,
            pos_offset_max: Vec2::ZERO,
            override_loops: None,
            override_draw_layer: None,
            override_rotation: None,
            spawn_timeout: 0.0,
            condition_timeout: 0.0,
            not_spawned_yet: true,
            condition: ConditionState::Unknown,
            spawned: HashSet::new(),
        }
    }

    /// Jitter each spawn's position uniformly within `[min, max)`
    pub fn with_position_jitter(mut self, min: Vec2, max: Vec2) -> Self {
        self.pos_offset_min = min;
        self.pos_offset_max = max;
        self
    }

    pub fn with_loops(mut self, loops: i32) -> Self {
        self.override_loops = Some(loops);
        self
    }

    pub fn with_draw_layer(mut self, layer_depth: f32) -> Self {
        self.override_draw_layer = Some(layer_depth);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.override_rotation = Some(rotation);
        self
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn definition(&self) -> &TasDefinition {
        &self.definition
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn condition_state(&self) -> ConditionState {
        self.condition
    }

    /// Number of live sprites spawned by this context
    pub fn spawned_count(&self) -> usize {
        self.spawned.len()
    }

    pub fn is_spawned(&self, id: SpriteId) -> bool {
        self.spawned.contains(&id)
    }

    pub fn spawned(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.spawned.iter().copied()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Creation
    // ═══════════════════════════════════════════════════════════════════════

    /// Build one sprite from the definition with fresh random draws.
    ///
    /// Does not check the condition or register the sprite.
    pub fn create<R: Rng + ?Sized>(&self, rng: &mut R) -> TasSprite {
        let def = &*self.definition;
        let rand = match def.rand_range() {
            Some((min, max)) => sample_visual(rng, min, max),
            None => RandomRange::default(),
        };

        let jitter = draw_vec2(rng, self.pos_offset_min, self.pos_offset_max);
        let position =
            self.position + jitter + (def.position_offset + rand.position_offset) * PIXEL_SCALE;

        let base_depth = self
            .override_draw_layer
            .or(def.layer_depth)
            .unwrap_or(0.0);

        TasSprite {
            texture: def.texture.clone(),
            source_rect: def.source_rect,
            interval: def.interval,
            frames: def.frames,
            loops: self.override_loops.unwrap_or(def.loops),
            position,
            flicker: def.flicker,
            flip: def.flip,
            layer_depth: layer_depth(base_depth, def.sort_offset + rand.sort_offset, position),
            alpha_fade: def.alpha_fade + rand.alpha_fade,
            color: def.tint(),
            scale: (def.scale + rand.scale) * PIXEL_SCALE,
            scale_change: def.scale_change + rand.scale_change,
            scale_change_change: def.scale_change_change + rand.scale_change_change,
            rotation: self.override_rotation.unwrap_or(def.rotation) + rand.rotation,
            rotation_change: def.rotation_change + rand.rotation_change,
            alpha: def.alpha + rand.alpha,
            ping_pong: def.ping_pong,
            motion: def.motion + rand.motion,
            acceleration: def.acceleration + rand.acceleration,
            acceleration_change: def.acceleration_change + rand.acceleration_change,
        }
    }

    /// Create a sprite if the (cached) condition passes
    pub fn try_create_conditionally<E, R>(
        &mut self,
        evaluator: &mut E,
        eval_ctx: &E::Context,
        rng: &mut R,
    ) -> Option<TasSprite>
    where
        E: ConditionEvaluator,
        R: Rng + ?Sized,
    {
        if self.check_condition(evaluator, eval_ctx) {
            Some(self.create(rng))
        } else {
            None
        }
    }

    /// Evaluate the condition only when nothing is cached
    fn check_condition<E: ConditionEvaluator>(
        &mut self,
        evaluator: &mut E,
        eval_ctx: &E::Context,
    ) -> bool {
        match self.condition {
            ConditionState::True => true,
            ConditionState::False => false,
            ConditionState::Unknown => {
                let passed = match self.definition.condition_expression() {
                    Some(expression) => evaluator.evaluate(expression, eval_ctx),
                    None => true,
                };
                self.condition = passed.into();
                passed
            }
        }
    }

    fn register<H: SpriteHost + ?Sized>(&mut self, sprite: TasSprite, host: &mut H) -> SpriteId {
        let id = SpriteId::next();
        self.spawned.insert(id);
        host.add_sprite(SpawnedSprite {
            id,
            context: self.id,
            sprite,
        });
        id
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Spawn strategies
    // ═══════════════════════════════════════════════════════════════════════

    /// Spawn once, right now. Returns whether a sprite was spawned.
    pub fn try_create<E, R, H>(
        &mut self,
        evaluator: &mut E,
        eval_ctx: &E::Context,
        rng: &mut R,
        host: &mut H,
    ) -> bool
    where
        E: ConditionEvaluator,
        R: Rng + ?Sized,
        H: SpriteHost + ?Sized,
    {
        match self.try_create_conditionally(evaluator, eval_ctx, rng) {
            Some(sprite) => {
                self.register(sprite, host);
                true
            }
            None => false,
        }
    }

    /// Check the condition now and schedule the spawn after the definition's delay.
    ///
    /// Requires a positive `spawn_delay`. Returns whether a spawn was scheduled.
    /// The scheduled spawn completes through [`fire_delayed`](Self::fire_delayed).
    pub fn try_create_delayed<E, R, S>(
        &mut self,
        evaluator: &mut E,
        eval_ctx: &E::Context,
        rng: &mut R,
        scheduler: &mut S,
    ) -> bool
    where
        E: ConditionEvaluator,
        R: Rng + ?Sized,
        S: DelayScheduler + ?Sized,
    {
        if self.definition.spawn_delay <= 0 {
            return false;
        }
        if !self.check_condition(evaluator, eval_ctx) {
            return false;
        }

        let delay_ms = self.draw_spawn_delay(rng).max(0) as u32;
        scheduler.schedule_after(delay_ms, DelayedSpawn { context: self.id });
        true
    }

    /// Complete a delayed spawn once its delay has elapsed.
    ///
    /// Spawns addressed to another context are ignored.
    pub fn fire_delayed<R, H>(&mut self, spawn: DelayedSpawn, rng: &mut R, host: &mut H) -> bool
    where
        R: Rng + ?Sized,
        H: SpriteHost + ?Sized,
    {
        if spawn.context != self.id {
            tracing::debug!(
                context = spawn.context.raw(),
                owner = self.id.raw(),
                "Ignoring delayed spawn for another context"
            );
            return false;
        }
        let sprite = self.create(rng);
        self.register(sprite, host);
        true
    }

    /// Advance the respawn timers by one host tick. Returns whether a sprite
    /// was spawned this tick.
    ///
    /// The first call only arms the initial spawn delay. After that, each time
    /// the spawn timer runs out it is re-armed with the spawn interval and a
    /// spawn is attempted. With a positive `condition_interval` the cached
    /// condition is dropped at most once per interval so it is re-evaluated.
    pub fn try_create_respawning<E, R, H>(
        &mut self,
        elapsed: Duration,
        evaluator: &mut E,
        eval_ctx: &E::Context,
        rng: &mut R,
        host: &mut H,
    ) -> bool
    where
        E: ConditionEvaluator,
        R: Rng + ?Sized,
        H: SpriteHost + ?Sized,
    {
        if self.spawn_timeout > 0.0 {
            let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
            self.spawn_timeout -= elapsed_ms;
            if self.condition_timeout > 0.0 {
                self.condition_timeout -= elapsed_ms;
            }
            return false;
        }

        if self.not_spawned_yet {
            self.not_spawned_yet = false;
            self.spawn_timeout = self.draw_spawn_delay(rng) as f64;
            return false;
        }

        self.spawn_timeout = self.draw_spawn_interval(rng);

        let condition_interval = self.definition.condition_interval;
        if condition_interval > 0.0
            && self.condition != ConditionState::Unknown
            && self.condition_timeout <= 0.0
        {
            self.condition = ConditionState::Unknown;
            self.condition_timeout = condition_interval;
        }

        self.try_create(evaluator, eval_ctx, rng, host)
    }

    fn draw_spawn_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let def = &*self.definition;
        let jitter = def
            .rand_range()
            .map(|(min, max)| draw_i32(rng, min.spawn_delay, max.spawn_delay))
            .unwrap_or(0);
        def.spawn_delay.saturating_add(jitter)
    }

    fn draw_spawn_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let def = &*self.definition;
        let jitter = def
            .rand_range()
            .map(|(min, max)| draw_f64(rng, min.spawn_interval, max.spawn_interval))
            .unwrap_or(0.0);
        def.spawn_interval + jitter
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Host notification that a sprite reached its natural end of life.
    ///
    /// Runs the definition's end actions for sprites this context still owns.
    /// Returns false for unknown or already removed sprites.
    pub fn on_sprite_expired(&mut self, id: SpriteId, runner: &mut dyn ActionRunner) -> bool {
        if !self.spawned.remove(&id) {
            return false;
        }
        run_actions(runner, self.definition.parsed_end_actions());
        true
    }

    /// Forcibly remove every live sprite spawned by this context.
    ///
    /// End actions only run here when the definition sets `end_actions_on_remove`.
    pub fn remove_all_spawned<H>(
        &mut self,
        host: &mut H,
        mut pool: Option<&mut dyn SpritePool>,
        runner: &mut dyn ActionRunner,
    ) where
        H: SpriteHost + ?Sized,
    {
        let definition = &self.definition;
        let run_end_actions = definition.end_actions_on_remove;

        let mut ids: Vec<SpriteId> = self.spawned.drain().collect();
        ids.sort();

        for &id in &ids {
            if run_end_actions {
                run_actions(runner, definition.parsed_end_actions());
            }
            host.unload_sprite(id);
            host.remove_sprite(id);
            if let Some(pool) = pool.as_mut() {
                pool.give_back(id);
            }
        }

        if !ids.is_empty() {
            tracing::debug!(context = self.id.raw(), count = ids.len(), "Removed spawned sprites");
        }
    }
}

/// Draw layer for a sprite.
///
/// With a positive sort offset the depth is biased by position so sprites
/// sort against the scene; otherwise the base depth is used as-is.
fn layer_depth(base: f32, sort_offset: f32, position: Vec2) -> f32 {
    if sort_offset > 0.0 {
        base + (position.y + sort_offset) / SORT_Y_DIVISOR + position.x / TILE_SIZE * SORT_X_BIAS
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_depth_gated_on_positive_sort_offset() {
        let pos = Vec2::new(640.0, 2000.0);
        assert_eq!(layer_depth(0.5, 0.0, pos), 0.5);
        assert_eq!(layer_depth(0.5, -3.0, pos), 0.5);

        let biased = layer_depth(0.0, 64.0, pos);
        let expected = (2000.0 + 64.0) / 10000.0 + 10.0 * 0.00001;
        assert!((biased - expected).abs() < 1e-6);
    }
}
