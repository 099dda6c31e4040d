//! Spawn contexts
//!
//! A context is created per placement of a definition and consulted by the
//! host every tick (respawning), once (immediate), or once-after-delay.

mod random;
mod spawn_context;


pub use spawn_context::{ConditionState, PIXEL_SCALE, SpawnContext};
