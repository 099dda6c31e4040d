//! Sprite definitions
//!
//! This module provides:
//! - **Definitions**: Templates that describe a spawnable sprite (loaded from JSON/TOML)
//! - **Random ranges**: Per-field min/max perturbation bundles
//! - **Config loading**: Reading a definition file into an id -> definition map
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Definition (data file)                        │
//! │  "sparkle: Cursors 0,0 16x16, 4 frames, respawn every 250ms"     │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                     DefinitionCache lookup
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  SpawnContext (per placement)                    │
//! │  "sparkle at tile (12, 8), 3 sprites alive, next spawn in 80ms"  │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                        Host renderer
//! ```

mod config;
mod definition;

pub use config::{ConfigError, DefinitionMap, load_file};
pub use definition::{DISABLED, RandomRange, TasDefinition};
