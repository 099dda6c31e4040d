//! Shared value types for TAS extensions.
//!
//! Small plain-data types used by both the spawn core and the tooling.

pub mod color;
pub mod geometry;

pub use color::{ColorError, Rgba, parse_color};
pub use geometry::{SourceRect, Vec2};
