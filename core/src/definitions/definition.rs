//! Sprite definition types
//!
//! Definitions are templates loaded from data files that describe one kind
//! of spawnable temporary animated sprite and how to randomize it.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tas_types::{Rgba, SourceRect, Vec2, parse_color};

use crate::actions::{ParsedAction, parse_actions};

/// Timing fields use -1 for "disabled"
pub const DISABLED: i32 = -1;

// ═══════════════════════════════════════════════════════════════════════════
// Random Range
// ═══════════════════════════════════════════════════════════════════════════

/// Width of a uniform random perturbation, one delta per randomizable field.
///
/// Used in pairs: `rand_min` is the inclusive lower bound and `rand_max` the
/// exclusive upper bound of the draw added to the matching base value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RandomRange {
    pub sort_offset: f32,
    pub alpha: f32,
    pub alpha_fade: f32,
    pub scale: f32,
    pub scale_change: f32,
    pub scale_change_change: f32,
    pub rotation: f32,
    pub rotation_change: f32,
    pub motion: Vec2,
    pub acceleration: Vec2,
    pub acceleration_change: Vec2,
    pub position_offset: Vec2,
    /// Milliseconds
    pub spawn_interval: f64,
    /// Milliseconds
    pub spawn_delay: i32,
}

// ═══════════════════════════════════════════════════════════════════════════
// Definition
// ═══════════════════════════════════════════════════════════════════════════

/// Definition of a temporary animated sprite (loaded from data files).
///
/// The id is the key in the owning mapping, not a field. Many spawn contexts
/// may share one definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TasDefinition {
    // ─── Animation ──────────────────────────────────────────────────────────
    /// Texture asset name
    pub texture: String,
    pub source_rect: SourceRect,
    /// Milliseconds per frame
    pub interval: f32,
    pub frames: i32,
    pub loops: i32,
    pub ping_pong: bool,
    pub flicker: bool,
    pub flip: bool,

    // ─── Appearance ─────────────────────────────────────────────────────────
    /// Tint color string (None = white)
    pub color: Option<String>,
    pub alpha: f32,
    pub alpha_fade: f32,
    pub scale: f32,
    pub scale_change: f32,
    pub scale_change_change: f32,
    pub rotation: f32,
    pub rotation_change: f32,

    // ─── Placement ──────────────────────────────────────────────────────────
    /// Offset from the placement, in sprite pixels
    pub position_offset: Vec2,
    pub sort_offset: f32,
    /// Explicit draw layer (None = derive from position)
    pub layer_depth: Option<f32>,

    // ─── Motion ─────────────────────────────────────────────────────────────
    pub motion: Vec2,
    pub acceleration: Vec2,
    pub acceleration_change: Vec2,

    // ─── Spawning ───────────────────────────────────────────────────────────
    /// Condition expression checked before spawning (None = always)
    pub condition: Option<String>,
    /// Milliseconds between respawns
    pub spawn_interval: f64,
    /// Milliseconds before the first spawn
    pub spawn_delay: i32,
    /// Milliseconds between forced condition re-checks
    pub condition_interval: f64,

    // ─── End of life ────────────────────────────────────────────────────────
    /// Actions run when a spawned sprite expires
    pub end_actions: Vec<String>,
    /// Also run end actions when sprites are forcibly removed
    pub end_actions_on_remove: bool,

    // ─── Randomization ──────────────────────────────────────────────────────
    pub rand_min: Option<RandomRange>,
    pub rand_max: Option<RandomRange>,

    /// Memoized `end_actions`, filled by [`parsed_end_actions`](Self::parsed_end_actions)
    #[serde(skip)]
    pub(crate) parsed_end_actions: OnceLock<Vec<ParsedAction>>,
}

impl Default for TasDefinition {
    fn default() -> Self {
        Self {
            texture: String::new(),
            source_rect: SourceRect::default(),
            interval: 0.0,
            frames: 0,
            loops: 0,
            ping_pong: false,
            flicker: false,
            flip: false,
            color: None,
            alpha: 1.0,
            alpha_fade: 0.0,
            scale: 1.0,
            scale_change: 0.0,
            scale_change_change: 0.0,
            rotation: 0.0,
            rotation_change: 0.0,
            position_offset: Vec2::ZERO,
            sort_offset: 0.0,
            layer_depth: None,
            motion: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            acceleration_change: Vec2::ZERO,
            condition: None,
            spawn_interval: DISABLED as f64,
            spawn_delay: DISABLED,
            condition_interval: DISABLED as f64,
            end_actions: Vec::new(),
            end_actions_on_remove: false,
            rand_min: None,
            rand_max: None,
            parsed_end_actions: OnceLock::new(),
        }
    }
}

impl TasDefinition {
    /// A definition can only be spawned with at least one frame and a positive frame interval
    pub fn is_valid(&self) -> bool {
        self.frames > 0 && self.interval > 0.0
    }

    /// Both randomization bounds are present
    pub fn has_rand(&self) -> bool {
        self.rand_min.is_some() && self.rand_max.is_some()
    }

    /// The `(min, max)` randomization pair, if both bounds are present
    pub fn rand_range(&self) -> Option<(&RandomRange, &RandomRange)> {
        self.rand_min.as_ref().zip(self.rand_max.as_ref())
    }

    /// Condition expression, treating blank strings as no condition
    pub fn condition_expression(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Parsed end actions. Parsed once on first use; unparsable entries are dropped.
    pub fn parsed_end_actions(&self) -> &[ParsedAction] {
        self.parsed_end_actions
            .get_or_init(|| parse_actions(&self.end_actions))
    }

    pub fn has_end_actions(&self) -> bool {
        !self.parsed_end_actions().is_empty()
    }

    /// Tint color, white when unset or unparsable
    pub fn tint(&self) -> Rgba {
        let Some(color) = self.color.as_deref() else {
            return Rgba::WHITE;
        };
        parse_color(color).unwrap_or_else(|e| {
            tracing::debug!(color, error = %e, "Unparsable tint color, using white");
            Rgba::WHITE
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_timing() {
        let def: TasDefinition =
            serde_json::from_str(r#"{ "Frames": 4, "Interval": 100 }"#).unwrap();
        assert_eq!(def.spawn_delay, DISABLED);
        assert_eq!(def.spawn_interval, -1.0);
        assert_eq!(def.condition_interval, -1.0);
        assert_eq!(def.scale, 1.0);
        assert_eq!(def.alpha, 1.0);
        assert!(def.is_valid());
    }

    #[test]
    fn test_validity_requires_frames_and_interval() {
        let no_frames = TasDefinition {
            frames: 0,
            interval: 100.0,
            ..Default::default()
        };
        let no_interval = TasDefinition {
            frames: 3,
            interval: 0.0,
            ..Default::default()
        };
        assert!(!no_frames.is_valid());
        assert!(!no_interval.is_valid());
    }

    #[test]
    fn test_has_rand_needs_both_bounds() {
        let mut def = TasDefinition {
            rand_min: Some(RandomRange::default()),
            ..Default::default()
        };
        assert!(!def.has_rand());
        assert!(def.rand_range().is_none());

        def.rand_max = Some(RandomRange {
            scale: 1.0,
            ..Default::default()
        });
        assert!(def.has_rand());
    }

    #[test]
    fn test_blank_condition_is_none() {
        let def = TasDefinition {
            condition: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(def.condition_expression(), None);
    }

    #[test]
    fn test_end_actions_parsed_once_and_bad_entries_dropped() {
        let def = TasDefinition {
            end_actions: vec![
                "PlaySound crystal".to_string(),
                "".to_string(),
                "Broken \"quote".to_string(),
            ],
            ..Default::default()
        };
        let first = def.parsed_end_actions().as_ptr();
        assert_eq!(def.parsed_end_actions().len(), 1);
        assert_eq!(def.parsed_end_actions()[0].name, "PlaySound");
        assert_eq!(first, def.parsed_end_actions().as_ptr());
    }

    #[test]
    fn test_tint_falls_back_to_white() {
        let def = TasDefinition {
            color: Some("not a color".to_string()),
            ..Default::default()
        };
        assert_eq!(def.tint(), Rgba::WHITE);

        let def = TasDefinition {
            color: Some("Red".to_string()),
            ..Default::default()
        };
        assert_eq!(def.tint(), Rgba::rgb(255, 0, 0));
    }
}
