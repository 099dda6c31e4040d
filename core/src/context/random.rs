//! Uniform draws between two random-range bounds

use rand::Rng;
use tas_types::Vec2;

use crate::definitions::RandomRange;

/// Uniform draw from `[min, max)`. Equal bounds yield `min`; inverted bounds are swapped.
///
/// Bounds whose span is not finite (too far apart, infinite or NaN) yield `min`.
pub(crate) fn draw_f32<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    let (low, high) = if max < min { (max, min) } else { (min, max) };
    if low < high && (high - low).is_finite() {
        rng.gen_range(low..high)
    } else {
        min
    }
}

pub(crate) fn draw_f64<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let (low, high) = if max < min { (max, min) } else { (min, max) };
    if low < high && (high - low).is_finite() {
        rng.gen_range(low..high)
    } else {
        min
    }
}

pub(crate) fn draw_i32<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if min < max {
        rng.gen_range(min..max)
    } else if max < min {
        rng.gen_range(max..min)
    } else {
        min
    }
}

/// Per-axis uniform draw
pub(crate) fn draw_vec2<R: Rng + ?Sized>(rng: &mut R, min: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(draw_f32(rng, min.x, max.x), draw_f32(rng, min.y, max.y))
}

/// Draw every visual field of a range pair independently.
///
/// Timing fields are left at zero; they are drawn when the timers are armed.
pub(crate) fn sample_visual<R: Rng + ?Sized>(
    rng: &mut R,
    min: &RandomRange,
    max: &RandomRange,
) -> RandomRange {
    RandomRange {
        sort_offset: draw_f32(rng, min.sort_offset, max.sort_offset),
        alpha: draw_f32(rng, min.alpha, max.alpha),
        alpha_fade: draw_f32(rng, min.alpha_fade, max.alpha_fade),
        scale: draw_f32(rng, min.scale, max.scale),
        scale_change: draw_f32(rng, min.scale_change, max.scale_change),
        scale_change_change: draw_f32(rng, min.scale_change_change, max.scale_change_change),
        rotation: draw_f32(rng, min.rotation, max.rotation),
        rotation_change: draw_f32(rng, min.rotation_change, max.rotation_change),
        motion: draw_vec2(rng, min.motion, max.motion),
        acceleration: draw_vec2(rng, min.acceleration, max.acceleration),
        acceleration_change: draw_vec2(rng, min.acceleration_change, max.acceleration_change),
        position_offset: draw_vec2(rng, min.position_offset, max.position_offset),
        spawn_interval: 0.0,
        spawn_delay: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_equal_bounds_do_not_consume_randomness() {
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        assert_eq!(draw_f32(&mut a, 2.0, 2.0), 2.0);
        assert_eq!(draw_i32(&mut a, 5, 5), 5);
        assert_eq!(draw_f32(&mut a, 0.0, 1.0), draw_f32(&mut b, 0.0, 1.0));
    }

    #[test]
    fn test_inverted_bounds_stay_inside() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            let v = draw_i32(&mut rng, 10, -10);
            assert!((-10..10).contains(&v));
        }
    }

    #[test]
    fn test_unbounded_float_spans_fall_back_to_min() {
        let mut rng = SmallRng::seed_from_u64(5);
        assert_eq!(draw_f32(&mut rng, -3e38, 3e38), -3e38);
        assert_eq!(draw_f32(&mut rng, 3e38, -3e38), 3e38);
        assert_eq!(draw_f32(&mut rng, 0.0, f32::INFINITY), 0.0);
        assert!(draw_f32(&mut rng, f32::NAN, 1.0).is_nan());
        assert_eq!(draw_f64(&mut rng, -1e308, 1e308), -1e308);
        assert_eq!(draw_f64(&mut rng, f64::NEG_INFINITY, 0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_int_draw_is_half_open() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut seen_max = i32::MIN;
        for _ in 0..500 {
            seen_max = seen_max.max(draw_i32(&mut rng, 0, 4));
        }
        assert_eq!(seen_max, 3);
    }
}
