use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::time::Duration;

use rand::Rng;

/// Fixed pointer position: the top of the wheel.
pub const POINTER_ANGLE: f64 = -FRAC_PI_2;

/// Landing keeps at least this fraction of a slice away from its boundaries.
const EDGE_MARGIN: f64 = 0.08;
const EDGE_JITTER: f64 = 0.02;
const CENTER_SPREAD: f64 = 0.30;

pub fn slice_angle(count: usize) -> f64 {
    TAU / count.max(1) as f64
}

pub fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Pointer position in slice units, unwrapped. It decreases as the wheel
/// turns forward, by one per boundary crossed.
pub fn pointer_slot(rotation: f64, slice: f64) -> f64 {
    (POINTER_ANGLE - rotation) / slice
}

/// Index of the slice under the pointer for a wheel of `count` slices.
pub fn index_under_pointer(rotation: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let slice = slice_angle(count);
    let angle = normalize(POINTER_ANGLE - rotation);
    let index = (angle / slice).floor() as usize;
    Some(index.min(count - 1))
}

/// Rotation that puts `offset` (fraction of a slice, relative to the center)
/// of slice `index` under the pointer.
pub fn target_rotation(index: usize, offset: f64, slice: f64) -> f64 {
    POINTER_ANGLE - (index as f64 + 0.5 + offset) * slice
}

/// Forward distance in [0, 2π) from `current` to `target`.
pub fn forward_delta(current: f64, target: f64) -> f64 {
    normalize(target - current)
}

pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Pick where inside the target slice the pointer stops, as an offset from
/// the slice center in slice units. Mostly near the center, sometimes hugging
/// an edge.
pub fn landing_offset<R: Rng>(rng: &mut R, near_edge_chance: f64) -> f64 {
    let max_offset = 0.5 - EDGE_MARGIN;
    let chance = if near_edge_chance.is_nan() {
        0.0
    } else {
        near_edge_chance.clamp(0.0, 1.0)
    };
    if rng.random_bool(chance) {
        let sign = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        sign * (max_offset - rng.random::<f64>() * EDGE_JITTER)
    } else {
        ((rng.random::<f64>() - 0.5) * CENTER_SPREAD).clamp(-max_offset, max_offset)
    }
}

/// Breathing overlay opacity: 0 at the start of each period, 0.5 halfway.
pub fn highlight_opacity(elapsed: Duration, period: Duration) -> f64 {
    if period.is_zero() {
        return 0.0;
    }
    let phase = (elapsed.as_secs_f64() % period.as_secs_f64()) / period.as_secs_f64();
    0.5 * (0.5 - 0.5 * (TAU * phase).cos())
}

/// Labels whose bisector points into the left half of the circle are turned
/// over so they read upright.
pub fn needs_flip(angle: f64) -> bool {
    let a = normalize(angle);
    a > FRAC_PI_2 && a < 3.0 * FRAC_PI_2
}

/// Width available to a label centered at `label_radius` inside a slice.
pub fn label_width_budget(radius: f64, label_radius: f64, slice: f64) -> f64 {
    let chord = 2.0 * label_radius * (slice / 2.0).sin() - 14.0;
    (radius * 0.75).min(chord).max(40.0)
}

pub fn flip(angle: f64) -> f64 {
    angle + PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn landing_offset_tolerates_bad_chances() {
        let mut rng = StdRng::seed_from_u64(1);
        let max_offset = 0.5 - EDGE_MARGIN;
        for chance in [f64::NAN, -3.0, 7.0, f64::INFINITY] {
            for _ in 0..50 {
                let offset = landing_offset(&mut rng, chance);
                assert!(offset.abs() <= max_offset, "{chance} gave {offset}");
            }
        }
    }

    #[test]
    fn pointer_index_is_always_in_range() {
        for count in 1..=13 {
            let mut rotation = -50.0;
            while rotation < 50.0 {
                let index = index_under_pointer(rotation, count).expect("non-empty");
                assert!(index < count, "rotation {rotation} gave {index} of {count}");
                rotation += 0.173;
            }
        }
    }

    #[test]
    fn empty_wheel_has_no_pointer_index() {
        assert_eq!(index_under_pointer(1.23, 0), None);
    }

    #[test]
    fn unrotated_wheel_points_at_last_slice() {
        // Slices start at +x and run clockwise, so the top belongs to the
        // slice ending at 2π.
        assert_eq!(index_under_pointer(0.0, 4), Some(3));
        assert_eq!(index_under_pointer(FRAC_PI_2, 4), Some(2));
    }

    #[test]
    fn target_rotation_lands_inside_target_slice() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in 1..=12 {
            let slice = slice_angle(count);
            for index in 0..count {
                for _ in 0..20 {
                    let offset = landing_offset(&mut rng, 0.28);
                    let rotation = target_rotation(index, offset, slice);
                    assert_eq!(index_under_pointer(rotation, count), Some(index));
                }
            }
        }
    }

    #[test]
    fn landing_offset_stays_off_the_boundary() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let offset = landing_offset(&mut rng, 0.28);
            assert!(offset.abs() <= 0.42 + 1e-12);
        }
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let offset = landing_offset(&mut rng, 1.0);
            assert!(offset.abs() >= 0.40 - 1e-12, "edge landing {offset}");
        }
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            assert!(landing_offset(&mut rng, 0.0).abs() <= 0.15 + 1e-12);
        }
    }

    #[test]
    fn forward_delta_is_never_negative() {
        assert!((forward_delta(1.0, 0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((forward_delta(0.5, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(forward_delta(2.0, 2.0), 0.0);
        assert!(forward_delta(100.0, -100.0) >= 0.0);
    }

    #[test]
    fn ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(ease_out_cubic(3.0), 1.0);
    }

    #[test]
    fn highlight_breathes_over_period() {
        let period = Duration::from_millis(1400);
        assert!(highlight_opacity(Duration::ZERO, period).abs() < 1e-12);
        assert!((highlight_opacity(Duration::from_millis(700), period) - 0.5).abs() < 1e-9);
        assert!(highlight_opacity(Duration::from_millis(1400), period).abs() < 1e-9);
        assert!((highlight_opacity(Duration::from_millis(350), period) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn flip_applies_to_left_half_only() {
        assert!(!needs_flip(0.0));
        assert!(!needs_flip(FRAC_PI_2));
        assert!(needs_flip(PI));
        assert!(needs_flip(-PI + 0.1));
        assert!(!needs_flip(3.0 * FRAC_PI_2 + 0.01));
        assert!(!needs_flip(TAU + 0.2));
    }

    #[test]
    fn label_budget_has_a_floor() {
        // A single slice has no chord to speak of.
        assert_eq!(label_width_budget(188.0, 127.84, TAU), 40.0);
        let budget = label_width_budget(188.0, 127.84, TAU / 4.0);
        assert!((budget - 141.0).abs() < 1e-9);
    }
}
