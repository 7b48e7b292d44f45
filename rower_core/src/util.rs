//! Small numeric helpers shared across the pipeline.

/// Angular displacement per impulse in radians: a full turn divided by the
/// number of magnets on the flywheel.
#[inline]
#[must_use]
pub fn angular_displacement_per_impulse(impulses_per_rev: f64) -> f64 {
    debug_assert!(impulses_per_rev >= 1.0, "impulses_per_rev must be >= 1");
    std::f64::consts::TAU / impulses_per_rev.max(1.0)
}

/// Convert a raw cycle delta into seconds. The division happens here, on the
/// worker side; the producer never touches floating point.
#[inline]
#[must_use]
pub fn seconds_from_cycles(delta: u32, cycles_per_sec: u32) -> f64 {
    f64::from(delta) / f64::from(cycles_per_sec.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_magnet_is_a_full_turn() {
        assert!((angular_displacement_per_impulse(1.0) - std::f64::consts::TAU).abs() < 1e-15);
    }

    #[test]
    fn three_magnets_split_the_turn() {
        let third = std::f64::consts::TAU / 3.0;
        assert!((angular_displacement_per_impulse(3.0) - third).abs() < 1e-15);
    }

    #[test]
    fn cycles_convert_at_the_counter_rate() {
        // 1 MHz counter: 15_000 cycles = 15 ms
        assert!((seconds_from_cycles(15_000, 1_000_000) - 0.015).abs() < 1e-12);
        // zero rate is clamped rather than dividing by zero
        assert!(seconds_from_cycles(100, 0).is_finite());
    }
}
