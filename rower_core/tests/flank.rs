//! Behavior of the sliding trend analyzer: noise filtering, predicate
//! direction detection, and the window accessors the engine relies on.

use rower_core::flank::FlankDetector;
use rower_core::settings::RowerSettings;
use rstest::rstest;

fn detector_settings(smoothing: usize, flank_length: usize, errors_allowed: usize) -> RowerSettings {
    RowerSettings {
        smoothing,
        flank_length,
        errors_allowed,
        minimum_impulse_time: 0.005,
        maximum_impulse_time: 0.5,
        impulses_per_rev: 1.0,
        ..RowerSettings::default()
    }
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(5)]
fn strictly_shrinking_intervals_read_as_powered(#[case] flank_length: usize) {
    let mut d = FlankDetector::new(&detector_settings(1, flank_length, 0));
    // 3% faster every impulse, well inside the change limiter band.
    let mut dt = 0.4;
    for _ in 0..(flank_length + 2) {
        d.push(dt);
        dt *= 0.97;
    }
    assert!(d.is_flywheel_powered());
    assert!(!d.is_flywheel_unpowered());
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(5)]
fn strictly_growing_intervals_read_as_unpowered(#[case] flank_length: usize) {
    let mut d = FlankDetector::new(&detector_settings(1, flank_length, 0));
    // Start fast, then slow down 3% per impulse. The first pushes against the
    // idle-primed window are rejected by the change limiter; feeding well
    // past the window length lets the trend establish itself.
    let mut dt = 0.02;
    for _ in 0..(3 * flank_length + 8) {
        d.push(dt);
        dt *= 1.03;
    }
    assert!(d.is_flywheel_unpowered());
    assert!(!d.is_flywheel_powered());
}

#[test]
fn a_flat_window_is_ambiguous_with_zero_tolerance() {
    let mut d = FlankDetector::new(&detector_settings(1, 3, 0));
    for _ in 0..10 {
        d.push(0.02);
    }
    assert!(!d.is_flywheel_powered());
    assert!(!d.is_flywheel_unpowered());
}

#[test]
fn out_of_bounds_interval_is_substituted_with_previous_clean() {
    let mut d = FlankDetector::new(&detector_settings(1, 2, 0));
    for _ in 0..6 {
        d.push(0.02);
    }
    let before = d.current_clean_interval();

    // Switch bounce: far below the minimum interval.
    d.push(0.0001);
    assert!((d.current_clean_interval() - before).abs() < 1e-12);
    assert!(!d.is_flywheel_powered(), "bounce must not fake a drive");

    // A spurious dropout above the maximum behaves the same.
    d.push(0.9);
    assert!((d.current_clean_interval() - before).abs() < 1e-12);
}

#[test]
fn sustained_implausible_run_is_rejected_then_believed() {
    // smoothing 4 gives a correction budget of 4; the first budget+1 samples
    // are replaced, after that the stream is believed and the mean moves.
    let mut d = FlankDetector::new(&detector_settings(4, 2, 0));
    for _ in 0..16 {
        d.push(0.02);
    }
    assert!((d.current_clean_interval() - 0.02).abs() < 1e-9);

    // 10x jump: in bounds, but far outside the change-limiter band.
    for i in 0..5 {
        d.push(0.2);
        assert!(
            (d.current_clean_interval() - 0.02).abs() < 1e-9,
            "sample {i} within the budget should be rejected"
        );
    }
    d.push(0.2);
    d.push(0.2);
    assert!(
        d.current_clean_interval() > 0.05,
        "after the budget, the new level must be accepted, got {}",
        d.current_clean_interval()
    );
}

#[test]
fn constant_stream_converges_to_exact_angular_velocity() {
    let settings = detector_settings(4, 3, 0);
    let theta = settings.theta_per_impulse();
    let mut d = FlankDetector::new(&settings);
    for _ in 0..20 {
        d.push(0.015);
    }
    let expected = theta / 0.015;
    let got = d.current_angular_velocity();
    assert!(
        ((got - expected) / expected).abs() < 1e-9,
        "angular velocity {got} vs expected {expected}"
    );
}

#[test]
fn time_to_begin_of_flank_sums_raw_intervals() {
    let mut d = FlankDetector::new(&detector_settings(1, 2, 0));
    d.push(0.02);
    d.push(0.021);
    d.push(0.022);
    // The window spans flank_length + 1 = 3 raw samples, bounce included.
    let expected = 0.02 + 0.021 + 0.022;
    assert!((d.time_to_begin_of_flank() - expected).abs() < 1e-12);

    d.push(0.0001); // out of bounds, but still raw wall-clock time
    let expected = 0.021 + 0.022 + 0.0001;
    assert!((d.time_to_begin_of_flank() - expected).abs() < 1e-12);
}

#[test]
fn begin_of_flank_accessors_expose_the_oldest_slot() {
    // Ratios stay inside the change-limiter band, so clean == raw here.
    let settings = detector_settings(1, 2, 0);
    let mut d = FlankDetector::new(&settings);
    for dt in [0.40, 0.35, 0.30, 0.28] {
        d.push(dt);
    }
    // clean[flank_length] lags the stream by flank_length samples
    assert!((d.impulse_length_at_begin_flank() - 0.35).abs() < 1e-12);
    assert!(d.acceleration_at_begin_flank().is_finite());
}

#[test]
fn error_tolerance_forgives_single_direction_glitches() {
    // One wrong-direction pair inside the window passes with errors_allowed=1
    // and fails with 0.
    let strict = detector_settings(1, 3, 0);
    let lenient = detector_settings(1, 3, 1);
    let stream = [0.40, 0.38, 0.385, 0.36, 0.34];

    let mut d0 = FlankDetector::new(&strict);
    let mut d1 = FlankDetector::new(&lenient);
    for dt in stream {
        d0.push(dt);
        d1.push(dt);
    }
    assert!(!d0.is_flywheel_powered());
    assert!(d1.is_flywheel_powered());
}
