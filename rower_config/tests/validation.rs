use rower_config::{Config, load_toml};
use rstest::rstest;

#[test]
fn empty_toml_is_a_valid_default_config() {
    let cfg = load_toml("").unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.flywheel.impulses_per_rev, 3);
    assert!((cfg.flywheel.magic_constant - 2.8).abs() < 1e-12);
    assert_eq!(cfg.source.queue_capacity, 32);
}

#[test]
fn full_toml_round_trips_into_typed_fields() {
    let text = r#"
        [flywheel]
        impulses_per_rev = 6
        inertia_kg_m2 = 0.085
        magic_constant = 2.8

        [timing]
        min_impulse_s = 0.010
        max_impulse_s = 0.6
        min_drive_s = 0.25
        min_recovery_s = 0.7
        pause_timeout_s = 4.0

        [filter]
        smoothing = 3
        flank_length = 5
        errors_allowed = 1
        max_downward_ratio = 0.30
        max_upward_ratio = 1.60

        [drag]
        base_drag_factor = 1.25e-4
        auto_adjust = false
        smoothing = 8
        max_change_ratio = 0.05

        [source]
        queue_capacity = 64
        gpio_pin = 17
        active_low = true
    "#;
    let cfg = load_toml(text).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.flywheel.impulses_per_rev, 6);
    assert_eq!(cfg.filter.flank_length, 5);
    assert!(!cfg.drag.auto_adjust);
    assert_eq!(cfg.source.gpio_pin, Some(17));
    assert!(cfg.source.active_low);
}

#[rstest]
#[case("[flywheel]\nimpulses_per_rev = 0\n", "impulses_per_rev")]
#[case("[flywheel]\ninertia_kg_m2 = -0.1\n", "inertia_kg_m2")]
#[case("[flywheel]\nmagic_constant = 0.0\n", "magic_constant")]
#[case(
    "[timing]\nmin_impulse_s = 0.6\nmax_impulse_s = 0.5\n",
    "min_impulse_s"
)]
#[case(
    "[timing]\npause_timeout_s = 0.1\nmax_impulse_s = 0.5\n",
    "pause_timeout_s"
)]
#[case("[timing]\nmin_drive_s = 0.0\n", "min_drive_s")]
#[case("[filter]\nsmoothing = 0\n", "smoothing")]
#[case("[filter]\nflank_length = 1\n", "flank_length")]
#[case("[filter]\nmax_downward_ratio = 1.5\n", "max_downward_ratio")]
#[case("[filter]\nmax_upward_ratio = 0.9\n", "max_upward_ratio")]
#[case("[drag]\nbase_drag_factor = 0.0\n", "base_drag_factor")]
#[case("[drag]\nsmoothing = 0\n", "smoothing")]
#[case("[drag]\nmax_change_ratio = 1.0\n", "max_change_ratio")]
#[case("[source]\nqueue_capacity = 0\n", "queue_capacity")]
fn invalid_values_are_rejected_with_the_field_name(
    #[case] text: &str,
    #[case] needle: &str,
) {
    let cfg = load_toml(text).unwrap();
    let err = cfg.validate().unwrap_err();
    let msg = format!("{err}");
    assert!(
        msg.contains(needle),
        "error {msg:?} should mention {needle:?}"
    );
}

#[test]
fn non_finite_floats_are_rejected() {
    let cfg = load_toml("[timing]\nmin_drive_s = inf\n").unwrap();
    assert!(cfg.validate().is_err());

    let cfg = load_toml("[drag]\nbase_drag_factor = nan\n").unwrap();
    assert!(cfg.validate().is_err());
}
