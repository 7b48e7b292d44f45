//! `From` implementations bridging `rower_config` types to engine settings.
//!
//! Keeps the field-by-field mapping out of the CLI and any other assembler.

use crate::settings::RowerSettings;

impl From<&rower_config::Config> for RowerSettings {
    fn from(cfg: &rower_config::Config) -> Self {
        Self {
            impulses_per_rev: f64::from(cfg.flywheel.impulses_per_rev),
            flywheel_inertia: cfg.flywheel.inertia_kg_m2,
            magic_constant: cfg.flywheel.magic_constant,
            minimum_impulse_time: cfg.timing.min_impulse_s,
            maximum_impulse_time: cfg.timing.max_impulse_s,
            minimum_drive_time: cfg.timing.min_drive_s,
            minimum_recovery_time: cfg.timing.min_recovery_s,
            pause_timeout: cfg.timing.pause_timeout_s,
            smoothing: cfg.filter.smoothing,
            flank_length: cfg.filter.flank_length,
            errors_allowed: cfg.filter.errors_allowed,
            maximum_downward_change: cfg.filter.max_downward_ratio,
            maximum_upward_change: cfg.filter.max_upward_ratio,
            drag_factor: cfg.drag.base_drag_factor,
            auto_adjust_drag: cfg.drag.auto_adjust,
            drag_smoothing: cfg.drag.smoothing,
            drag_max_change: cfg.drag.max_change_ratio,
        }
    }
}
