//! Runtime settings for the rowing engine.
//!
//! All physical and filtering parameters, immutable after construction. The
//! defaults describe a three-magnet air rower with Concept2-style physics;
//! deployments load their own values through `rower_config`.

use crate::error::BuildError;

/// Physical and filtering parameters of one rower. Constructed once at boot
/// and shared by value; the engine never mutates it.
#[derive(Debug, Clone)]
pub struct RowerSettings {
    /// Magnets passing the sensor per flywheel revolution.
    pub impulses_per_rev: f64,
    /// Flywheel moment of inertia in kg*m^2.
    pub flywheel_inertia: f64,
    /// Drag-to-boat-speed coupling (2.8 in the Concept2 model).
    pub magic_constant: f64,

    /// Shortest valid interval between impulses (seconds, inclusive).
    pub minimum_impulse_time: f64,
    /// Longest valid interval between impulses (seconds, inclusive).
    pub maximum_impulse_time: f64,
    /// Minimum duration of a valid drive phase (seconds).
    pub minimum_drive_time: f64,
    /// Minimum duration of a valid recovery phase (seconds).
    pub minimum_recovery_time: f64,
    /// An interval above this is a workout pause and is dropped.
    pub pause_timeout: f64,

    /// Moving-average window over clean intervals.
    pub smoothing: usize,
    /// Trend window length used to confirm a phase change.
    pub flank_length: usize,
    /// Direction errors tolerated inside one trend window.
    pub errors_allowed: usize,
    /// Lower plausibility bound for the smoothed interval, as a ratio of the
    /// previous clean sample.
    pub maximum_downward_change: f64,
    /// Upper plausibility bound, same convention.
    pub maximum_upward_change: f64,

    /// Base drag factor in N*m*s^2.
    pub drag_factor: f64,
    /// Recalculate drag from each recovery's deceleration.
    pub auto_adjust_drag: bool,
    /// Averager length over accepted per-stroke drag samples.
    pub drag_smoothing: usize,
    /// Maximum per-stroke drag change as a ratio of the running average.
    pub drag_max_change: f64,
}

impl Default for RowerSettings {
    fn default() -> Self {
        Self {
            impulses_per_rev: 3.0,
            flywheel_inertia: 0.1001,
            magic_constant: 2.8,
            minimum_impulse_time: 0.014,
            maximum_impulse_time: 0.5,
            minimum_drive_time: 0.3,
            minimum_recovery_time: 0.9,
            pause_timeout: 3.0,
            smoothing: 4,
            flank_length: 3,
            errors_allowed: 0,
            maximum_downward_change: 0.25,
            maximum_upward_change: 1.75,
            drag_factor: 1.0e-4,
            auto_adjust_drag: true,
            drag_smoothing: 5,
            drag_max_change: 0.10,
        }
    }
}

impl RowerSettings {
    /// Angular displacement per impulse in radians.
    #[must_use]
    pub fn theta_per_impulse(&self) -> f64 {
        crate::util::angular_displacement_per_impulse(self.impulses_per_rev)
    }

    /// Validate once at construction. Positivity, min/max ordering, and
    /// non-empty windows; everything downstream assumes these hold.
    pub fn validate(&self) -> Result<(), BuildError> {
        fn positive(v: f64) -> bool {
            v.is_finite() && v > 0.0
        }

        if self.impulses_per_rev < 1.0 || !self.impulses_per_rev.is_finite() {
            return Err(BuildError::InvalidSettings("impulses_per_rev must be >= 1"));
        }
        if !positive(self.flywheel_inertia) {
            return Err(BuildError::InvalidSettings("flywheel_inertia must be > 0"));
        }
        if !positive(self.magic_constant) {
            return Err(BuildError::InvalidSettings("magic_constant must be > 0"));
        }
        if !positive(self.minimum_impulse_time) || !positive(self.maximum_impulse_time) {
            return Err(BuildError::InvalidSettings(
                "impulse time bounds must be > 0",
            ));
        }
        if self.minimum_impulse_time >= self.maximum_impulse_time {
            return Err(BuildError::InvalidSettings(
                "minimum_impulse_time must be below maximum_impulse_time",
            ));
        }
        if !positive(self.minimum_drive_time) || !positive(self.minimum_recovery_time) {
            return Err(BuildError::InvalidSettings(
                "phase duration gates must be > 0",
            ));
        }
        if !positive(self.pause_timeout) || self.pause_timeout < self.maximum_impulse_time {
            return Err(BuildError::InvalidSettings(
                "pause_timeout must be at least maximum_impulse_time",
            ));
        }
        if self.smoothing == 0 {
            return Err(BuildError::InvalidSettings("smoothing must be >= 1"));
        }
        if self.flank_length < 2 {
            return Err(BuildError::InvalidSettings("flank_length must be >= 2"));
        }
        if !(self.maximum_downward_change.is_finite()
            && self.maximum_downward_change > 0.0
            && self.maximum_downward_change < 1.0)
        {
            return Err(BuildError::InvalidSettings(
                "maximum_downward_change must lie in (0, 1)",
            ));
        }
        if !(self.maximum_upward_change.is_finite() && self.maximum_upward_change > 1.0) {
            return Err(BuildError::InvalidSettings(
                "maximum_upward_change must be above 1",
            ));
        }
        if !positive(self.drag_factor) {
            return Err(BuildError::InvalidSettings("drag_factor must be > 0"));
        }
        if self.drag_smoothing == 0 {
            return Err(BuildError::InvalidSettings("drag_smoothing must be >= 1"));
        }
        if !(self.drag_max_change.is_finite()
            && (0.0..1.0).contains(&self.drag_max_change))
        {
            return Err(BuildError::InvalidSettings(
                "drag_max_change must lie in [0, 1)",
            ));
        }
        Ok(())
    }
}
