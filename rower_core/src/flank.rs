//! Sliding trend analyzer over the inter-impulse interval stream.
//!
//! The detector keeps four parallel rings of `flank_length + 1` slots, index
//! 0 being the most recent sample:
//!
//! - `dirty`: raw intervals exactly as received
//! - `clean`: intervals after the bounds filter, change limiter, and smoothing
//! - `ang_vel` / `ang_acc`: angular velocity and acceleration per slot
//!
//! A flywheel under power spins up, so clean intervals shrink across the
//! window; a coasting flywheel slows down and intervals grow. The two
//! predicates count direction errors against those expectations and are not
//! negations of each other: an ambiguous window fails both, which keeps the
//! engine in its current phase.

use crate::averager::MovingAverager;
use crate::settings::RowerSettings;

#[derive(Debug, Clone)]
pub struct FlankDetector {
    flank_length: usize,
    minimum_impulse_time: f64,
    maximum_impulse_time: f64,
    maximum_downward_change: f64,
    maximum_upward_change: f64,
    errors_allowed: usize,
    theta_per_impulse: f64,

    averager: MovingAverager,
    dirty: Box<[f64]>,
    clean: Box<[f64]>,
    ang_vel: Box<[f64]>,
    ang_acc: Box<[f64]>,

    sequential_corrections: usize,
    max_sequential_corrections: usize,
}

impl FlankDetector {
    #[must_use]
    pub fn new(settings: &RowerSettings) -> Self {
        let len = settings.flank_length + 1;
        let theta = settings.theta_per_impulse();
        // Prime the rings as if the flywheel had been coasting at the slowest
        // valid speed, so the first real samples read as an acceleration.
        let idle_dt = settings.maximum_impulse_time;
        let idle_vel = theta / idle_dt;
        Self {
            flank_length: settings.flank_length,
            minimum_impulse_time: settings.minimum_impulse_time,
            maximum_impulse_time: settings.maximum_impulse_time,
            maximum_downward_change: settings.maximum_downward_change,
            maximum_upward_change: settings.maximum_upward_change,
            errors_allowed: settings.errors_allowed,
            theta_per_impulse: theta,
            averager: MovingAverager::new(settings.smoothing, idle_dt),
            dirty: vec![idle_dt; len].into_boxed_slice(),
            clean: vec![idle_dt; len].into_boxed_slice(),
            ang_vel: vec![idle_vel; len].into_boxed_slice(),
            ang_acc: vec![0.0; len].into_boxed_slice(),
            sequential_corrections: 0,
            max_sequential_corrections: settings.smoothing.max(2),
        }
    }

    /// Ingest one raw inter-impulse interval.
    pub fn push(&mut self, dt: f64) {
        let len = self.flank_length;

        for i in (1..=len).rev() {
            self.dirty[i] = self.dirty[i - 1];
            self.clean[i] = self.clean[i - 1];
            self.ang_vel[i] = self.ang_vel[i - 1];
            self.ang_acc[i] = self.ang_acc[i - 1];
        }
        self.dirty[0] = dt;

        // Bounds filter: substitute the previous clean sample for anything a
        // real flywheel could not have produced.
        let mut dt = dt;
        if dt < self.minimum_impulse_time || dt > self.maximum_impulse_time {
            tracing::debug!(dt, "interval out of bounds, substituting previous clean sample");
            dt = self.clean[1];
        }

        // Change limiter: smooth first, then judge the smoothed value against
        // the previous clean sample. Rejecting means overwriting the value we
        // just averaged in with the previous clean sample, up to a budget of
        // consecutive corrections; past the budget the stream is believed.
        self.averager.push(dt);
        let current_average = self.averager.average();
        let previous_clean = self.clean[1];

        let plausible = current_average > self.maximum_downward_change * previous_clean
            && current_average < self.maximum_upward_change * previous_clean;

        if plausible {
            self.sequential_corrections = 0;
        } else if self.sequential_corrections <= self.max_sequential_corrections {
            tracing::debug!(
                current_average,
                previous_clean,
                corrections = self.sequential_corrections,
                "implausible change, rejecting sample"
            );
            self.averager.replace_last(previous_clean);
            self.sequential_corrections += 1;
        }

        self.clean[0] = self.averager.average();

        if self.clean[0] > 0.0 {
            self.ang_vel[0] = self.theta_per_impulse / self.clean[0];
            self.ang_acc[0] = (self.ang_vel[0] - self.ang_vel[1]) / self.clean[0];
        } else {
            self.ang_vel[0] = 0.0;
            self.ang_acc[0] = 0.0;
        }
    }

    /// True when the clean window shows the flywheel accelerating (intervals
    /// shrinking towards slot 0), within the configured error tolerance.
    #[must_use]
    pub fn is_flywheel_powered(&self) -> bool {
        let mut errors = 0;
        for i in (2..=self.flank_length).rev() {
            if self.clean[i] < self.clean[i - 1] {
                errors += 1;
            }
        }
        if self.clean[1] <= self.clean[0] {
            errors += 1;
        }
        errors <= self.errors_allowed
    }

    /// True when the clean window shows the flywheel decelerating (intervals
    /// growing towards slot 0), within the configured error tolerance.
    #[must_use]
    pub fn is_flywheel_unpowered(&self) -> bool {
        let mut errors = 0;
        for i in (1..=self.flank_length).rev() {
            if self.clean[i] >= self.clean[i - 1] {
                errors += 1;
            }
        }
        errors <= self.errors_allowed
    }

    /// Wall-clock span of the current trend window, in the original raw
    /// intervals. The engine subtracts this from total time to anchor phase
    /// boundaries at the start of the flank rather than the current sample.
    #[must_use]
    pub fn time_to_begin_of_flank(&self) -> f64 {
        self.dirty[..=self.flank_length].iter().sum()
    }

    /// Clean interval at the oldest slot of the window.
    #[must_use]
    pub fn impulse_length_at_begin_flank(&self) -> f64 {
        self.clean[self.flank_length]
    }

    /// Angular acceleration just inside the oldest edge of the window.
    #[must_use]
    pub fn acceleration_at_begin_flank(&self) -> f64 {
        self.ang_acc[self.flank_length - 1]
    }

    /// Clean interval at the newest slot. Exposed for diagnostics and tests.
    #[must_use]
    pub fn current_clean_interval(&self) -> f64 {
        self.clean[0]
    }

    /// Angular velocity at the newest slot.
    #[must_use]
    pub fn current_angular_velocity(&self) -> f64 {
        self.ang_vel[0]
    }
}
