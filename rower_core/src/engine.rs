//! The rowing engine: stroke state machine and per-stroke physics.
//!
//! `handle_rotation_impulse` is the single entry point. It is non-blocking,
//! allocation-free, and bounded-time: O(flank + smoothing) arithmetic for the
//! detector plus O(1) for the state machine. It never returns an error and
//! never panics in release; pathological intervals are absorbed by the flank
//! detector, pauses are dropped, and implausible drag candidates are clamped.
//!
//! ## Phase anchoring
//!
//! A phase change is only visible once a whole trend window agrees on the new
//! direction, so by the time the detector flips, the actual boundary lies one
//! window in the past. All phase boundaries are therefore anchored at
//! `total_time - time_to_begin_of_flank()` rather than at the current sample.

use crate::error::Result;
use crate::flank::FlankDetector;
use crate::averager::MovingAverager;
use crate::observer::RowingObserver;
use crate::settings::RowerSettings;
use crate::snapshot::{RowerSnapshot, RowerState, SnapshotCell, SnapshotHandle};

pub struct RowingEngine {
    settings: RowerSettings,
    flank: FlankDetector,
    drag_averager: MovingAverager,

    snapshot: RowerSnapshot,
    cell: SnapshotCell,
    observer: Option<Box<dyn RowingObserver + Send>>,

    theta_per_impulse: f64,
    drive_phase_start: f64,
    recovery_phase_start: f64,
    /// Clean interval at the start of the current recovery, captured on
    /// recovery entry. The trend window slides on, so re-querying the
    /// detector at drive entry would read a different flank.
    recovery_start_impulse: f64,
    /// False until a real recovery phase has begun; until then the recovery
    /// marker and start impulse hold the synthetic values seeded by
    /// `reset()`.
    recovery_observed: bool,
    previous_angular_velocity: f64,
}

impl core::fmt::Debug for RowingEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RowingEngine")
            .field("state", &self.snapshot.state)
            .field("stroke_count", &self.snapshot.stroke_count)
            .field("total_time", &self.snapshot.total_time)
            .field("drag_factor", &self.snapshot.drag_factor)
            .finish()
    }
}

impl RowingEngine {
    /// Build an engine from validated settings. Fails fast on invalid
    /// parameters; once built, nothing in the impulse path can fail.
    pub fn new(settings: RowerSettings) -> Result<Self> {
        settings.validate().map_err(eyre::Report::new)?;
        let theta = settings.theta_per_impulse();
        let mut engine = Self {
            flank: FlankDetector::new(&settings),
            drag_averager: MovingAverager::new(settings.drag_smoothing, settings.drag_factor),
            snapshot: RowerSnapshot::default(),
            cell: SnapshotCell::new(),
            observer: None,
            theta_per_impulse: theta,
            drive_phase_start: 0.0,
            recovery_phase_start: 0.0,
            recovery_start_impulse: settings.maximum_impulse_time,
            recovery_observed: false,
            previous_angular_velocity: 0.0,
            settings,
        };
        engine.reset();
        Ok(engine)
    }

    /// Install the downstream observer. At most one; a fan-out belongs in the
    /// consumer layer.
    pub fn set_observer(&mut self, observer: impl RowingObserver + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// A by-value copy of the current metrics.
    #[must_use]
    pub fn snapshot(&self) -> RowerSnapshot {
        self.snapshot
    }

    /// Cloneable read handle for pull consumers polling from other tasks.
    #[must_use]
    pub fn shared(&self) -> SnapshotHandle {
        self.cell.handle()
    }

    #[must_use]
    pub fn settings(&self) -> &RowerSettings {
        &self.settings
    }

    /// Clear all metrics and re-enter RECOVERY with a synthetic prior cycle,
    /// so the very first powered flank starts a legitimate drive. The session
    /// flag survives a reset.
    pub fn reset(&mut self) {
        let session_active = self.snapshot.session_active;
        self.snapshot = RowerSnapshot {
            state: RowerState::Recovery,
            drag_factor: self.settings.drag_factor,
            session_active,
            ..RowerSnapshot::default()
        };
        self.drag_averager.reset(self.settings.drag_factor);
        self.flank = FlankDetector::new(&self.settings);

        // Phantom prior cycle: a drive and recovery far enough in the past
        // that the first real drive clears both duration gates and produces
        // a cadence reading.
        self.recovery_phase_start = -2.0 * self.settings.minimum_recovery_time;
        self.drive_phase_start =
            self.recovery_phase_start - 2.0 * self.settings.minimum_drive_time;
        self.recovery_start_impulse = self.settings.maximum_impulse_time;
        self.recovery_observed = false;
        self.previous_angular_velocity = 0.0;

        self.cell.publish(&self.snapshot);
    }

    /// Open a session: full reset with the session flag raised.
    pub fn start_session(&mut self) {
        self.snapshot.session_active = true;
        self.reset();
        tracing::info!("session started");
    }

    /// Close the session: totals freeze and the engine goes idle until the
    /// next `start_session` or `reset`.
    pub fn end_session(&mut self) {
        self.snapshot.session_active = false;
        self.snapshot.state = RowerState::Idle;
        self.cell.publish(&self.snapshot);
        tracing::info!(
            strokes = self.snapshot.stroke_count,
            distance = self.snapshot.distance,
            "session ended"
        );
    }

    /// Ingest one inter-impulse interval in seconds. The sole mutation path;
    /// the worker context is its only caller.
    pub fn handle_rotation_impulse(&mut self, dt: f64) {
        if self.snapshot.state == RowerState::Idle {
            return;
        }
        // Pause: no time accrual, no state change, no observer fire. The next
        // valid interval resumes the stream as if nothing happened.
        if dt > self.settings.pause_timeout {
            tracing::info!(dt, "pause detected, dropping interval");
            return;
        }
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "non-positive interval dropped");
            return;
        }

        self.snapshot.total_time += dt;
        self.flank.push(dt);

        match self.snapshot.state {
            RowerState::Drive => {
                if self.flank.is_flywheel_unpowered()
                    && self.current_drive_length() >= self.settings.minimum_drive_time
                {
                    self.start_recovery(dt);
                } else {
                    self.update_phase(dt);
                }
            }
            RowerState::Recovery => {
                if self.flank.is_flywheel_powered()
                    && self.current_recovery_length() >= self.settings.minimum_recovery_time
                {
                    self.start_drive(dt);
                } else {
                    self.update_phase(dt);
                }
            }
            RowerState::Idle => {}
        }
    }

    // ── Phase transitions ───────────────────────────────────────────────────

    /// Finalize the recovery that just ended and enter DRIVE.
    fn start_drive(&mut self, dt: f64) {
        let end_time = self.phase_end_time();
        let recovery_len = end_time - self.recovery_phase_start;
        // The previous drive's span between the phase markers. On the first
        // stroke these hold the phantom cycle from `reset()`, so the gate
        // passes and the athlete sees a cadence immediately.
        let drive_len = self.recovery_phase_start - self.drive_phase_start;

        // Cycle metrics require both gates; the drag update additionally
        // requires a real observed recovery. The transition itself does not:
        // state follows the physics even when the cadence numbers for this
        // cycle are unreliable.
        if recovery_len >= self.settings.minimum_recovery_time
            && drive_len >= self.settings.minimum_drive_time
        {
            let cycle_time = drive_len + recovery_len;
            if cycle_time > 0.0 {
                self.snapshot.last_stroke_time = cycle_time;
                self.snapshot.strokes_per_minute = 60.0 / cycle_time;
            }
            if self.settings.auto_adjust_drag && self.recovery_observed {
                self.update_drag_factor(dt, recovery_len);
            }
        } else {
            tracing::debug!(
                recovery_len,
                drive_len,
                "cycle gates not met, cadence metrics suppressed"
            );
        }

        // The phantom recovery exists only to open the first drive gate; it
        // is never published as an observed duration.
        self.snapshot.recovery_duration = if self.recovery_observed {
            recovery_len.max(0.0)
        } else {
            0.0
        };
        self.snapshot.state = RowerState::Drive;
        self.drive_phase_start = end_time;
        self.snapshot.stroke_count += 1;
        tracing::info!(
            stroke = self.snapshot.stroke_count,
            spm = self.snapshot.strokes_per_minute,
            "drive started"
        );

        self.cell.publish(&self.snapshot);
        let snap = self.snapshot;
        if let Some(obs) = self.observer.as_mut() {
            obs.on_stroke_start(snap);
        }
    }

    /// Finalize the drive that just ended and enter RECOVERY.
    fn start_recovery(&mut self, dt: f64) {
        let end_time = self.phase_end_time();
        self.snapshot.drive_duration = (end_time - self.drive_phase_start).max(0.0);

        // Streaming approximation: impulses per phase estimated from
        // duration / current dt. Biases slightly high at the transition edge;
        // an exact per-phase impulse tally would slot in here unchanged.
        let (drive_angle, recovery_angle) = if dt > 0.0 {
            (
                (self.snapshot.drive_duration / dt) * self.theta_per_impulse,
                (self.snapshot.recovery_duration / dt) * self.theta_per_impulse,
            )
        } else {
            (0.0, 0.0)
        };
        let cycle_time = self.snapshot.drive_duration + self.snapshot.recovery_duration;

        self.snapshot.speed = self.linear_velocity(drive_angle, recovery_angle, cycle_time);
        self.snapshot.power = self.cycle_power(drive_angle, recovery_angle, cycle_time);
        self.snapshot.distance += self.snapshot.speed * cycle_time;

        if cycle_time > 0.0 {
            self.snapshot.session_power_sum += self.snapshot.power;
            self.snapshot.session_speed_sum += self.snapshot.speed;
            self.snapshot.stroke_samples += 1;
        }

        self.recovery_phase_start = end_time;
        self.snapshot.state = RowerState::Recovery;
        self.recovery_observed = true;
        self.recovery_start_impulse = self.flank.impulse_length_at_begin_flank();
        tracing::info!(
            drive_s = self.snapshot.drive_duration,
            power_w = self.snapshot.power,
            "recovery started"
        );

        self.cell.publish(&self.snapshot);
        let snap = self.snapshot;
        if let Some(obs) = self.observer.as_mut() {
            obs.on_stroke_end(snap);
        }
    }

    /// No transition: refresh the instantaneous torque and notify.
    fn update_phase(&mut self, dt: f64) {
        let omega = self.theta_per_impulse / dt;
        let alpha = (omega - self.previous_angular_velocity) / dt;
        self.snapshot.instantaneous_torque =
            self.settings.flywheel_inertia * alpha + self.snapshot.drag_factor * omega * omega;
        self.previous_angular_velocity = omega;

        self.cell.publish(&self.snapshot);
        let snap = self.snapshot;
        if let Some(obs) = self.observer.as_mut() {
            obs.on_metrics_update(snap);
        }
    }

    // ── Physics ─────────────────────────────────────────────────────────────

    /// Drag self-calibration from recovery deceleration:
    /// C' = -I * (1/w_start - 1/w_end) / recovery_len, clamped to the
    /// configured per-stroke band around the running average.
    fn update_drag_factor(&mut self, dt: f64, recovery_len: f64) {
        let start_impulse = self.recovery_start_impulse;
        if start_impulse <= 0.0 || dt <= 0.0 || recovery_len <= 0.0 {
            return;
        }
        let w_start = self.theta_per_impulse / start_impulse;
        let w_end = self.theta_per_impulse / dt;
        let candidate =
            -self.settings.flywheel_inertia * (1.0 / w_start - 1.0 / w_end) / recovery_len;

        let average = self.drag_averager.average();
        let low = average * (1.0 - self.settings.drag_max_change);
        let high = average * (1.0 + self.settings.drag_max_change);
        let accepted = candidate.clamp(low, high);

        self.drag_averager.push(accepted);
        self.snapshot.drag_factor = self.drag_averager.average();
        tracing::debug!(
            candidate,
            accepted,
            drag_factor = self.snapshot.drag_factor,
            "drag factor updated"
        );
    }

    /// v = (C/K)^(1/3) * (total angle / cycle time)
    fn linear_velocity(&self, drive_angle: f64, recovery_angle: f64, cycle_time: f64) -> f64 {
        if cycle_time <= 0.0 {
            return 0.0;
        }
        let total_angle = drive_angle + recovery_angle;
        let factor = (self.snapshot.drag_factor / self.settings.magic_constant).cbrt();
        factor * (total_angle / cycle_time)
    }

    /// P = C * (total angle / cycle time)^3
    fn cycle_power(&self, drive_angle: f64, recovery_angle: f64, cycle_time: f64) -> f64 {
        if cycle_time <= 0.0 {
            return 0.0;
        }
        let total_angle = drive_angle + recovery_angle;
        self.snapshot.drag_factor * (total_angle / cycle_time).powi(3)
    }

    // ── Phase bookkeeping ───────────────────────────────────────────────────

    /// Where the phase that just ended actually ended: the start of the
    /// current trend window.
    fn phase_end_time(&self) -> f64 {
        self.snapshot.total_time - self.flank.time_to_begin_of_flank()
    }

    fn current_drive_length(&self) -> f64 {
        self.phase_end_time() - self.drive_phase_start
    }

    fn current_recovery_length(&self) -> f64 {
        self.phase_end_time() - self.recovery_phase_start
    }
}
