//! Observable rowing state and the shared cell consumers read it through.

use std::sync::{Arc, Mutex};

/// Phase of the stroke cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowerState {
    /// No session in progress; impulses are ignored.
    #[default]
    Idle,
    /// The athlete is pulling; the flywheel accelerates.
    Drive,
    /// The flywheel coasts while the athlete slides forward.
    Recovery,
}

/// One consistent view of the rowing metrics. Plain `Copy` data: consumers
/// always work on a copy, never on the engine's live state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowerSnapshot {
    pub state: RowerState,

    /// Seconds of rowing since the last reset (pauses excluded).
    pub total_time: f64,
    /// Duration of the previous full drive+recovery cycle.
    pub last_stroke_time: f64,
    /// Duration of the current or last drive phase.
    pub drive_duration: f64,
    /// Duration of the current or last recovery phase.
    pub recovery_duration: f64,

    /// Total distance in meters.
    pub distance: f64,
    /// Cycle-mean linear speed in m/s.
    pub speed: f64,
    /// Cycle-mean power in watts.
    pub power: f64,
    /// Current drag factor in N*m*s^2.
    pub drag_factor: f64,

    /// Instantaneous torque in N*m, updated on every non-transition impulse.
    pub instantaneous_torque: f64,
    /// Strokes per minute of the previous valid cycle.
    pub strokes_per_minute: f64,
    /// Strokes begun this session. Increments exactly on drive entry.
    pub stroke_count: u32,

    /// Whether a session is currently open.
    pub session_active: bool,
    /// Sum of cycle powers, for downstream session averages.
    pub session_power_sum: f64,
    /// Sum of cycle speeds, same purpose.
    pub session_speed_sum: f64,
    /// Number of completed cycles contributing to the sums above.
    pub stroke_samples: u32,
}

/// Writer side of the shared snapshot. Owned by the engine; the lock is held
/// only for the duration of one struct copy.
#[derive(Debug)]
pub struct SnapshotCell {
    inner: Arc<Mutex<RowerSnapshot>>,
}

impl SnapshotCell {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RowerSnapshot::default())),
        }
    }

    /// Publish a new snapshot. Callbacks are invoked by the engine only after
    /// this returns, so observers never run under the lock.
    pub fn publish(&self, snapshot: &RowerSnapshot) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = *snapshot,
            Err(poisoned) => *poisoned.into_inner() = *snapshot,
        }
    }

    #[must_use]
    pub fn handle(&self) -> SnapshotHandle {
        SnapshotHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the shared snapshot, cloneable across consumer tasks.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    inner: Arc<Mutex<RowerSnapshot>>,
}

impl SnapshotHandle {
    /// A by-value copy of the most recently published snapshot.
    #[must_use]
    pub fn read(&self) -> RowerSnapshot {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
