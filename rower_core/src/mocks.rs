//! Test and helper mocks for rower_core.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use rower_traits::CycleCounter;

use crate::observer::RowingObserver;
use crate::snapshot::RowerSnapshot;

/// Cycle counter advanced by hand. Lets a test script exact edge timings
/// without sleeping: advance, fire the edge, repeat.
#[derive(Debug, Default)]
pub struct ManualCounter {
    now: AtomicU32,
    rate: u32,
}

impl ManualCounter {
    /// A manual counter at 1 MHz, starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate(1_000_000)
    }

    #[must_use]
    pub fn with_rate(rate: u32) -> Self {
        Self {
            now: AtomicU32::new(0),
            rate,
        }
    }

    /// Advance the counter by `cycles`, wrapping like the hardware would.
    pub fn advance(&self, cycles: u32) {
        self.now.fetch_add(cycles, Ordering::Relaxed);
    }

    pub fn set(&self, cycles: u32) {
        self.now.store(cycles, Ordering::Relaxed);
    }
}

impl CycleCounter for ManualCounter {
    fn now_cycles(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
    fn cycles_per_sec(&self) -> u32 {
        self.rate
    }
}

/// One observer callback as seen by [`RecordingObserver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObservedEvent {
    StrokeStart(RowerSnapshot),
    StrokeEnd(RowerSnapshot),
    MetricsUpdate(RowerSnapshot),
}

/// Observer that appends every callback to a shared list.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<ObservedEvent>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded events; clone before handing the
    /// observer to the engine.
    #[must_use]
    pub fn events(&self) -> Arc<Mutex<Vec<ObservedEvent>>> {
        Arc::clone(&self.events)
    }
}

impl RowingObserver for RecordingObserver {
    fn on_stroke_start(&mut self, snapshot: RowerSnapshot) {
        if let Ok(mut ev) = self.events.lock() {
            ev.push(ObservedEvent::StrokeStart(snapshot));
        }
    }
    fn on_stroke_end(&mut self, snapshot: RowerSnapshot) {
        if let Ok(mut ev) = self.events.lock() {
            ev.push(ObservedEvent::StrokeEnd(snapshot));
        }
    }
    fn on_metrics_update(&mut self, snapshot: RowerSnapshot) {
        if let Ok(mut ev) = self.events.lock() {
            ev.push(ObservedEvent::MetricsUpdate(snapshot));
        }
    }
}

/// Feed a sequence of intervals straight into an engine.
pub fn feed(engine: &mut crate::engine::RowingEngine, intervals: impl IntoIterator<Item = f64>) {
    for dt in intervals {
        engine.handle_rotation_impulse(dt);
    }
}

/// A square-wave interval stream: `n_fast` samples at `fast` followed by
/// `n_slow` at `slow`, repeated `cycles` times. Approximates a steady
/// drive/recovery alternation.
#[must_use]
pub fn square_wave(fast: f64, n_fast: usize, slow: f64, n_slow: usize, cycles: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(cycles * (n_fast + n_slow));
    for _ in 0..cycles {
        out.extend(std::iter::repeat_n(fast, n_fast));
        out.extend(std::iter::repeat_n(slow, n_slow));
    }
    out
}
