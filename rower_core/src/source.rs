//! Hardware-edge impulse acquisition.
//!
//! The producer side (`EdgeHandle::on_edge`) is written for interrupt
//! context: it reads the cycle counter, takes a wrapping delta, and pushes
//! the raw `u32` into a bounded channel with `try_send`. No locks, no heap,
//! no floating point. When the queue is full the sample is dropped and an
//! overflow counter bumped; the DSP downstream tolerates a missing impulse
//! as a single elevated interval, so this is a soft failure.
//!
//! The consumer side converts cycles to seconds (f64, done here and never in
//! the edge handler) and feeds the engine in FIFO order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use rower_traits::CycleCounter;

use crate::engine::RowingEngine;
use crate::util::seconds_from_cycles;

struct SourceShared {
    last_cycles: AtomicU32,
    primed: AtomicBool,
    paused: AtomicBool,
    overflows: AtomicU32,
    tx: xch::Sender<u32>,
}

/// The interrupt-facing half of the impulse source. Clone it into whatever
/// context delivers sensor edges (a GPIO ISR trampoline, a simulator thread).
pub struct EdgeHandle<C> {
    shared: Arc<SourceShared>,
    counter: Arc<C>,
}

impl<C> Clone for EdgeHandle<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            counter: Arc::clone(&self.counter),
        }
    }
}

impl<C: CycleCounter> EdgeHandle<C> {
    /// Record one sensor edge. Safe to call from interrupt context.
    ///
    /// The first edge after start or resume only primes the timestamp; a
    /// delta needs two points. Wrapping subtraction keeps the delta correct
    /// across one counter rollover.
    pub fn on_edge(&self) {
        if self.shared.paused.load(Ordering::Acquire) {
            return;
        }
        let now = self.counter.now_cycles();
        if !self.shared.primed.swap(true, Ordering::AcqRel) {
            self.shared.last_cycles.store(now, Ordering::Release);
            return;
        }
        let delta = now.wrapping_sub(self.shared.last_cycles.load(Ordering::Acquire));
        self.shared.last_cycles.store(now, Ordering::Release);

        if self.shared.tx.try_send(delta).is_err() {
            self.shared.overflows.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Pause/resume and diagnostics, detached from the queue so the worker can
/// own the consumer end while callers keep control.
#[derive(Clone)]
pub struct SourceControl {
    shared: Arc<SourceShared>,
}

impl SourceControl {
    /// Stop producing: edges are ignored and the primed timestamp is
    /// cleared, so the first edge after `resume` only re-primes.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
        self.shared.primed.store(false, Ordering::Release);
    }

    pub fn resume(&self) {
        self.shared.primed.store(false, Ordering::Release);
        self.shared.paused.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Samples dropped at the producer boundary since construction.
    #[must_use]
    pub fn overflow_count(&self) -> u32 {
        self.shared.overflows.load(Ordering::Relaxed)
    }
}

/// Consumer side of the acquisition path: owns the queue receiver and the
/// cycles-per-second constant for the conversion.
pub struct ImpulseSource<C> {
    shared: Arc<SourceShared>,
    counter: Arc<C>,
    rx: xch::Receiver<u32>,
    cycles_per_sec: u32,
}

impl<C: CycleCounter> ImpulseSource<C> {
    /// Build a source over `counter` with a bounded queue of `capacity`
    /// deltas. Capacity 0 is clamped to 1.
    #[must_use]
    pub fn new(counter: C, capacity: usize) -> Self {
        let cycles_per_sec = counter.cycles_per_sec();
        let (tx, rx) = xch::bounded(capacity.max(1));
        Self {
            shared: Arc::new(SourceShared {
                last_cycles: AtomicU32::new(0),
                primed: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                overflows: AtomicU32::new(0),
                tx,
            }),
            counter: Arc::new(counter),
            rx,
            cycles_per_sec,
        }
    }

    #[must_use]
    pub fn edge_handle(&self) -> EdgeHandle<C> {
        EdgeHandle {
            shared: Arc::clone(&self.shared),
            counter: Arc::clone(&self.counter),
        }
    }

    #[must_use]
    pub fn control(&self) -> SourceControl {
        SourceControl {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Pause production and discard anything still queued, so nothing stale
    /// reaches the engine after `resume`.
    pub fn pause(&self) {
        self.control().pause();
        let drained = self.rx.try_iter().count();
        if drained > 0 {
            tracing::debug!(drained, "queue drained on pause");
        }
    }

    pub fn resume(&self) {
        self.control().resume();
    }

    #[must_use]
    pub fn overflow_count(&self) -> u32 {
        self.shared.overflows.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn cycles_per_sec(&self) -> u32 {
        self.cycles_per_sec
    }

    /// Drain every queued delta into the engine, in FIFO order. Returns the
    /// number of impulses delivered. This is the single-threaded worker
    /// shape; `ImpulseWorker` wraps the same loop in a thread.
    pub fn drain_into(&self, engine: &mut RowingEngine) -> usize {
        let mut delivered = 0;
        for delta in self.rx.try_iter() {
            if self.shared.paused.load(Ordering::Acquire) {
                continue;
            }
            engine.handle_rotation_impulse(seconds_from_cycles(delta, self.cycles_per_sec));
            delivered += 1;
        }
        delivered
    }

    /// Block up to `timeout` for the next delta. Used by the worker thread
    /// so shutdown checks stay prompt.
    pub(crate) fn recv_delta(&self, timeout: Duration) -> Result<u32, xch::RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub(crate) fn try_delta(&self) -> Option<u32> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }
}
