//! Background worker that owns the engine and drains the impulse queue.
//!
//! Spawns a thread that moves the `RowingEngine` in, blocks on the queue
//! with a short timeout, and feeds every delta through
//! `handle_rotation_impulse` in FIFO order. Control operations arrive over a
//! command channel and are applied strictly between impulses, preserving the
//! single-writer rule.
//!
//! Safety: each `ImpulseWorker` spawns exactly one thread that is shut down
//! and joined when the handle is dropped, preventing thread leaks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use rower_traits::CycleCounter;

use crate::engine::RowingEngine;
use crate::snapshot::SnapshotHandle;
use crate::source::{ImpulseSource, SourceControl};
use crate::util::seconds_from_cycles;

/// How long the worker blocks on the queue before re-checking shutdown and
/// command channels.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(20);

enum WorkerCommand {
    Reset,
    StartSession,
    EndSession,
}

pub struct ImpulseWorker {
    control: SourceControl,
    snapshot: SnapshotHandle,
    cmd_tx: xch::Sender<WorkerCommand>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl ImpulseWorker {
    /// Move `source` and `engine` onto a worker thread and start draining.
    pub fn spawn<C: CycleCounter + Send + Sync + 'static>(
        source: ImpulseSource<C>,
        engine: RowingEngine,
    ) -> Self {
        let control = source.control();
        let snapshot = engine.shared();
        let (cmd_tx, cmd_rx) = xch::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        let join_handle = std::thread::spawn(move || {
            let mut engine = engine;
            let cycles_per_sec = source.cycles_per_sec();
            loop {
                if shutdown_flag.load(Ordering::Relaxed) {
                    tracing::debug!("impulse worker received shutdown signal");
                    break;
                }

                // Commands apply only between impulses.
                while let Ok(cmd) = cmd_rx.try_recv() {
                    match cmd {
                        WorkerCommand::Reset => engine.reset(),
                        WorkerCommand::StartSession => engine.start_session(),
                        WorkerCommand::EndSession => engine.end_session(),
                    }
                }

                match source.recv_delta(DRAIN_TIMEOUT) {
                    Ok(delta) => {
                        if !source.is_paused() {
                            engine.handle_rotation_impulse(seconds_from_cycles(
                                delta,
                                cycles_per_sec,
                            ));
                        }
                        // Catch up on any burst without waiting on the clock.
                        while let Some(delta) = source.try_delta() {
                            if source.is_paused() {
                                continue;
                            }
                            engine.handle_rotation_impulse(seconds_from_cycles(
                                delta,
                                cycles_per_sec,
                            ));
                        }
                    }
                    Err(xch::RecvTimeoutError::Timeout) => {}
                    Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("all edge handles dropped, worker exiting");
                        break;
                    }
                }
            }
            tracing::trace!("impulse worker exiting cleanly");
        });

        Self {
            control,
            snapshot,
            cmd_tx,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Read handle over the engine's published snapshots.
    #[must_use]
    pub fn snapshot(&self) -> SnapshotHandle {
        self.snapshot.clone()
    }

    /// Pause acquisition; queued samples are discarded, not processed.
    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    #[must_use]
    pub fn overflow_count(&self) -> u32 {
        self.control.overflow_count()
    }

    pub fn reset(&self) {
        let _ = self.cmd_tx.send(WorkerCommand::Reset);
    }

    pub fn start_session(&self) {
        let _ = self.cmd_tx.send(WorkerCommand::StartSession);
    }

    pub fn end_session(&self) {
        let _ = self.cmd_tx.send(WorkerCommand::EndSession);
    }
}

impl Drop for ImpulseWorker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("impulse worker joined"),
                Err(e) => tracing::warn!(?e, "impulse worker panicked during shutdown"),
            }
        }
    }
}
