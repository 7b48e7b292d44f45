//! Callback surface for downstream consumers (notifier, logger).

use crate::snapshot::RowerSnapshot;

/// Stroke and metrics callbacks, each receiving a by-value snapshot taken
/// after the engine finished mutating its state for the triggering impulse.
///
/// Contract for implementors:
/// - do not block; a rate limiter belongs in the consumer, not here
/// - do not retain references into the engine (the snapshot is a copy)
/// - callbacks run on the worker context, strictly between impulses
pub trait RowingObserver {
    /// Fires exactly once per drive entry.
    fn on_stroke_start(&mut self, snapshot: RowerSnapshot) {
        let _ = snapshot;
    }

    /// Fires exactly once per recovery entry.
    fn on_stroke_end(&mut self, snapshot: RowerSnapshot) {
        let _ = snapshot;
    }

    /// Fires on every non-transition impulse, after the torque update.
    fn on_metrics_update(&mut self, snapshot: RowerSnapshot) {
        let _ = snapshot;
    }
}

/// Observer that ignores everything. Useful as an explicit default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RowingObserver for NullObserver {}
