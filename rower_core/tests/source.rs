//! Edge timestamping: priming, wrap-around deltas, overflow accounting, and
//! pause/resume semantics, all driven by a hand-advanced cycle counter.

use std::sync::Arc;

use rower_core::engine::RowingEngine;
use rower_core::mocks::ManualCounter;
use rower_core::settings::RowerSettings;
use rower_core::source::ImpulseSource;

fn test_settings() -> RowerSettings {
    RowerSettings {
        impulses_per_rev: 1.0,
        smoothing: 2,
        flank_length: 2,
        errors_allowed: 0,
        minimum_impulse_time: 0.005,
        maximum_impulse_time: 0.5,
        pause_timeout: 3.0,
        ..RowerSettings::default()
    }
}

/// Counter kept on the test side, source reading it through a shared handle.
fn rig(capacity: usize) -> (Arc<ManualCounter>, ImpulseSource<Arc<ManualCounter>>) {
    let counter = Arc::new(ManualCounter::new());
    let source = ImpulseSource::new(Arc::clone(&counter), capacity);
    (counter, source)
}

#[test]
fn first_edge_only_primes_the_timestamp() {
    let (_counter, source) = rig(8);
    let edge = source.edge_handle();
    let mut engine = RowingEngine::new(test_settings()).unwrap();

    edge.on_edge();
    assert_eq!(source.drain_into(&mut engine), 0, "priming edge emits nothing");
    assert_eq!(engine.snapshot().total_time, 0.0);
}

#[test]
fn deltas_convert_to_seconds_in_the_worker() {
    let (counter, source) = rig(8); // 1 MHz counter
    let edge = source.edge_handle();
    let mut engine = RowingEngine::new(test_settings()).unwrap();

    edge.on_edge(); // prime
    for _ in 0..3 {
        counter.advance(20_000); // 20 ms
        edge.on_edge();
    }
    assert_eq!(source.drain_into(&mut engine), 3);
    assert!((engine.snapshot().total_time - 0.06).abs() < 1e-12);
}

#[test]
fn wrapping_counter_still_yields_the_right_delta() {
    let (counter, source) = rig(8);
    counter.set(u32::MAX - 5_000); // 5 ms before rollover
    let edge = source.edge_handle();
    let mut engine = RowingEngine::new(test_settings()).unwrap();

    edge.on_edge(); // prime just before the wrap
    counter.advance(20_000); // crosses the wrap
    edge.on_edge();
    assert_eq!(source.drain_into(&mut engine), 1);
    assert!((engine.snapshot().total_time - 0.02).abs() < 1e-12);
}

#[test]
fn full_queue_drops_samples_and_counts_them() {
    let (counter, source) = rig(2);
    let edge = source.edge_handle();

    edge.on_edge(); // prime
    for _ in 0..5 {
        counter.advance(20_000);
        edge.on_edge();
    }
    // Capacity 2: three of the five deltas were dropped at the boundary.
    assert_eq!(source.overflow_count(), 3);

    let mut engine = RowingEngine::new(test_settings()).unwrap();
    assert_eq!(source.drain_into(&mut engine), 2);
    // The two delivered deltas preserved FIFO order and their timing.
    assert!((engine.snapshot().total_time - 0.04).abs() < 1e-12);
}

#[test]
fn paused_source_ignores_edges_and_drains_the_queue() {
    let (counter, source) = rig(8);
    let edge = source.edge_handle();
    let mut engine = RowingEngine::new(test_settings()).unwrap();

    edge.on_edge();
    counter.advance(20_000);
    edge.on_edge();
    source.pause();

    // Edges during pause produce nothing, and the queued delta is gone.
    counter.advance(20_000);
    edge.on_edge();
    assert_eq!(source.drain_into(&mut engine), 0);
    assert_eq!(engine.snapshot().total_time, 0.0);
    assert_eq!(source.overflow_count(), 0, "ignored edges are not overflow");
}

#[test]
fn resume_reprimes_before_emitting() {
    let (counter, source) = rig(8);
    let edge = source.edge_handle();
    let mut engine = RowingEngine::new(test_settings()).unwrap();

    edge.on_edge();
    counter.advance(20_000);
    edge.on_edge();
    assert_eq!(source.drain_into(&mut engine), 1);

    source.pause();
    source.resume();

    // A long gap passed while paused; the first edge after resume must not
    // turn it into a bogus interval.
    counter.advance(10_000_000);
    edge.on_edge();
    assert_eq!(source.drain_into(&mut engine), 0, "first edge after resume primes");

    counter.advance(20_000);
    edge.on_edge();
    assert_eq!(source.drain_into(&mut engine), 1);
    assert!((engine.snapshot().total_time - 0.04).abs() < 1e-12);
}

#[test]
fn control_handle_operates_across_clones() {
    let (_counter, source) = rig(8);
    let control = source.control();
    let control2 = control.clone();

    control.pause();
    assert!(control2.is_paused());
    control2.resume();
    assert!(!control.is_paused());
}

#[test]
fn edge_handles_are_cloneable_for_isr_trampolines() {
    let (counter, source) = rig(8);
    let edge_a = source.edge_handle();
    let edge_b = edge_a.clone();
    let mut engine = RowingEngine::new(test_settings()).unwrap();

    edge_a.on_edge(); // prime through one handle
    counter.advance(20_000);
    edge_b.on_edge(); // emit through the other
    assert_eq!(source.drain_into(&mut engine), 1);
}
