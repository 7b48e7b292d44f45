//! Command implementations: CSV replay through the engine, and a full
//! pipeline run against the simulated flywheel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rower_core::engine::RowingEngine;
use rower_core::settings::RowerSettings;
use rower_core::snapshot::{RowerSnapshot, RowerState};
use rower_core::source::ImpulseSource;
use rower_core::worker::ImpulseWorker;
use rower_core::{NullObserver, RowingObserver};
use rower_hardware::SimulatedFlywheel;
use rower_traits::InstantCounter;

/// Observer that emits one record per completed stroke.
struct StrokeEmitter {
    json: bool,
}

impl RowingObserver for StrokeEmitter {
    fn on_stroke_end(&mut self, s: RowerSnapshot) {
        if self.json {
            println!(
                "{}",
                serde_json::json!({
                    "event": "stroke",
                    "n": s.stroke_count,
                    "spm": s.strokes_per_minute,
                    "power_w": s.power,
                    "speed_ms": s.speed,
                    "distance_m": s.distance,
                    "drive_s": s.drive_duration,
                    "drag_factor": s.drag_factor,
                })
            );
        } else {
            println!(
                "stroke {:>3}  {:>5.1} spm  {:>6.1} W  {:>5.2} m/s  {:>7.1} m",
                s.stroke_count, s.strokes_per_minute, s.power, s.speed, s.distance
            );
        }
    }
}

fn emit_summary(s: &RowerSnapshot, json: bool, overflows: u32) {
    let samples = f64::from(s.stroke_samples.max(1));
    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "summary",
                "strokes": s.stroke_count,
                "distance_m": s.distance,
                "total_time_s": s.total_time,
                "avg_power_w": s.session_power_sum / samples,
                "avg_speed_ms": s.session_speed_sum / samples,
                "drag_factor": s.drag_factor,
                "queue_overflows": overflows,
            })
        );
    } else {
        println!(
            "summary: {} strokes, {:.1} m in {:.1} s, avg {:.1} W, drag {:.2}",
            s.stroke_count,
            s.distance,
            s.total_time,
            s.session_power_sum / samples,
            s.drag_factor * 1.0e6
        );
    }
}

/// Feed a recorded impulse log straight through the engine.
pub fn run_replay(
    settings: RowerSettings,
    intervals: &[f64],
    json: bool,
    summary_only: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    let mut engine = RowingEngine::new(settings)?;
    if summary_only {
        engine.set_observer(NullObserver);
    } else {
        engine.set_observer(StrokeEmitter { json });
    }
    engine.start_session();

    tracing::info!(impulses = intervals.len(), "replay started");
    for &dt in intervals {
        if shutdown.load(Ordering::SeqCst) {
            tracing::warn!("replay interrupted");
            break;
        }
        engine.handle_rotation_impulse(dt);
    }
    engine.end_session();

    emit_summary(&engine.snapshot(), json, 0);
    Ok(())
}

/// Row `strokes` cycles at `spm` through the whole acquisition pipeline:
/// simulated flywheel -> edge handle -> bounded queue -> worker -> engine.
///
/// `time_scale` compresses wall-clock time; the timing gates are scaled
/// along with it so the physics stays self-consistent.
pub fn run_simulate(
    settings: RowerSettings,
    queue_capacity: usize,
    strokes: u32,
    spm: f64,
    time_scale: f64,
    json: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    if !(spm.is_finite() && spm > 0.0) {
        eyre::bail!("invalid configuration: --spm must be > 0");
    }
    if !(time_scale.is_finite() && time_scale > 0.0 && time_scale <= 10.0) {
        eyre::bail!("invalid configuration: --time-scale must lie in (0, 10]");
    }

    let settings = scale_timing(settings, time_scale);
    let engine = RowingEngine::new(settings)?;
    let snapshot = engine.shared();

    let source = ImpulseSource::new(InstantCounter::new(), queue_capacity);
    let edge = source.edge_handle();
    let worker = ImpulseWorker::spawn(source, engine);
    worker.start_session();

    let intervals = stroke_intervals(strokes, spm, time_scale);
    let expected_time: f64 = intervals.iter().sum();
    tracing::info!(
        strokes,
        spm,
        time_scale,
        impulses = intervals.len(),
        "simulation started"
    );

    let sim = SimulatedFlywheel::spawn(intervals, move || edge.on_edge());
    // The flywheel thread paces itself; wait for it while honoring Ctrl-C.
    let deadline = Instant::now() + Duration::from_secs_f64(expected_time * 2.0 + 5.0);
    let mut interrupted = false;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }
        let done = snapshot.read().total_time >= expected_time * 0.9;
        if done || Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    drop(sim);
    if interrupted {
        tracing::warn!("simulation interrupted");
    }

    // Let the worker drain whatever is still queued, then close out.
    std::thread::sleep(Duration::from_millis(100));
    worker.end_session();
    let deadline = Instant::now() + Duration::from_secs(2);
    while snapshot.read().state != RowerState::Idle && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }

    emit_summary(&snapshot.read(), json, worker.overflow_count());
    Ok(())
}

/// Scale every timing gate by `k`, keeping the detector maths consistent
/// when the simulation runs faster than real time.
fn scale_timing(mut s: RowerSettings, k: f64) -> RowerSettings {
    s.minimum_impulse_time *= k;
    s.maximum_impulse_time *= k;
    s.minimum_drive_time *= k;
    s.minimum_recovery_time *= k;
    s.pause_timeout *= k;
    s
}

/// Square-wave impulse intervals for `strokes` cycles at `spm`: roughly a
/// third of each cycle driving fast impulses, the rest coasting slower ones.
fn stroke_intervals(strokes: u32, spm: f64, time_scale: f64) -> Vec<f64> {
    let cycle = 60.0 / spm;
    let drive_span = cycle * 0.35;
    let recovery_span = cycle - drive_span;
    let n_drive = ((drive_span / 0.02).round() as usize).max(2);
    let n_recovery = ((recovery_span / 0.035).round() as usize).max(2);

    let mut out = Vec::with_capacity(strokes as usize * (n_drive + n_recovery));
    for _ in 0..strokes {
        out.extend(std::iter::repeat_n(0.02 * time_scale, n_drive));
        out.extend(std::iter::repeat_n(0.035 * time_scale, n_recovery));
    }
    out
}
