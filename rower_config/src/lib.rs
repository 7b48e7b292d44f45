#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and impulse-log parsing for the rowing monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section has sensible Concept2-style defaults, so an empty file is
//!   a working configuration for a three-magnet air rower.
//! - The impulse CSV loader enforces a strict header and rejects non-finite
//!   or non-positive intervals, so replay tooling never feeds the engine
//!   garbage the hardware path could not produce.
//!
//! The engine itself consumes plain doubles (`rower_core::RowerSettings`);
//! whatever encoding lives on disk is private to this crate.
use serde::Deserialize;

/// Flywheel mechanics and the Concept2 coupling constant.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Flywheel {
    /// Magnets (or slots) passing the sensor per revolution.
    pub impulses_per_rev: u32,
    /// Flywheel moment of inertia in kg*m^2.
    pub inertia_kg_m2: f64,
    /// Drag-to-boat-speed coupling constant (2.8 for the Concept2 model).
    pub magic_constant: f64,
}

impl Default for Flywheel {
    fn default() -> Self {
        Self {
            impulses_per_rev: 3,
            inertia_kg_m2: 0.1001,
            magic_constant: 2.8,
        }
    }
}

/// Timing gates in seconds.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Timing {
    /// Shortest valid interval between impulses; anything faster is bounce.
    pub min_impulse_s: f64,
    /// Longest valid interval between impulses.
    pub max_impulse_s: f64,
    /// Minimum duration of a valid drive phase.
    pub min_drive_s: f64,
    /// Minimum duration of a valid recovery phase.
    pub min_recovery_s: f64,
    /// An interval longer than this is treated as a workout pause.
    pub pause_timeout_s: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            min_impulse_s: 0.014,
            max_impulse_s: 0.5,
            min_drive_s: 0.3,
            min_recovery_s: 0.9,
            pause_timeout_s: 3.0,
        }
    }
}

/// Flank detection and noise-filter tuning.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Filter {
    /// Moving-average window over clean intervals.
    pub smoothing: usize,
    /// Trend window length used to confirm a phase change.
    pub flank_length: usize,
    /// Direction errors tolerated inside one trend window.
    pub errors_allowed: usize,
    /// Lower plausibility bound as a ratio of the previous clean interval.
    pub max_downward_ratio: f64,
    /// Upper plausibility bound as a ratio of the previous clean interval.
    pub max_upward_ratio: f64,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            smoothing: 4,
            flank_length: 3,
            errors_allowed: 0,
            max_downward_ratio: 0.25,
            max_upward_ratio: 1.75,
        }
    }
}

/// Drag-factor calibration.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Drag {
    /// Base drag factor in N*m*s^2 (displayed drag = this * 1e6).
    pub base_drag_factor: f64,
    /// Recalculate the drag factor from each recovery's deceleration.
    pub auto_adjust: bool,
    /// Averager length over accepted per-stroke drag samples.
    pub smoothing: usize,
    /// Maximum per-stroke drag change as a ratio of the running average.
    pub max_change_ratio: f64,
}

impl Default for Drag {
    fn default() -> Self {
        Self {
            base_drag_factor: 1.0e-4,
            auto_adjust: true,
            smoothing: 5,
            max_change_ratio: 0.10,
        }
    }
}

/// Impulse source wiring.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Source {
    /// Bounded ISR-to-worker queue capacity (samples are dropped when full).
    pub queue_capacity: usize,
    /// BCM pin carrying the sensor edge (hardware builds only).
    pub gpio_pin: Option<u8>,
    /// Treat a falling edge as the magnet pass.
    pub active_low: bool,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            gpio_pin: None,
            active_low: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    /// Path to a .log file (JSON lines).
    pub file: Option<String>,
    /// "error" | "warn" | "info" | "debug" | "trace"
    pub level: Option<String>,
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub flywheel: Flywheel,
    pub timing: Timing,
    pub filter: Filter,
    pub drag: Drag,
    pub source: Source,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate the configuration with clear errors. Called once at startup;
    /// the engine assumes validated settings afterwards.
    pub fn validate(&self) -> eyre::Result<()> {
        let f = &self.flywheel;
        if f.impulses_per_rev == 0 {
            eyre::bail!("flywheel.impulses_per_rev must be >= 1");
        }
        if !(f.inertia_kg_m2.is_finite() && f.inertia_kg_m2 > 0.0) {
            eyre::bail!("flywheel.inertia_kg_m2 must be a positive number");
        }
        if !(f.magic_constant.is_finite() && f.magic_constant > 0.0) {
            eyre::bail!("flywheel.magic_constant must be a positive number");
        }

        let t = &self.timing;
        for (name, v) in [
            ("timing.min_impulse_s", t.min_impulse_s),
            ("timing.max_impulse_s", t.max_impulse_s),
            ("timing.min_drive_s", t.min_drive_s),
            ("timing.min_recovery_s", t.min_recovery_s),
            ("timing.pause_timeout_s", t.pause_timeout_s),
        ] {
            if !(v.is_finite() && v > 0.0) {
                eyre::bail!("{name} must be a positive number of seconds");
            }
        }
        if t.min_impulse_s >= t.max_impulse_s {
            eyre::bail!("timing.min_impulse_s must be below timing.max_impulse_s");
        }
        if t.pause_timeout_s < t.max_impulse_s {
            eyre::bail!("timing.pause_timeout_s must not be below timing.max_impulse_s");
        }

        let flt = &self.filter;
        if flt.smoothing == 0 {
            eyre::bail!("filter.smoothing must be >= 1");
        }
        if flt.flank_length < 2 {
            eyre::bail!("filter.flank_length must be >= 2");
        }
        if !(flt.max_downward_ratio.is_finite()
            && flt.max_downward_ratio > 0.0
            && flt.max_downward_ratio < 1.0)
        {
            eyre::bail!("filter.max_downward_ratio must lie in (0, 1)");
        }
        if !(flt.max_upward_ratio.is_finite() && flt.max_upward_ratio > 1.0) {
            eyre::bail!("filter.max_upward_ratio must be above 1");
        }

        let d = &self.drag;
        if !(d.base_drag_factor.is_finite() && d.base_drag_factor > 0.0) {
            eyre::bail!("drag.base_drag_factor must be a positive number");
        }
        if d.smoothing == 0 {
            eyre::bail!("drag.smoothing must be >= 1");
        }
        if !(d.max_change_ratio.is_finite()
            && d.max_change_ratio >= 0.0
            && d.max_change_ratio < 1.0)
        {
            eyre::bail!("drag.max_change_ratio must lie in [0, 1)");
        }

        if self.source.queue_capacity == 0 {
            eyre::bail!("source.queue_capacity must be >= 1");
        }

        Ok(())
    }
}

/// One row of a recorded impulse log.
///
/// Expected header:
/// dt_s
///
/// Example:
/// dt_s
/// 0.0153
/// 0.0149
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ImpulseRow {
    pub dt_s: f64,
}

/// Load a recorded impulse log (one inter-impulse interval per row, seconds).
///
/// The header is enforced so a calibration or power CSV cannot be replayed by
/// accident. Rows must be finite and strictly positive.
pub fn load_impulse_csv(path: &std::path::Path) -> eyre::Result<Vec<f64>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open impulse log {}: {e}", path.display()))?;
    read_impulse_csv(file)
}

/// Reader-based variant of [`load_impulse_csv`] for tests and stdin replay.
pub fn read_impulse_csv<R: std::io::Read>(reader: R) -> eyre::Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    {
        let headers = rdr.headers()?;
        if headers.len() != 1 || headers.get(0) != Some("dt_s") {
            eyre::bail!("impulse log must have the single header 'dt_s'");
        }
    }

    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<ImpulseRow>().enumerate() {
        let row = row.map_err(|e| eyre::eyre!("impulse log row {}: {e}", i + 1))?;
        if !row.dt_s.is_finite() || row.dt_s <= 0.0 {
            eyre::bail!(
                "impulse log row {}: dt_s must be finite and > 0, got {}",
                i + 1,
                row.dt_s
            );
        }
        out.push(row.dt_s);
    }
    Ok(out)
}
