//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rower", version, about = "Air-rower monitor CLI")]
pub struct Cli {
    /// Path to config TOML (all sections optional)
    #[arg(long, value_name = "FILE", default_value = "etc/rower_config.toml")]
    pub config: PathBuf,

    /// Emit stroke and summary records as JSON lines on stdout
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded impulse log through the physics engine
    Replay {
        /// Impulse CSV (header: dt_s)
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Suppress per-stroke records, print only the final summary
        #[arg(long, action = ArgAction::SetTrue)]
        summary_only: bool,
    },
    /// Drive the full edge->queue->worker pipeline from a simulated flywheel
    Simulate {
        /// Number of stroke cycles to row
        #[arg(long, default_value_t = 4)]
        strokes: u32,
        /// Target cadence in strokes per minute
        #[arg(long, default_value_t = 24.0)]
        spm: f64,
        /// Wall-clock scale; 0.1 rows ten times faster than real time
        #[arg(long, default_value_t = 1.0)]
        time_scale: f64,
        /// Request realtime scheduling and memory locking for the run
        #[arg(long, action = ArgAction::SetTrue)]
        rt: bool,
    },
}
