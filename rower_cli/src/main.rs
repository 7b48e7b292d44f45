#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! CLI entrypoint for the rowing monitor.
//!
//! Responsibilities:
//! - Parse config/flags and assemble the pipeline
//! - Initialize tracing and manage log sinks
//! - Offer `--json` mode emitting stable JSONL lines to stdout (logs to stderr)
//! - Map configuration and input problems to stable exit codes

mod cli;
mod error_fmt;
mod replay;
mod rt;
mod tracing_setup;

use std::fs;

use clap::Parser;
use eyre::WrapErr;
use rower_core::settings::RowerSettings;

use cli::{Cli, Commands, JSON_MODE};
use error_fmt::{exit_code_for_error, format_error_json, humanize};
use tracing_setup::init_tracing;

fn main() -> eyre::Result<()> {
    // Initialize pretty error reports early
    let _ = color_eyre::install();

    // Graceful shutdown on Ctrl-C
    let shutdown = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let shutdown_clone = std::sync::Arc::clone(&shutdown);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nReceived shutdown signal, stopping gracefully...");
        shutdown_clone.store(true, std::sync::atomic::Ordering::SeqCst);
    }) {
        eprintln!("Warning: Failed to set signal handler: {e}");
    }

    if let Err(e) = real_main(&shutdown) {
        let json = *JSON_MODE.get().unwrap_or(&false);
        let code = exit_code_for_error(&e);
        if json {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(code);
    }
    Ok(())
}

fn real_main(shutdown: &std::sync::Arc<std::sync::atomic::AtomicBool>) -> eyre::Result<()> {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    // 1) Load typed config from TOML. A missing file falls back to defaults,
    //    matching the firmware's behavior with an empty settings partition.
    let cfg: rower_config::Config = if cli.config.exists() {
        let text = fs::read_to_string(&cli.config)
            .wrap_err_with(|| format!("read config {:?}", cli.config))?;
        rower_config::load_toml(&text)
            .wrap_err_with(|| format!("parse config {:?}", cli.config))?
    } else {
        tracing::debug!(path = ?cli.config, "config file missing, using defaults");
        rower_config::Config::default()
    };
    cfg.validate().wrap_err("invalid configuration")?;

    init_tracing(
        cli.json,
        &cli.log_level,
        cfg.logging.file.as_deref(),
        cfg.logging.rotation.as_deref(),
    )?;

    let settings = RowerSettings::from(&cfg);

    match cli.cmd {
        Commands::Replay {
            input,
            summary_only,
        } => {
            let intervals = rower_config::load_impulse_csv(&input)?;
            replay::run_replay(settings, &intervals, cli.json, summary_only, shutdown)
        }
        Commands::Simulate {
            strokes,
            spm,
            time_scale,
            rt,
        } => {
            rt::setup_rt_once(rt);
            replay::run_simulate(
                settings,
                cfg.source.queue_capacity,
                strokes,
                spm,
                time_scale,
                cli.json,
                shutdown,
            )
        }
    }
}
