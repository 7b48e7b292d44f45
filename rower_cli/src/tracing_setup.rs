//! Tracing initialization: console layer (pretty or JSON) plus an optional
//! rotating file sink from the `[logging]` config section.

use crate::cli::FILE_GUARD;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing(
    json: bool,
    level: &str,
    file: Option<&str>,
    rotation: Option<&str>,
) -> eyre::Result<()> {
    // RUST_LOG wins over the CLI flag, which wins over "info".
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .map_or_else(|| "rower.log".into(), |n| n.to_string_lossy().into_owned());
            let appender = match rotation.unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_writer(writer))
        }
        None => None,
    };

    // Keep stdout clean for JSONL records; logs always go to stderr.
    let console = fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if json {
        registry.with(console.json()).try_init()?;
    } else {
        registry.with(console).try_init()?;
    }
    Ok(())
}
