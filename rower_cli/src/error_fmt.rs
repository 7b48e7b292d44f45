//! Human-readable error descriptions, structured JSON error output, and the
//! stable exit-code mapping.

use rower_core::BuildError;

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(BuildError::InvalidSettings(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: The rower settings are invalid ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file and rerun; an empty file is a valid default."
        );
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") || lower.contains("must be") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again."
        );
    }
    if lower.contains("impulse log") {
        return format!(
            "What happened: The impulse log could not be read.\nDetails: {msg}\nHow to fix: The file must be a CSV with the single header 'dt_s' and positive intervals."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Structured single-line JSON error for `--json` mode.
pub fn format_error_json(err: &eyre::Report) -> String {
    let kind = if err.downcast_ref::<BuildError>().is_some() {
        "settings"
    } else {
        let lower = err.to_string().to_ascii_lowercase();
        if lower.contains("impulse log") {
            "input"
        } else if lower.contains("invalid configuration") || lower.contains("must be") {
            "config"
        } else {
            "runtime"
        }
    };
    serde_json::json!({
        "event": "error",
        "kind": kind,
        "message": err.to_string(),
    })
    .to_string()
}

/// Stable exit codes: 2 for configuration/settings problems, 3 for unusable
/// input files, 1 for anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains("invalid configuration") || lower.contains("must be") {
        2
    } else if lower.contains("impulse log") {
        3
    } else {
        1
    }
}
