pub mod check;
pub mod completions;
pub mod doctor;
pub mod down;
pub mod inspect;
pub mod man_pages;
pub mod plan;
pub mod resolve;
pub mod status;
pub mod systems;
pub mod up;

use indicatif::{ProgressBar, ProgressStyle};
use lamp_core::Engine;
use lamp_schema::{parse_fleet_file, HostClass};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_INCOMPATIBLE_HOST: u8 = 3;
pub const EXIT_RUNTIME_ERROR: u8 = 4;

/// Map an error message to the process exit code for its error class.
pub fn exit_code_for(msg: &str) -> u8 {
    const CONFIG_PREFIXES: &[&str] = &[
        "fleet error:",
        "unknown system",
        "merge conflict",
        "no configuration source",
        "failed to read configuration",
        "failed to parse configuration",
    ];
    if CONFIG_PREFIXES.iter().any(|p| msg.starts_with(p)) {
        EXIT_CONFIG_ERROR
    } else if msg.starts_with("incompatible host") {
        EXIT_INCOMPATIBLE_HOST
    } else if msg.starts_with("runtime error:") {
        EXIT_RUNTIME_ERROR
    } else {
        EXIT_FAILURE
    }
}

/// Build the engine from `--fleet` (or the built-in fleet) and `--config-dir`.
pub fn load_engine(fleet: Option<&Path>, config_dir: Option<&Path>) -> Result<Engine, String> {
    let engine = match fleet {
        Some(path) => {
            let normalized = parse_fleet_file(path)
                .and_then(|decl| decl.normalize())
                .map_err(|e| format!("fleet error: {e}"))?;
            Engine::from_fleet(&normalized)
        }
        None => Engine::builtin().map_err(|e| e.to_string())?,
    };
    Ok(match config_dir {
        Some(dir) => engine.with_provider(Box::new(lamp_core::DirectoryProvider::new(dir))),
        None => engine,
    })
}

/// Host class a command targets: the explicit flag, else the system's own.
pub fn target_host(engine: &Engine, system: &str, flag: Option<HostClass>) -> Result<HostClass, String> {
    match flag {
        Some(class) => Ok(class),
        None => engine
            .lookup(system)
            .map(|s| s.host_class)
            .map_err(|e| e.to_string()),
    }
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_status(status: &str) -> String {
    use console::Style;
    match status.trim_end() {
        "ok" | "running" => Style::new().green().apply_to(status).to_string(),
        "incompatible" => Style::new().yellow().apply_to(status).to_string(),
        "error" => Style::new().red().bold().apply_to(status).to_string(),
        "stopped" => Style::new().dim().apply_to(status).to_string(),
        _ => status.to_owned(),
    }
}

/// A status padded to `width` visible columns, then coloured.
pub fn status_cell(status: &str, width: usize) -> String {
    colorize_status(&format!("{status:<width$}"))
}
