use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

/// Diagnostic log location: `$XDG_STATE_HOME/trail/trail.log`, falling back
/// to `~/.local/state/trail/trail.log`.
pub fn resolve_log_path() -> Option<PathBuf> {
    let state_dir = match std::env::var_os("XDG_STATE_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()?.join(".local").join("state"),
    };
    Some(state_dir.join("trail").join("trail.log"))
}

/// Routes the `log` facade to the state-dir file. The TUI owns the terminal,
/// so diagnostics cannot go to stdout/stderr. Failure to set the logger up
/// leaves it unset; nothing else depends on it.
pub fn init_file_logger() {
    let Some(path) = resolve_log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().append(true).create(true).open(&path) else {
        return;
    };
    let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
}
