//! Debug logging utilities.
//!
//! Nothing here ever writes to stdout or stderr: the controller parses our
//! stdout, so diagnostics go to a file under the user cache directory.

use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable that turns the debug log on
pub const DEBUG_ENV: &str = "JJCB_DEBUG";

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug logging from the environment
pub fn init_from_env() {
    init_debug(env_enables_debug(std::env::var(DEBUG_ENV).ok().as_deref()));
}

fn env_enables_debug(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0")
}

/// Initialize debug logging
pub fn init_debug(enabled: bool) {
    let _ = DEBUG_ENABLED.set(enabled);
    if enabled {
        if let Some(parent) = debug_log_path().as_ref().and_then(|p| p.parent()) {
            let _ = fs::create_dir_all(parent);
        }
    }
}

/// Record which directory this run announces and which marker it waits on.
/// Appended, never truncated: a controller may have several of us running.
pub fn log_startup(cwd: &Path, termination_path: &Path) {
    debug_log(&startup_banner(std::process::id(), cwd, termination_path));
}

fn startup_banner(pid: u32, cwd: &Path, termination_path: &Path) -> String {
    format!(
        "=== jjcb {} pid {} in {}, waiting for {} to be removed ===",
        env!("CARGO_PKG_VERSION"),
        pid,
        cwd.display(),
        termination_path.display()
    )
}

/// Get the path to the debug log file
pub fn debug_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|c| c.join("jjcb").join("debug.log"))
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    *DEBUG_ENABLED.get().unwrap_or(&false)
}

/// Write a debug log message
pub fn debug_log(msg: &str) {
    if is_debug_enabled() {
        if let Some(path) = debug_log_path() {
            if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
                let timestamp = Local::now().format("%H:%M:%S%.3f");
                let _ = writeln!(file, "[{}] {}", timestamp, msg);
            }
        }
    }
}
