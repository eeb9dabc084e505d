//! Termination marker polling.

use crate::debug::debug_log;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Delay between two existence checks. Fixed; there is no knob for it.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of a single existence check on the marker path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Present,
    Absent,
    /// The check failed with something other than "not found"
    Unreadable(io::ErrorKind),
}

impl MarkerState {
    /// Stat the marker once, following symlinks.
    pub fn check(path: &Path) -> MarkerState {
        match fs::metadata(path) {
            Ok(_) => MarkerState::Present,
            Err(e) if e.kind() == io::ErrorKind::NotFound => MarkerState::Absent,
            Err(e) => MarkerState::Unreadable(e.kind()),
        }
    }
}

/// Block until the marker at `path` no longer exists.
///
/// Returns the number of checks performed. A marker that is already gone
/// returns after a single check without sleeping.
pub fn wait_for_removal(path: &Path) -> u64 {
    poll_until_absent(|| MarkerState::check(path), POLL_INTERVAL)
}

/// Run `check` until it reports [`MarkerState::Absent`], sleeping `interval`
/// between attempts. Errors are retried forever.
pub fn poll_until_absent<F>(mut check: F, interval: Duration) -> u64
where
    F: FnMut() -> MarkerState,
{
    let mut checks = scopeguard::guard(0u64, |n| {
        debug_log(&format!("stopped polling after {} check(s)", n));
    });
    let mut reported: HashSet<io::ErrorKind> = HashSet::new();

    loop {
        *checks += 1;
        match check() {
            MarkerState::Absent => return *checks,
            MarkerState::Present => {}
            MarkerState::Unreadable(kind) => {
                if reported.insert(kind) {
                    debug_log(&format!("marker check failed ({:?}), retrying", kind));
                }
            }
        }
        thread::sleep(interval);
    }
}
