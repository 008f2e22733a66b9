//! Resiliency cache for the live timer.
//!
//! The arithmetic state of the active countdown is written to `timer.json`
//! on every mutation, so a new process (or a reloaded page, in the
//! original's terms) picks the countdown back up mid-flight. Because the
//! state only records instants, time keeps passing correctly while no
//! process is running.

use std::path::PathBuf;

use crate::timer::TimerState;

#[derive(Debug)]
pub struct TimerCache {
    path: PathBuf,
}

impl TimerCache {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// The cached state, or `None` when absent or unreadable.
    pub fn load(&self) -> Option<TimerState> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!("discarding unreadable timer cache: {e}");
                None
            }
        }
    }

    pub fn save(&self, state: &TimerState) -> std::io::Result<()> {
        let content = serde_json::to_string(state)?;
        std::fs::write(&self.path, content)
    }
}
