mod config;
mod saved;
mod settings;
mod timer_cache;

pub use config::{Config, RemoteConfig, TimerConfig};
pub use saved::{prune_expired, SavedState, StateStore, GRACE_WINDOW_MS};
pub use settings::{AppSettings, EmbedSettings, SettingsStore};
pub use timer_cache::TimerCache;

use std::path::PathBuf;

/// Returns `~/.config/durer[-dev]/` based on DURER_ENV, or whatever
/// DURER_DATA_DIR points at (the override exists for hermetic tests).
///
/// Set DURER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    if let Ok(dir) = std::env::var("DURER_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DURER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("durer-dev")
    } else {
        base_dir.join("durer")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
