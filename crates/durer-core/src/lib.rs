//! # Durer Core Library
//!
//! Core logic for the Durer countdown timer. All operations are available
//! through this library; the `durer` CLI binary is a thin shell over it.
//!
//! ## Architecture
//!
//! - **Clock**: pure arithmetic deriving remaining time from wall-clock
//!   instants -- the countdown cannot drift because nothing counts down
//! - **Timer engine**: a two-state (running/paused) machine recording
//!   instants and accumulated pause time
//! - **Storage**: JSON-file saved-state store with expiry pruning, plus
//!   TOML configuration and the settings repository
//! - **Share**: publish/resolve snapshots through a remote key-value store
//! - **Session**: pairs the live timer with the store and settings and
//!   routes every mutation through persistence
//!
//! ## Key Components
//!
//! - [`CountdownTimer`]: the timer state machine
//! - [`StateStore`]: saved snapshots with pruning and remote mirroring
//! - [`ShareClient`]: share-code publishing and resolution
//! - [`Session`]: orchestration used by the CLI

pub mod error;
pub mod events;
pub mod session;
pub mod share;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, Result, ShareError, StoreError};
pub use events::Event;
pub use session::Session;
pub use share::{Published, ShareClient};
pub use storage::{
    AppSettings, Config, EmbedSettings, SavedState, SettingsStore, StateStore, TimerCache,
    GRACE_WINDOW_MS,
};
pub use timer::{remaining_ms, CountdownTimer, Refresh, TimeRemaining, TimerState};
