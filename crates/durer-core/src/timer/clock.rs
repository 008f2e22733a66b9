//! Pure countdown arithmetic.
//!
//! Remaining time is always derived from wall-clock instants recorded in
//! [`TimerState`] -- there is no decrementing counter anywhere, so the
//! countdown cannot drift no matter how irregularly it is observed. All
//! functions here are side-effect free; the caller supplies `now`.

use serde::{Deserialize, Serialize};

/// Arithmetic model of one countdown.
///
/// Serializes in camelCase to stay byte-compatible with the JSON the remote
/// store already holds (`totalMs`, `startTime`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Configured countdown length in milliseconds. May go negative after
    /// repeated `add_seconds` removals; the display clamps, the arithmetic
    /// does not, so a later addition restores the true remaining time.
    pub total_ms: i64,
    pub paused: bool,
    /// Wall-clock instant (epoch ms) of the first start. `None` until then.
    pub start_time: Option<i64>,
    /// Instant of the most recent pause transition. Meaningful only while
    /// `paused`; stale while running.
    pub pause_start: i64,
    /// Cumulative milliseconds spent paused since `start_time`. Only grows,
    /// and only at resume transitions.
    pub total_pause_ms: i64,
}

impl TimerState {
    /// A countdown of `total_ms` that has never been started.
    pub fn new(total_ms: i64, now: i64) -> Self {
        Self {
            total_ms,
            paused: true,
            start_time: None,
            pause_start: now,
            total_pause_ms: 0,
        }
    }
}

/// Signed milliseconds left until expiry at instant `now`; negative past
/// expiry. While paused the pause instant is used instead of `now`, so no
/// further time accrues.
pub fn remaining_ms(state: &TimerState, now: i64) -> i64 {
    let Some(start) = state.start_time else {
        return state.total_ms;
    };
    let elapsed = if state.paused {
        state.pause_start - start - state.total_pause_ms
    } else {
        now - start - state.total_pause_ms
    };
    state.total_ms - elapsed
}

/// Clock-face decomposition of a remaining duration. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Ceiling decomposition: the displayed second only decrements once the
    /// full second has elapsed, so the face never reads 0:00 while time is
    /// left. Anything at or past expiry reads 0:00.
    pub fn from_ms(remaining_ms: i64) -> Self {
        if remaining_ms <= 0 {
            return Self::ZERO;
        }
        let total_secs = (remaining_ms as u64).div_ceil(1000);
        Self {
            hours: total_secs / 3600,
            minutes: (total_secs % 3600) / 60,
            seconds: total_secs % 60,
        }
    }
}

impl std::fmt::Display for TimeRemaining {
    /// `H:MM:SS` once hours are involved, `M:SS` below that.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.hours > 0 {
            write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        } else {
            write!(f, "{}:{:02}", self.minutes, self.seconds)
        }
    }
}
