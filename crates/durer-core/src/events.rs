use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimeRemaining;

/// Every timer mutation produces an Event. The CLI prints them as JSON;
/// embedders can route them wherever they like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        total_ms: i64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    DurationAdjusted {
        delta_ms: i64,
        total_ms: i64,
        at: DateTime<Utc>,
    },
    /// The whole arithmetic state was swapped out (saved or shared load).
    StateReplaced {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        paused: bool,
        started: bool,
        remaining_ms: i64,
        total_ms: i64,
        time: TimeRemaining,
        at: DateTime<Utc>,
    },
}
