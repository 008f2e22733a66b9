//! Countdown state machine.
//!
//! Exactly two states, `Running` and `Paused`, starting `Paused`. The
//! machine records instants and accumulates pause time; it never counts
//! down itself -- see [`clock`](super::clock) for the derivation.
//!
//! ```text
//! Paused -(toggle: first ever sets start_time)-> Running
//! Running -(toggle: pause_start = now)-> Paused
//! Paused -(toggle: total_pause_ms += now - pause_start)-> Running
//! ```

use chrono::Utc;

use super::clock::{self, TimeRemaining, TimerState};
use crate::events::Event;

/// Owns one [`TimerState`] and exposes its controlled mutations.
///
/// Every command has an `_at` variant taking an explicit epoch-ms instant;
/// the plain variants read the system clock. Mutations take `&mut self`, so
/// a reader can never observe a half-applied transition.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    state: TimerState,
}

impl CountdownTimer {
    /// A fresh, never-started countdown of `total_ms`.
    pub fn new(total_ms: i64) -> Self {
        Self {
            state: TimerState::new(total_ms, now_ms()),
        }
    }

    pub fn from_state(state: TimerState) -> Self {
        Self { state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Whether the countdown has ever been started.
    pub fn started(&self) -> bool {
        self.state.start_time.is_some()
    }

    /// Signed remaining milliseconds as of the system clock.
    pub fn remaining_ms(&self) -> i64 {
        clock::remaining_ms(&self.state, now_ms())
    }

    /// Clock-face value for display.
    pub fn time(&self) -> TimeRemaining {
        TimeRemaining::from_ms(self.remaining_ms())
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let remaining = self.remaining_ms();
        Event::StateSnapshot {
            paused: self.state.paused,
            started: self.started(),
            remaining_ms: remaining,
            total_ms: self.state.total_ms,
            time: TimeRemaining::from_ms(remaining),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// First-ever start. No-op if the countdown already ran once; restarts
    /// go through [`replace`](Self::replace) with a fresh state instead.
    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now: i64) -> Option<Event> {
        if self.state.start_time.is_some() {
            return None;
        }
        self.state.start_time = Some(now);
        self.state.paused = false;
        Some(Event::TimerStarted {
            total_ms: self.state.total_ms,
            at: Utc::now(),
        })
    }

    /// Flip between running and paused.
    pub fn toggle(&mut self) -> Event {
        self.toggle_at(now_ms())
    }

    pub fn toggle_at(&mut self, now: i64) -> Event {
        if self.state.start_time.is_none() {
            // First transition doubles as the start.
            self.state.start_time = Some(now);
            self.state.paused = false;
            return Event::TimerStarted {
                total_ms: self.state.total_ms,
                at: Utc::now(),
            };
        }
        if self.state.paused {
            self.state.total_pause_ms += now - self.state.pause_start;
            self.state.paused = false;
            Event::TimerResumed {
                remaining_ms: clock::remaining_ms(&self.state, now),
                at: Utc::now(),
            }
        } else {
            self.state.pause_start = now;
            self.state.paused = true;
            Event::TimerPaused {
                remaining_ms: clock::remaining_ms(&self.state, now),
                at: Utc::now(),
            }
        }
    }

    /// Shift the configured duration by `delta` seconds (negative removes
    /// time). No floor: the total may go negative and a later addition
    /// restores the true remaining time. Callers clamp for UX if they want.
    pub fn add_seconds(&mut self, delta: i64) -> Event {
        let delta_ms = delta * 1000;
        self.state.total_ms += delta_ms;
        Event::DurationAdjusted {
            delta_ms,
            total_ms: self.state.total_ms,
            at: Utc::now(),
        }
    }

    /// Wholesale state replacement -- all five fields at once, so start and
    /// pause bookkeeping can never end up incoherent halves of two timers.
    pub fn replace(&mut self, state: TimerState) -> Event {
        self.state = state;
        Event::StateReplaced {
            remaining_ms: self.remaining_ms(),
            at: Utc::now(),
        }
    }
}

pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
