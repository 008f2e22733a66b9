//! Periodic refresh for live countdown display.
//!
//! The arithmetic state of a running timer is immutable -- remaining time is
//! a function of the wall clock alone -- so the refresh task owns a copy of
//! the state and recomputes on a fixed cadence. Consumers watch the channel;
//! the task is cancelled by dropping (or `stop`ping) the handle, so a paused
//! or unmounted display can never leak a ticking task.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::clock::{self, TimerState};
use super::engine::now_ms;

/// Default refresh cadence. Well under a second so the displayed second
/// flips promptly after it elapses.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(20);

/// Handle to one running refresh task. One handle per watcher; spawn a new
/// one after any state mutation (the old copy is stale the moment the state
/// changes).
#[derive(Debug)]
pub struct Refresh {
    handle: JoinHandle<()>,
}

impl Refresh {
    /// Spawn a refresh task publishing signed remaining milliseconds every
    /// `period`. Spawn only for running states; a paused display is static
    /// until the next explicit mutation.
    pub fn spawn(state: TimerState, period: Duration) -> (Self, watch::Receiver<i64>) {
        let (tx, rx) = watch::channel(clock::remaining_ms(&state, now_ms()));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let remaining = clock::remaining_ms(&state, now_ms());
                if tx.send(remaining).is_err() {
                    // Every receiver is gone; nobody is displaying this.
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }

    /// Cancel the task now rather than at drop.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Refresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_state() -> TimerState {
        TimerState {
            total_ms: 60_000,
            paused: false,
            start_time: Some(now_ms()),
            pause_start: 0,
            total_pause_ms: 0,
        }
    }

    #[tokio::test]
    async fn publishes_decreasing_remaining_time() {
        let (refresh, mut rx) = Refresh::spawn(running_state(), Duration::from_millis(5));
        let first = *rx.borrow();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        let later = *rx.borrow();
        assert!(later <= first, "remaining time went up: {first} -> {later}");
        refresh.stop();
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_the_task() {
        let (refresh, mut rx) = Refresh::spawn(running_state(), Duration::from_millis(5));
        drop(refresh);
        // The aborted task drops its sender; the channel closes.
        while rx.changed().await.is_ok() {}
        assert!(rx.changed().await.is_err());
    }
}
