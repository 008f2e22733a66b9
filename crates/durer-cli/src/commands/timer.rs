use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use durer_core::{Refresh, TimeRemaining};

use crate::common;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Flip between running and paused
    Toggle,
    /// Add seconds to the countdown (negative to remove)
    Add {
        /// Seconds to add, e.g. 60 or -3600
        #[arg(allow_hyphen_values = true)]
        seconds: i64,
    },
    /// Begin a new countdown and save it
    New {
        /// Countdown length in minutes (config default when omitted)
        #[arg(long)]
        minutes: Option<u64>,
        /// Name for the saved entry
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Print current timer state as JSON
    Status,
    /// Live countdown display until expiry or Ctrl-C
    Watch,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let rt = common::runtime()?;
    rt.block_on(async {
        let (config, mut session) = common::open_session()?;

        match action {
            TimerAction::Toggle => {
                let event = session.toggle().await?;
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            TimerAction::Add { seconds } => {
                let event = session.add_seconds(seconds).await?;
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            TimerAction::New { minutes, name } => {
                let minutes = minutes.unwrap_or(config.timer.default_duration_min);
                let state = session.start_new(minutes as i64 * 60 * 1000, &name).await?;
                println!("{}", serde_json::to_string_pretty(&state)?);
            }
            TimerAction::Status => {
                let snapshot = session.snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            TimerAction::Watch => {
                watch(&session, config.timer.refresh_interval_ms).await?;
            }
        }
        Ok(())
    })
}

/// Drive the refresh task and redraw the countdown line until the timer
/// expires or the user interrupts. A paused timer is static, so it is
/// printed once without any ticking.
async fn watch(
    session: &durer_core::Session,
    refresh_interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let timer = session.timer();
    if timer.is_paused() {
        println!("{}", timer.time());
        if timer.started() {
            println!("(paused)");
        } else {
            println!("(not started)");
        }
        return Ok(());
    }

    let (refresh, mut rx) = Refresh::spawn(
        timer.state().clone(),
        Duration::from_millis(refresh_interval_ms.max(1)),
    );
    let expired = loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break false;
                }
                let remaining = *rx.borrow();
                print!("\r{}   ", TimeRemaining::from_ms(remaining));
                std::io::stdout().flush()?;
                if remaining <= 0 {
                    break true;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break false;
            }
        }
    };
    refresh.stop();
    println!();
    if expired {
        println!("time's up");
    }
    Ok(())
}
