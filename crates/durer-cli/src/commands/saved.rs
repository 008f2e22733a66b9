use chrono::{DateTime, Local};
use clap::Subcommand;
use durer_core::{remaining_ms, SavedState, TimeRemaining};

use crate::common;

#[derive(Subcommand)]
pub enum SavedAction {
    /// List saved timers
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Load a saved timer, making it active
    Load {
        /// Saved timer id
        id: String,
    },
    /// Delete a saved timer
    Delete {
        /// Saved timer id
        id: String,
    },
}

pub fn run(action: SavedAction) -> Result<(), Box<dyn std::error::Error>> {
    let rt = common::runtime()?;
    rt.block_on(async {
        let (_config, mut session) = common::open_session()?;

        match action {
            SavedAction::List { json } => {
                let states = session.store().states();
                if json {
                    println!("{}", serde_json::to_string_pretty(states)?);
                } else if states.is_empty() {
                    println!("no saved timers");
                } else {
                    for state in states {
                        println!("{}", describe(state));
                    }
                }
            }
            SavedAction::Load { id } => {
                session.load_saved(&id).await?;
                println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            }
            SavedAction::Delete { id } => {
                session.delete_saved(&id)?;
                println!("deleted {id}");
            }
        }
        Ok(())
    })
}

fn describe(state: &SavedState) -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let remaining = TimeRemaining::from_ms(remaining_ms(&state.timer_state, now));
    let saved = DateTime::from_timestamp_millis(state.saved_at)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string());
    let name = if state.name.is_empty() {
        "(unnamed)"
    } else {
        &state.name
    };
    format!("{}  {}  saved {}  {} left", state.id, name, saved, remaining)
}
