use clap::Subcommand;
use durer_core::{SavedState, ShareClient, ShareError};

use crate::common;

#[derive(Subcommand)]
pub enum ShareAction {
    /// Publish the current timer and print a shareable link
    Publish {
        /// Use a custom share code instead of a random one (overwrites
        /// whatever that code pointed at)
        #[arg(long)]
        id: Option<String>,
    },
    /// Load a timer by share code
    Load {
        /// Share code
        code: String,
    },
    /// Load a timer from a shareable link
    Open {
        /// Link of the form https://host/?timer=<code>
        link: String,
    },
}

pub fn run(action: ShareAction) -> Result<(), Box<dyn std::error::Error>> {
    let rt = common::runtime()?;
    rt.block_on(async {
        let (_config, mut session) = common::open_session()?;

        match action {
            ShareAction::Publish { id } => {
                let snapshot = session.share_snapshot();
                let published = session
                    .share()
                    .publish(&snapshot, id.as_deref())
                    .await
                    .map_err(|e| match e {
                        ShareError::EmptyId => "custom share code cannot be empty".to_string(),
                        other => format!("could not publish the timer: {other}"),
                    })?;
                println!("share code: {}", published.id);
                println!("link: {}", published.link);
            }
            ShareAction::Load { code } => {
                load_code(&mut session, code.trim()).await?;
            }
            ShareAction::Open { link } => {
                let code = ShareClient::parse_share_link(&link)
                    .ok_or("link has no timer parameter")?;
                load_code(&mut session, &code).await?;
            }
        }
        Ok(())
    })
}

/// Resolve and adopt a shared snapshot. An unknown code and an unreachable
/// store read very differently to the user, so they are reported apart.
async fn load_code(
    session: &mut durer_core::Session,
    code: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if code.is_empty() {
        return Err("share code cannot be empty".into());
    }
    let resolved: Option<SavedState> = session
        .share()
        .resolve(code)
        .await
        .map_err(|e| format!("could not reach the share service: {e}"))?;
    match resolved {
        Some(state) => {
            session.adopt(state)?;
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            Ok(())
        }
        None => Err(format!("no shared timer found for code '{code}'").into()),
    }
}
