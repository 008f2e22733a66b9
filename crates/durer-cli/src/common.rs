use durer_core::{Config, Session};

/// Single-threaded runtime: all shared state is mutated from one event
/// loop, so there is nothing for extra workers to do.
pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub fn open_session() -> Result<(Config, Session), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let session = Session::open(&config)?;
    Ok((config, session))
}
